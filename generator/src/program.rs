//! Hook-based plugin host
//!
//! A [`Program`] owns one callback registry per hook. Triggering a hook runs
//! every `before` callback, then the `on` callbacks, then the `after`
//! callbacks, each in registration order. The context is folded through the
//! callbacks: each one receives what the previous one returned. The first
//! error aborts the fold.

use crate::context::{GenFileAstContext, GenMockFieldContext, ParseEntryContext, ProcessIdlAstContext, WriteFileContext};
use crate::error::GenError;
use crate::plugin::Plugin;
use std::fmt;
use std::marker::PhantomData;

pub type Callback<C> = Box<dyn FnMut(C) -> Result<C, GenError>>;

/// A named hook and the context type its callbacks exchange.
pub trait Hook: 'static {
    type Context;
    const NAME: &'static str;

    fn registry(hooks: &mut Hooks) -> &mut Registry<Self::Context>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    On,
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Before => f.write_str("before"),
            Phase::On => f.write_str("on"),
            Phase::After => f.write_str("after"),
        }
    }
}

/// Where a callback is attached: a phase of one hook.
pub struct HookDescriptor<H: Hook> {
    pub phase: Phase,
    _hook: PhantomData<H>,
}

impl<H: Hook> HookDescriptor<H> {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            _hook: PhantomData,
        }
    }
}

pub fn before<H: Hook>() -> HookDescriptor<H> {
    HookDescriptor::new(Phase::Before)
}

pub fn on<H: Hook>() -> HookDescriptor<H> {
    HookDescriptor::new(Phase::On)
}

pub fn after<H: Hook>() -> HookDescriptor<H> {
    HookDescriptor::new(Phase::After)
}

pub struct Registry<C> {
    before: Vec<Callback<C>>,
    on: Vec<Callback<C>>,
    after: Vec<Callback<C>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            before: Vec::new(),
            on: Vec::new(),
            after: Vec::new(),
        }
    }
}

impl<C> Registry<C> {
    fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Callback<C>> {
        match phase {
            Phase::Before => &mut self.before,
            Phase::On => &mut self.on,
            Phase::After => &mut self.after,
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.on.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Callback registries of every hook known to the generator.
#[derive(Default)]
pub struct Hooks {
    pub(crate) parse_entry: Registry<ParseEntryContext>,
    pub(crate) process_idl_ast: Registry<ProcessIdlAstContext>,
    pub(crate) gen_mock_field: Registry<GenMockFieldContext>,
    pub(crate) gen_file_ast: Registry<GenFileAstContext>,
    pub(crate) write_file: Registry<WriteFileContext>,
}

#[derive(Default)]
pub struct Program {
    hooks: Hooks,
    plugins: Vec<&'static str>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plugin. Plugins register their callbacks in installation
    /// order, which is therefore part of the pipeline's behavior.
    pub fn install(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name();
        tracing::debug!(plugin = name, "installing plugin");
        self.plugins.push(name);
        plugin.apply(self);
    }

    pub fn plugins(&self) -> &[&'static str] {
        &self.plugins
    }

    pub fn register<H, F>(&mut self, descriptor: HookDescriptor<H>, callback: F)
    where
        H: Hook,
        F: FnMut(H::Context) -> Result<H::Context, GenError> + 'static,
    {
        H::registry(&mut self.hooks)
            .phase_mut(descriptor.phase)
            .push(Box::new(callback));
    }

    pub fn trigger<H: Hook>(&mut self, ctx: H::Context) -> Result<H::Context, GenError> {
        let registry = H::registry(&mut self.hooks);
        let mut ctx = ctx;
        for (phase, callbacks) in [
            (Phase::Before, &mut registry.before),
            (Phase::On, &mut registry.on),
            (Phase::After, &mut registry.after),
        ] {
            for callback in callbacks.iter_mut() {
                tracing::trace!(hook = H::NAME, %phase, "dispatching hook");
                ctx = callback(ctx)?;
            }
        }
        Ok(ctx)
    }

    pub fn callback_count<H: Hook>(&mut self) -> usize {
        H::registry(&mut self.hooks).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{GenFileAst, OutputMap, WriteFile};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn write_ctx(content: &str) -> WriteFileContext {
        WriteFileContext {
            filename: PathBuf::from("out.ts"),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_phases_run_in_order_and_fold_context() {
        let mut program = Program::new();

        program.register(after::<WriteFile>(), |mut ctx: WriteFileContext| {
            ctx.content.push_str("|after");
            Ok(ctx)
        });
        program.register(on::<WriteFile>(), |mut ctx: WriteFileContext| {
            ctx.content.push_str("|on1");
            Ok(ctx)
        });
        program.register(before::<WriteFile>(), |mut ctx: WriteFileContext| {
            ctx.content.push_str("|before");
            Ok(ctx)
        });
        program.register(on::<WriteFile>(), |mut ctx: WriteFileContext| {
            ctx.content.push_str("|on2");
            Ok(ctx)
        });

        let ctx = program.trigger::<WriteFile>(write_ctx("start")).unwrap();
        assert_eq!(ctx.content, "start|before|on1|on2|after");
        assert_eq!(program.callback_count::<WriteFile>(), 4);
    }

    #[test]
    fn test_hook_without_callbacks_returns_context() {
        let mut program = Program::new();
        let ctx = program.trigger::<WriteFile>(write_ctx("same")).unwrap();
        assert_eq!(ctx.content, "same");
    }

    #[test]
    fn test_error_aborts_remaining_callbacks() {
        let mut program = Program::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let seen = Rc::clone(&calls);
        program.register(before::<GenFileAst>(), move |ctx| {
            seen.borrow_mut().push("first");
            Ok(ctx)
        });
        program.register(on::<GenFileAst>(), |_ctx| {
            Err(GenError::UnknownFieldType("Broken".to_string()))
        });
        let seen = Rc::clone(&calls);
        program.register(after::<GenFileAst>(), move |ctx| {
            seen.borrow_mut().push("never");
            Ok(ctx)
        });

        let err = program
            .trigger::<GenFileAst>(GenFileAstContext {
                files: OutputMap::new(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown type:Broken");
        assert_eq!(*calls.borrow(), vec!["first"]);
    }

    #[test]
    fn test_callbacks_keep_state_between_triggers() {
        let mut program = Program::new();
        let mut count = 0;
        program.register(on::<WriteFile>(), move |mut ctx: WriteFileContext| {
            count += 1;
            ctx.content = count.to_string();
            Ok(ctx)
        });

        program.trigger::<WriteFile>(write_ctx("")).unwrap();
        let ctx = program.trigger::<WriteFile>(write_ctx("")).unwrap();
        assert_eq!(ctx.content, "2");
    }
}

//! Path helpers shared by the generators

use std::path::{Component, Path, PathBuf};

/// Strip the last extension of an IDL path (`a/b.thrift` -> `a/b`).
pub fn remove_file_ext(path: &str) -> &str {
    let file_start = path.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}

/// Extension-less path of `idl_path` relative to `idl_root`.
///
/// A path outside of `idl_root` keeps all of its directories (minus the
/// root and any `.`/`..` parts), so two files sharing a name never map to
/// the same location.
pub fn relative_idl_path(idl_path: &str, idl_root: &Path) -> PathBuf {
    let stem = Path::new(remove_file_ext(idl_path));
    match stem.strip_prefix(idl_root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            tracing::debug!(
                idl_path = %idl_path,
                idl_root = %idl_root.display(),
                "IDL file is outside the IDL root, mirroring its full path"
            );
            stem.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect()
        }
    }
}

/// Location of the generated counterpart of `idl_path`.
///
/// The path relative to `idl_root` is kept below `output_dir` and the IDL
/// extension is replaced by `extension` (which includes its leading dot).
pub fn output_path(idl_path: &str, idl_root: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let mut target = output_dir.join(relative_idl_path(idl_path, idl_root));
    let file_name = target
        .file_name()
        .map(|name| format!("{}{}", name.to_string_lossy(), extension))
        .unwrap_or_else(|| extension.to_string());
    target.set_file_name(file_name);
    target
}

/// `$id` of the JSON schema generated for `idl_path`
/// (`api://schemas/user_user` for `<root>/user/user.thrift`).
pub fn schema_root(idl_path: &str, idl_root: &Path) -> String {
    let relative: Vec<String> = relative_idl_path(idl_path, idl_root)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("api://schemas/{}", relative.join("_"))
}

/// Relative module specifier from the file generated at `from` to the one
/// generated at `to`, without extension (`./base`, `../common/base`).
pub fn relative_module_path(from: &Path, to: &Path) -> String {
    let from_dir: Vec<Component> = from.parent().map(|p| p.components().collect()).unwrap_or_default();
    let to_components: Vec<Component> = to.components().collect();

    let common = from_dir
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_dir.len() {
        parts.push("..".to_string());
    }
    for component in &to_components[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = remove_file_ext(&parts.join("/")).to_string();
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

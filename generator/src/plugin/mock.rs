//! Sample values for string and number fields
//!
//! A value is built in layers, each later layer overriding the earlier ones:
//! a random value, the IDL default, heuristics on the field name, and finally
//! a table of well-known field names.

use super::Plugin;
use crate::context::{GenMockField, GenMockFieldContext};
use crate::program::{before, Program};
use chrono::{DateTime, Utc};
use fake::faker::lorem::en::{Word, Words};
use fake::Fake;
use idlgen_idl::types::{BaseCategory, ConstValue, FieldType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

const MAX_RANDOM_INT: i64 = 10_000;

/// Bounds for generated timestamps: 2000-01-01 to 2030-01-01 (UTC seconds).
const TIMESTAMP_RANGE: std::ops::Range<i64> = 946_684_800..1_893_456_000;

const STRING_TABLE: &[(&str, &str)] = &[
    ("name", "Mock Name"),
    ("message", "success"),
    ("msg", "success"),
    ("avatar", "https://example.com/avatar.png"),
    ("url", "https://example.com"),
];

const NUMBER_TABLE: &[(&str, i64)] = &[
    ("total", 1),
    ("code", 0),
    ("status_code", 0),
    ("page", 1),
    ("page_size", 20),
];

#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

pub struct MockPlugin {
    rng: StdRng,
}

impl MockPlugin {
    pub fn new(options: MockOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Fill `ctx.output` for string and number base types. Any other field
    /// type is returned untouched.
    pub fn gen_mock_field(&mut self, mut ctx: GenMockFieldContext) -> GenMockFieldContext {
        let FieldType::Base(base) = &ctx.field_type else {
            return ctx;
        };
        let name = ctx.field_name().unwrap_or_default();
        let value = match base.category() {
            BaseCategory::String => Value::from(self.mock_string(name, ctx.default_value.as_ref())),
            BaseCategory::Number => Value::from(self.mock_number(name, ctx.default_value.as_ref())),
            _ => return ctx,
        };
        ctx.output = Some(value);
        ctx
    }

    fn mock_string(&mut self, name: &str, default_value: Option<&ConstValue>) -> String {
        let words: Vec<String> = Words(1..4).fake_with_rng(&mut self.rng);
        let mut value = words.join(" ");

        if let Some(ConstValue::StringLiteral { value: literal }) = default_value {
            value = literal.clone();
        }

        let lower = name.to_lowercase();
        if lower.ends_with("id") {
            value = self.rng.gen_range(0..=MAX_RANDOM_INT).to_string();
        }
        if lower.contains("email") {
            let word: String = Word().fake_with_rng(&mut self.rng);
            value = format!("{}@foo.com", word);
        }

        if let Some((_, fixed)) = STRING_TABLE.iter().find(|(key, _)| *key == name) {
            value = fixed.to_string();
        }
        value
    }

    fn mock_number(&mut self, name: &str, default_value: Option<&ConstValue>) -> i64 {
        let mut value = self.rng.gen_range(0..=MAX_RANDOM_INT);

        if let Some(literal) = default_value.and_then(ConstValue::as_int) {
            value = literal;
        }

        let upper = name.to_uppercase();
        if upper.ends_with("ID") {
            value = self.rng.gen_range(0..=MAX_RANDOM_INT);
        }
        if upper.ends_with("TIME") || upper.contains("TIMESTAMP") {
            value = self.random_timestamp_millis();
        }
        if upper.ends_with("STATUS") || upper.contains("TYPE") {
            value = self.rng.gen_range(0..=1);
        }

        if let Some((_, fixed)) = NUMBER_TABLE.iter().find(|(key, _)| *key == name) {
            value = *fixed;
        }
        value
    }

    fn random_timestamp_millis(&mut self) -> i64 {
        let secs = self.rng.gen_range(TIMESTAMP_RANGE);
        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(|date| date.timestamp_millis())
            .unwrap_or(secs * 1000)
    }
}

impl Plugin for MockPlugin {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn apply(self: Box<Self>, program: &mut Program) {
        let mut plugin = *self;
        program.register(before::<GenMockField>(), move |ctx| Ok(plugin.gen_mock_field(ctx)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FieldContext;
    use idlgen_idl::types::BaseType;

    fn plugin() -> MockPlugin {
        MockPlugin::new(MockOptions { seed: Some(42) })
    }

    fn request(base: BaseType, name: &str) -> GenMockFieldContext {
        GenMockFieldContext {
            field_type: FieldType::Base(base),
            default_value: None,
            context: Some(FieldContext {
                name: name.to_string(),
            }),
            output: None,
        }
    }

    fn mock(base: BaseType, name: &str) -> Value {
        plugin()
            .gen_mock_field(request(base, name))
            .output
            .expect("a value should be synthesized")
    }

    #[test]
    fn test_id_fields() {
        let number = mock(BaseType::I64, "userId").as_i64().unwrap();
        assert!((0..=MAX_RANDOM_INT).contains(&number));

        let text = mock(BaseType::String, "user_id");
        let digits = text.as_str().unwrap();
        assert!(digits.parse::<i64>().is_ok(), "'{}' should look numeric", digits);
    }

    #[test]
    fn test_time_fields_are_epoch_millis() {
        for name in ["createTime", "update_timestamp_ms"] {
            let millis = mock(BaseType::I64, name).as_i64().unwrap();
            assert!(
                millis >= TIMESTAMP_RANGE.start * 1000 && millis < TIMESTAMP_RANGE.end * 1000,
                "{} produced {}",
                name,
                millis
            );
        }
    }

    #[test]
    fn test_status_and_type_fields() {
        for name in ["status", "userStatus", "item_type", "TypeCode"] {
            let value = mock(BaseType::I32, name).as_i64().unwrap();
            assert!(value == 0 || value == 1, "{} produced {}", name, value);
        }
    }

    #[test]
    fn test_static_table_wins() {
        assert_eq!(mock(BaseType::I32, "total"), Value::from(1));
        assert_eq!(mock(BaseType::I32, "code"), Value::from(0));
        assert_eq!(mock(BaseType::String, "message"), Value::from("success"));
    }

    #[test]
    fn test_email_fields() {
        let email = mock(BaseType::String, "contactEmail");
        assert!(email.as_str().unwrap().ends_with("@foo.com"));
    }

    #[test]
    fn test_defaults_are_used() {
        let mut ctx = request(BaseType::String, "nickname");
        ctx.default_value = Some(ConstValue::StringLiteral {
            value: "anon".to_string(),
        });
        assert_eq!(plugin().gen_mock_field(ctx).output, Some(Value::from("anon")));

        let mut ctx = request(BaseType::I32, "limit");
        ctx.default_value = Some(ConstValue::IntConstant {
            value: "0x20".to_string(),
        });
        assert_eq!(plugin().gen_mock_field(ctx).output, Some(Value::from(32)));
    }

    #[test]
    fn test_other_categories_untouched() {
        let ctx = plugin().gen_mock_field(request(BaseType::Bool, "enabled"));
        assert!(ctx.output.is_none());

        let mut plugin = plugin();
        let ctx = plugin.gen_mock_field(GenMockFieldContext::new(FieldType::Identifier(
            "User".to_string(),
        )));
        assert!(ctx.output.is_none());
    }

    #[test]
    fn test_seeded_values_are_reproducible() {
        let first = mock(BaseType::String, "title");
        let second = mock(BaseType::String, "title");
        assert_eq!(first, second);
    }

    #[test]
    fn test_registered_before_gen_mock_field() {
        let mut program = Program::new();
        program.install(Box::new(plugin()));
        let ctx = program
            .trigger::<GenMockField>(request(BaseType::I32, "total"))
            .unwrap();
        assert_eq!(ctx.output, Some(Value::from(1)));
    }
}

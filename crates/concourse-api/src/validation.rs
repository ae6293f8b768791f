// Declarative option schemas
//
// Every client constructor and every operation that takes arguments runs
// its options through a `Schema` before touching the network. A check
// never stops at the first problem: all violations are collected and only
// joined into a single `Error::Validation` at the boundary.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::Error;

/// Combined `pipeline/job` shorthand accepted by build listings.
pub(crate) static JOB_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/]+/[^/]+$").expect("job reference pattern is valid"));

// ── Violations ───────────────────────────────────────────────────────

/// One broken constraint, rendered as `"<field>" <constraint>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub constraint: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.constraint)
    }
}

/// Every violation found by one schema check, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn single(field: &str, constraint: impl Into<String>) -> Self {
        let mut violations = Self::default();
        violations.push(field, constraint);
        violations
    }

    fn push(&mut self, field: &str, constraint: impl Into<String>) {
        self.0.push(Violation {
            field: field.to_owned(),
            constraint: constraint.into(),
        });
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Invalid parameter(s): [{joined}].")
    }
}

// ── Field rules ──────────────────────────────────────────────────────

/// Logical type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Object,
    Integer,
    Boolean,
    /// A string that parses as an absolute URI.
    Uri,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Object => value.is_object(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Uri => value.as_str().is_some_and(|s| Url::parse(s).is_ok()),
        }
    }

    fn mismatch(self) -> &'static str {
        match self {
            Self::String => "must be a string",
            Self::Object => "must be an object",
            Self::Integer => "must be an integer",
            Self::Boolean => "must be a boolean",
            Self::Uri => "must be a valid uri",
        }
    }
}

/// A single named field and the constraints it must satisfy.
#[derive(Debug, Clone)]
pub struct Field {
    key: &'static str,
    kind: Kind,
    required: bool,
    nullable: bool,
    non_empty: bool,
    min: Option<i64>,
    default: Option<Value>,
    pattern: Option<&'static Regex>,
    schema: Option<Schema>,
}

impl Field {
    fn new(key: &'static str, kind: Kind) -> Self {
        Self {
            key,
            kind,
            required: false,
            nullable: false,
            non_empty: false,
            min: None,
            default: None,
            pattern: None,
            schema: None,
        }
    }

    pub fn string(key: &'static str) -> Self {
        Self::new(key, Kind::String)
    }

    pub fn object(key: &'static str) -> Self {
        Self::new(key, Kind::Object)
    }

    pub fn integer(key: &'static str) -> Self {
        Self::new(key, Kind::Integer)
    }

    pub fn boolean(key: &'static str) -> Self {
        Self::new(key, Kind::Boolean)
    }

    pub fn uri(key: &'static str) -> Self {
        Self::new(key, Kind::Uri)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept an explicit `null` as a meaningful value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Value inserted when the field is omitted entirely.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn pattern(mut self, pattern: &'static Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Nested schema for object fields. Nested violations are keyed `outer.inner`.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    fn check(&self, path: &str, value: &Value, violations: &mut Violations) -> Value {
        if value.is_null() && self.nullable {
            return Value::Null;
        }

        if !self.kind.matches(value) {
            violations.push(path, self.kind.mismatch());
            return value.clone();
        }

        if let Some(s) = value.as_str() {
            if self.non_empty && s.is_empty() {
                violations.push(path, "is not allowed to be empty");
            } else if let Some(pattern) = self.pattern {
                if !pattern.is_match(s) {
                    violations.push(
                        path,
                        format!(
                            "with value \"{s}\" fails to match the required pattern: {}",
                            pattern.as_str()
                        ),
                    );
                }
            }
        }

        if let (Some(min), Some(n)) = (self.min, value.as_i64()) {
            if n < min {
                violations.push(path, format!("must be larger than or equal to {min}"));
            }
        }

        match (&self.schema, value) {
            (Some(schema), Value::Object(map)) => {
                Value::Object(schema.check_object(Some(path), map, violations))
            }
            _ => value.clone(),
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────

/// An ordered set of field rules plus mutual-exclusion rules.
///
/// Keys the schema does not mention pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    exclusions: Vec<(&'static str, &'static str)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// `key` may not be supplied together with `peer`.
    pub fn without(mut self, key: &'static str, peer: &'static str) -> Self {
        self.exclusions.push((key, peer));
        self
    }

    /// Check `value` and return it with defaults applied, or every violation found.
    pub fn check(&self, value: &Value) -> Result<Value, Violations> {
        let mut violations = Violations::default();

        let checked = match value {
            Value::Object(map) => Value::Object(self.check_object(None, map, &mut violations)),
            other => {
                violations.push("value", Kind::Object.mismatch());
                other.clone()
            }
        };

        if violations.is_empty() {
            Ok(checked)
        } else {
            Err(violations)
        }
    }

    fn check_object(
        &self,
        prefix: Option<&str>,
        map: &Map<String, Value>,
        violations: &mut Violations,
    ) -> Map<String, Value> {
        let path = |key: &str| match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.to_owned(),
        };

        let mut out = map.clone();

        for field in &self.fields {
            let field_path = path(field.key);
            match map.get(field.key) {
                Some(value) => {
                    let checked = field.check(&field_path, value, violations);
                    out.insert(field.key.to_owned(), checked);
                }
                None => {
                    if let Some(default) = &field.default {
                        out.insert(field.key.to_owned(), default.clone());
                    } else if field.required {
                        violations.push(&field_path, "is required");
                    }
                }
            }
        }

        for (key, peer) in &self.exclusions {
            let present = |k: &str| map.get(k).is_some_and(|v| !v.is_null());
            if present(key) && present(peer) {
                violations.push(&path(key), format!("conflict with forbidden peer \"{peer}\""));
            }
        }

        out
    }
}

// ── Validate ─────────────────────────────────────────────────────────

/// Options types that describe their own schema.
///
/// The options are serialized to a JSON object (absent `Option`s skipped,
/// secrets redacted) and checked against [`Validate::schema`].
pub trait Validate: Serialize {
    fn schema() -> Schema;

    /// Check the options, returning the defaulted JSON view on success.
    fn validate(&self) -> Result<Value, Error> {
        let value = serde_json::to_value(self).map_err(Error::Serialization)?;
        Ok(Self::schema().check(&value)?)
    }
}

/// Check a single name argument (`"<key>" is required / must be a string`).
pub(crate) fn check_name(key: &'static str, name: &str) -> Result<(), Error> {
    let schema = Schema::new().field(Field::string(key).required().non_empty());
    let mut options = Map::new();
    options.insert(key.to_owned(), Value::String(name.to_owned()));
    schema.check(&Value::Object(options))?;
    Ok(())
}

/// Take a field the schema already required out of its `Option`.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| Violations::single(field, "is required").into())
}

/// Schema fragment for an ancestor entity reference: an object with a name.
pub(crate) fn entity(key: &'static str) -> Field {
    Field::object(key)
        .required()
        .schema(Schema::new().field(Field::string("name").required().non_empty()))
}

/// Serialize a secret as a fixed placeholder so schemas can see it is present.
pub(crate) fn redacted<S: serde::Serializer, T>(
    _value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("[REDACTED]")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn builds_schema() -> Schema {
        Schema::new()
            .field(Field::integer("count").min(1).nullable().default(50))
            .field(Field::string("job").pattern(&JOB_REFERENCE))
            .field(Field::string("pipeline"))
            .field(Field::boolean("team"))
            .without("job", "pipeline")
    }

    #[test]
    fn reports_missing_required_field() {
        let schema = Schema::new().field(Field::uri("url").required());
        let err = schema.check(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter(s): [\"url\" is required].");
    }

    #[test]
    fn aggregates_every_violation_in_field_order() {
        let schema = Schema::new()
            .field(Field::uri("url").required())
            .field(Field::string("username").required())
            .field(Field::string("password").required());

        let err = schema
            .check(&json!({ "url": "not a uri", "username": 42 }))
            .unwrap_err();

        assert_eq!(err.len(), 3);
        assert_eq!(
            err.to_string(),
            "Invalid parameter(s): [\"url\" must be a valid uri, \
             \"username\" must be a string, \"password\" is required]."
        );
    }

    #[test]
    fn type_names_follow_logical_types() {
        let schema = Schema::new()
            .field(Field::object("team"))
            .field(Field::integer("count"))
            .field(Field::boolean("all"));

        let err = schema
            .check(&json!({ "team": "main", "count": 1.5, "all": "yes" }))
            .unwrap_err();

        let constraints: Vec<_> = err.iter().map(|v| v.constraint.as_str()).collect();
        assert_eq!(
            constraints,
            vec!["must be an object", "must be an integer", "must be a boolean"]
        );
    }

    #[test]
    fn relative_uri_is_rejected() {
        let schema = Schema::new().field(Field::uri("url").required());
        assert!(schema.check(&json!({ "url": "/just/a/path" })).is_err());
        assert!(schema.check(&json!({ "url": "https://ci.example.com" })).is_ok());
    }

    #[test]
    fn count_defaults_to_fifty() {
        let checked = builds_schema().check(&json!({})).unwrap();
        assert_eq!(checked["count"], json!(50));
    }

    #[test]
    fn count_null_means_unbounded() {
        let checked = builds_schema().check(&json!({ "count": null })).unwrap();
        assert!(checked["count"].is_null());
    }

    #[test]
    fn count_below_minimum_is_rejected() {
        let err = builds_schema().check(&json!({ "count": 0 })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter(s): [\"count\" must be larger than or equal to 1]."
        );
    }

    #[test]
    fn job_reference_must_match_pattern() {
        let err = builds_schema().check(&json!({ "job": "nojob" })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter(s): [\"job\" with value \"nojob\" fails to match \
             the required pattern: ^[^/]+/[^/]+$]."
        );
        assert!(builds_schema().check(&json!({ "job": "p/j" })).is_ok());
    }

    #[test]
    fn job_and_pipeline_are_mutually_exclusive() {
        let err = builds_schema()
            .check(&json!({ "job": "p/j", "pipeline": "p" }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter(s): [\"job\" conflict with forbidden peer \"pipeline\"]."
        );
    }

    #[test]
    fn nested_schema_reports_dotted_paths() {
        let schema = Schema::new().field(entity("team")).field(entity("pipeline"));
        let err = schema
            .check(&json!({ "team": { "name": "" }, "pipeline": { "id": 1 } }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter(s): [\"team.name\" is not allowed to be empty, \
             \"pipeline.name\" is required]."
        );
    }

    #[test]
    fn non_object_options_are_rejected() {
        let err = Schema::new().check(&json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter(s): [\"value\" must be an object].");
    }

    #[test]
    fn unknown_keys_pass_through() {
        let checked = Schema::new()
            .field(Field::string("name"))
            .check(&json!({ "name": "a", "extra": true }))
            .unwrap();
        assert_eq!(checked, json!({ "name": "a", "extra": true }));
    }

    #[test]
    fn check_name_rejects_empty_names() {
        let err = check_name("name", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid parameter(s): [\"name\" is not allowed to be empty]."
        );
        assert!(check_name("name", "build-and-test").is_ok());
    }

    #[derive(Serialize)]
    struct TupleKeyed {
        pairs: std::collections::BTreeMap<(i32, i32), i32>,
    }

    impl Validate for TupleKeyed {
        fn schema() -> Schema {
            Schema::new()
        }
    }

    #[test]
    fn unserializable_options_are_reported_as_such() {
        let options = TupleKeyed {
            pairs: std::collections::BTreeMap::from([((1, 2), 3)]),
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)), "got: {err:?}");
        assert!(err.violations().is_none());
    }
}

//! Declarative shape checks over `serde_json::Value`.
//!
//! A [`Schema`] validates and coerces in one pass: [`Schema::parse`] returns a
//! new value with unknown object keys stripped, defaults filled in and digit
//! strings turned into integers, or every [`FieldIssue`] it found. The same
//! engine gates request input and checks outgoing envelopes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::validation::{DigitsError, FieldIssue, IssueType, ValidationErrors, coerce_digits};

/// A value shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Accepts anything, including absence.
    Any,
    Bool,
    /// Exactly this JSON value.
    Literal(Value),
    String(StringRule),
    Number(NumberRule),
    /// A digit-only string, coerced to an unsigned integer.
    Digits(DigitsRule),
    /// An RFC 3339 timestamp string.
    Timestamp,
    /// One of a closed set of strings.
    OneOf(Vec<&'static str>),
    Array(Box<Schema>),
    Object(ObjectSchema),
    /// May be absent. `null` is still checked against the inner schema.
    Optional(Box<Schema>),
    /// When absent, the fallback is parsed in its place.
    Default(Box<Schema>, Value),
}

/// Types implementing this are decoded from request input through their schema.
pub trait HasSchema: DeserializeOwned {
    fn schema() -> &'static Schema;
}

impl Schema {
    pub fn any() -> Self {
        Schema::Any
    }

    pub fn boolean() -> Self {
        Schema::Bool
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Schema::Literal(value.into())
    }

    pub fn timestamp() -> Self {
        Schema::Timestamp
    }

    pub fn one_of(values: impl IntoIterator<Item = &'static str>) -> Self {
        Schema::OneOf(values.into_iter().collect())
    }

    pub fn array(item: Schema) -> Self {
        Schema::Array(Box::new(item))
    }

    pub fn optional(self) -> Self {
        match self {
            Schema::Optional(_) => self,
            other => Schema::Optional(Box::new(other)),
        }
    }

    pub fn with_default(self, fallback: impl Into<Value>) -> Self {
        Schema::Default(Box::new(self), fallback.into())
    }

    /// Validates and coerces `value`.
    pub fn parse(&self, value: &Value) -> Result<Value, ValidationErrors> {
        let mut cx = Context::default();
        let parsed = self.check(Some(value), &mut cx);
        if !cx.issues.is_empty() {
            return Err(ValidationErrors::new(cx.issues));
        }
        Ok(parsed.unwrap_or(Value::Null))
    }

    /// Validates, coerces, then deserializes into `T`.
    pub fn decode<T: DeserializeOwned>(&self, value: &Value) -> Result<T, ValidationErrors> {
        let parsed = self.parse(value)?;
        serde_json::from_value(parsed).map_err(|e| {
            ValidationErrors::from(FieldIssue::new("", e.to_string(), IssueType::InvalidType))
        })
    }

    fn check(&self, value: Option<&Value>, cx: &mut Context) -> Option<Value> {
        match self {
            Schema::Any => value.cloned(),
            Schema::Optional(inner) => value.and_then(|v| inner.check(Some(v), cx)),
            Schema::Default(inner, fallback) => inner.check(Some(value.unwrap_or(fallback)), cx),
            _ => {
                let Some(value) = value else {
                    cx.issue(IssueType::InvalidType, "Required");
                    return None;
                };
                self.check_present(value, cx)
            }
        }
    }

    fn check_present(&self, value: &Value, cx: &mut Context) -> Option<Value> {
        match self {
            Schema::Any | Schema::Optional(_) | Schema::Default(..) => self.check(Some(value), cx),
            Schema::Bool => match value {
                Value::Bool(_) => Some(value.clone()),
                other => cx.type_mismatch("boolean", other),
            },
            Schema::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    cx.issue(
                        IssueType::InvalidLiteral,
                        format!("Invalid literal value, expected {expected}"),
                    );
                    None
                }
            }
            Schema::String(rule) => rule.check(value, cx),
            Schema::Number(rule) => rule.check(value, cx),
            Schema::Digits(rule) => rule.check(value, cx),
            Schema::Timestamp => match value {
                Value::String(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {
                    Some(value.clone())
                }
                Value::String(_) => {
                    cx.issue(IssueType::InvalidDate, "Invalid date");
                    None
                }
                other => cx.type_mismatch("date", other),
            },
            Schema::OneOf(options) => match value {
                Value::String(s) if options.contains(&s.as_str()) => Some(value.clone()),
                Value::String(s) => {
                    let expected = options
                        .iter()
                        .map(|o| format!("'{o}'"))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    cx.issue(
                        IssueType::InvalidEnumValue,
                        format!("Invalid enum value. Expected {expected}, received '{s}'"),
                    );
                    None
                }
                other => cx.type_mismatch("string", other),
            },
            Schema::Array(item) => match value {
                Value::Array(values) => {
                    let mut out = Vec::with_capacity(values.len());
                    for (idx, v) in values.iter().enumerate() {
                        cx.path.push(idx.to_string());
                        if let Some(parsed) = item.check(Some(v), cx) {
                            out.push(parsed);
                        }
                        cx.path.pop();
                    }
                    Some(Value::Array(out))
                }
                other => cx.type_mismatch("array", other),
            },
            Schema::Object(object) => object.check(value, cx),
        }
    }
}

// -------------------------
// Strings
// -------------------------

#[derive(Debug, Clone, PartialEq)]
struct Bound<T> {
    limit: T,
    message: String,
}

/// Length constraints on a string, counted in characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRule {
    min: Option<Bound<usize>>,
    max: Option<Bound<usize>>,
}

impl StringRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_len(mut self, limit: usize, message: impl Into<String>) -> Self {
        self.min = Some(Bound { limit, message: message.into() });
        self
    }

    pub fn max_len(mut self, limit: usize, message: impl Into<String>) -> Self {
        self.max = Some(Bound { limit, message: message.into() });
        self
    }

    fn check(&self, value: &Value, cx: &mut Context) -> Option<Value> {
        let Value::String(s) = value else {
            return cx.type_mismatch("string", value);
        };
        let len = s.chars().count();
        let mut ok = true;
        if let Some(min) = self.min.as_ref().filter(|b| len < b.limit) {
            cx.issue(IssueType::TooSmall, min.message.clone());
            ok = false;
        }
        if let Some(max) = self.max.as_ref().filter(|b| len > b.limit) {
            cx.issue(IssueType::TooBig, max.message.clone());
            ok = false;
        }
        ok.then(|| value.clone())
    }
}

impl From<StringRule> for Schema {
    fn from(rule: StringRule) -> Self {
        Schema::String(rule)
    }
}

// -------------------------
// Numbers
// -------------------------

#[derive(Debug, Clone, PartialEq)]
struct NumBound {
    limit: f64,
    inclusive: bool,
    message: String,
}

/// Constraints on a JSON number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRule {
    integer: bool,
    min: Option<NumBound>,
    max: Option<NumBound>,
}

impl NumberRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects values with a fractional part.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Strictly greater than zero.
    pub fn positive(self, message: impl Into<String>) -> Self {
        self.gt(0.0, message)
    }

    pub fn gt(mut self, limit: f64, message: impl Into<String>) -> Self {
        self.min = Some(NumBound { limit, inclusive: false, message: message.into() });
        self
    }

    pub fn gte(mut self, limit: f64, message: impl Into<String>) -> Self {
        self.min = Some(NumBound { limit, inclusive: true, message: message.into() });
        self
    }

    pub fn lte(mut self, limit: f64, message: impl Into<String>) -> Self {
        self.max = Some(NumBound { limit, inclusive: true, message: message.into() });
        self
    }

    fn check(&self, value: &Value, cx: &mut Context) -> Option<Value> {
        let Some(n) = value.as_f64() else {
            return cx.type_mismatch("number", value);
        };
        if self.integer && n.fract() != 0.0 {
            cx.issue(IssueType::InvalidType, "Expected integer, received float");
            return None;
        }
        let mut ok = true;
        if let Some(min) = &self.min {
            let below = if min.inclusive { n < min.limit } else { n <= min.limit };
            if below {
                cx.issue(IssueType::TooSmall, min.message.clone());
                ok = false;
            }
        }
        if let Some(max) = &self.max {
            let above = if max.inclusive { n > max.limit } else { n >= max.limit };
            if above {
                cx.issue(IssueType::TooBig, max.message.clone());
                ok = false;
            }
        }
        ok.then(|| value.clone())
    }
}

impl From<NumberRule> for Schema {
    fn from(rule: NumberRule) -> Self {
        Schema::Number(rule)
    }
}

// -------------------------
// Digit strings
// -------------------------

/// A string that must match `^\d+$`; the parsed value is an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitsRule {
    message: String,
    min: Option<Bound<u64>>,
    max: Option<Bound<u64>>,
}

impl DigitsRule {
    /// `message` is reported when the string is not all digits.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            min: None,
            max: None,
        }
    }

    pub fn min(mut self, limit: u64, message: impl Into<String>) -> Self {
        self.min = Some(Bound { limit, message: message.into() });
        self
    }

    pub fn max(mut self, limit: u64, message: impl Into<String>) -> Self {
        self.max = Some(Bound { limit, message: message.into() });
        self
    }

    fn check(&self, value: &Value, cx: &mut Context) -> Option<Value> {
        let Value::String(raw) = value else {
            return cx.type_mismatch("string", value);
        };
        let n = match coerce_digits(raw) {
            Ok(n) => n,
            Err(DigitsError::NotDigits) => {
                cx.issue(IssueType::InvalidString, self.message.clone());
                return None;
            }
            Err(DigitsError::Overflow) => {
                cx.issue(IssueType::TooBig, "Number is too large");
                return None;
            }
        };
        if let Some(min) = self.min.as_ref().filter(|b| n < b.limit) {
            cx.issue(IssueType::TooSmall, min.message.clone());
            return None;
        }
        if let Some(max) = self.max.as_ref().filter(|b| n > b.limit) {
            cx.issue(IssueType::TooBig, max.message.clone());
            return None;
        }
        Some(Value::from(n))
    }
}

impl From<DigitsRule> for Schema {
    fn from(rule: DigitsRule) -> Self {
        Schema::Digits(rule)
    }
}

// -------------------------
// Objects
// -------------------------

/// An object with declared fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<(&'static str, Schema)>,
    strict: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any earlier declaration of the same key.
    pub fn field(mut self, key: &'static str, schema: impl Into<Schema>) -> Self {
        let schema = schema.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((key, schema)),
        }
        self
    }

    /// Adds every field of `other`.
    pub fn extend(self, other: ObjectSchema) -> Self {
        other
            .fields
            .into_iter()
            .fold(self, |acc, (key, schema)| acc.field(key, schema))
    }

    /// Every field becomes optional.
    pub fn partial(mut self) -> Self {
        self.fields = self
            .fields
            .into_iter()
            .map(|(key, schema)| (key, schema.optional()))
            .collect();
        self
    }

    /// Undeclared keys become an `unrecognized_keys` issue instead of being dropped.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    fn check(&self, value: &Value, cx: &mut Context) -> Option<Value> {
        let Value::Object(map) = value else {
            return cx.type_mismatch("object", value);
        };
        let mut out = Map::new();
        for (key, schema) in &self.fields {
            cx.path.push((*key).to_string());
            if let Some(parsed) = schema.check(map.get(*key), cx) {
                out.insert((*key).to_string(), parsed);
            }
            cx.path.pop();
        }
        if self.strict {
            let unknown = map
                .keys()
                .filter(|k| !self.fields.iter().any(|(declared, _)| declared == k))
                .map(|k| format!("'{k}'"))
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                cx.issue(
                    IssueType::UnrecognizedKeys,
                    format!("Unrecognized key(s) in object: {}", unknown.join(", ")),
                );
            }
        }
        Some(Value::Object(out))
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}

// -------------------------
// Walk state
// -------------------------

#[derive(Debug, Default)]
struct Context {
    path: Vec<String>,
    issues: Vec<FieldIssue>,
}

impl Context {
    fn issue(&mut self, kind: IssueType, message: impl Into<String>) {
        self.issues
            .push(FieldIssue::new(self.path.join("."), message, kind));
    }

    fn type_mismatch(&mut self, expected: &str, received: &Value) -> Option<Value> {
        self.issue(
            IssueType::InvalidType,
            format!("Expected {expected}, received {}", json_type_name(received)),
        );
        None
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Field-level validation issues and the coercion rules used to decode
//! string-typed input (path segments, query strings).

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule identifier reported in the `type` field of an issue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidString,
    InvalidLiteral,
    InvalidEnumValue,
    UnrecognizedKeys,
    InvalidDate,
    InvalidJson,
}

impl IssueType {
    pub const fn as_str(self) -> &'static str {
        match self {
            IssueType::InvalidType => "invalid_type",
            IssueType::TooSmall => "too_small",
            IssueType::TooBig => "too_big",
            IssueType::InvalidString => "invalid_string",
            IssueType::InvalidLiteral => "invalid_literal",
            IssueType::InvalidEnumValue => "invalid_enum_value",
            IssueType::UnrecognizedKeys => "unrecognized_keys",
            IssueType::InvalidDate => "invalid_date",
            IssueType::InvalidJson => "invalid_json",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failing field: `{field, message, type}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path to the offending value (`""` for the value itself).
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: IssueType,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>, kind: IssueType) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Every issue found by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }

    /// Whether any issue was reported against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl From<FieldIssue> for ValidationErrors {
    fn from(issue: FieldIssue) -> Self {
        Self::new(vec![issue])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for (idx, issue) in self.issues.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            let field = if issue.field.is_empty() { "<root>" } else { &issue.field };
            write!(f, "{sep}{field}: {}", issue.message)?;
        }
        Ok(())
    }
}

// -------------------------
// Coercion rules
// -------------------------

/// Why a string could not be coerced into an unsigned integer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DigitsError {
    /// Empty, or contains something other than ASCII digits.
    NotDigits,
    /// All digits, but larger than `u64::MAX`.
    Overflow,
}

/// `^\d+$`, ASCII only.
pub fn is_digit_string(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Coerces a digit-only string into an integer. Signs, whitespace and
/// decimal points are rejected.
pub fn coerce_digits(raw: &str) -> Result<u64, DigitsError> {
    if !is_digit_string(raw) {
        return Err(DigitsError::NotDigits);
    }
    raw.parse::<u64>().map_err(|_| DigitsError::Overflow)
}

/// Coerces a digit-only string into an integer that is at least 1.
pub fn coerce_positive(raw: &str) -> Option<u64> {
    coerce_digits(raw).ok().filter(|n| *n >= 1)
}

/// Returns the raw value when present, otherwise the declared default.
pub fn or_default<'a>(raw: Option<&'a str>, default: &'a str) -> &'a str {
    raw.unwrap_or(default)
}

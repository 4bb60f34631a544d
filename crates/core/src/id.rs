//! Positive integer record identifiers.

use core::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{DigitsRule, HasSchema, ObjectSchema, Schema};

pub const INVALID_ID_MESSAGE: &str = "ID must be a positive integer";

/// Identifier assigned by the store on create. Always `>= 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecordId(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record id must be a positive integer, got {0}")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    pub const FIRST: RecordId = RecordId(1);

    pub fn new(value: i64) -> Result<Self, InvalidRecordId> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(InvalidRecordId(value.to_string()))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// The id after this one, or `None` at `i64::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<i64> for RecordId {
    type Error = InvalidRecordId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::validation::coerce_positive(s)
            .and_then(|n| i64::try_from(n).ok())
            .map(Self)
            .ok_or_else(|| InvalidRecordId(s.to_string()))
    }
}

/// Path parameters of a by-id route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IdParams {
    pub id: RecordId,
}

impl HasSchema for IdParams {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ObjectSchema::new()
                .field(
                    "id",
                    DigitsRule::new(INVALID_ID_MESSAGE)
                        .min(1, INVALID_ID_MESSAGE)
                        .max(i64::MAX as u64, INVALID_ID_MESSAGE),
                )
                .into()
        })
    }
}

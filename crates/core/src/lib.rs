//! `roastery-core`: shared building blocks for the roastery service.
//!
//! Error taxonomy, field issues, the schema engine used for request and
//! response checks, record ids and pagination. No I/O lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod schema;
pub mod validation;

pub use entity::{Entity, Timestamped, next_timestamp};
pub use error::{ApiError, ApiErrorKind, ErrorCode};
pub use id::{IdParams, InvalidRecordId, RecordId};
pub use pagination::{Page, PageRequest, Pagination, PaginationMeta};
pub use schema::{DigitsRule, HasSchema, NumberRule, ObjectSchema, Schema, StringRule};
pub use validation::{FieldIssue, IssueType, ValidationErrors};

//! Page-number pagination for list endpoints.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::schema::{DigitsRule, HasSchema, NumberRule, ObjectSchema, Schema};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Validated `?page=&limit=` query. Both are 1-based and at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Records to skip: `(page - 1) * limit`, saturating.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Attaches the total count to produce response metadata.
    pub fn meta(&self, total: u64) -> PaginationMeta {
        PaginationMeta {
            pagination: Pagination {
                page: self.page,
                size: self.limit,
                total,
            },
        }
    }
}

impl HasSchema for PageRequest {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let page = DigitsRule::new("Page must be a number").min(1, "Page must be at least 1");
            let limit = DigitsRule::new("Limit must be a number").min(1, "Limit must be at least 1");
            ObjectSchema::new()
                .field("page", Schema::from(page).with_default(DEFAULT_PAGE.to_string()))
                .field("limit", Schema::from(limit).with_default(DEFAULT_LIMIT.to_string()))
                .into()
        })
    }
}

/// One slice of a listing plus the total across all slices.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    /// Echoes the requested limit, not the number of items returned.
    pub size: u64,
    pub total: u64,
}

/// `meta` of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub pagination: Pagination,
}

/// Shape of [`PaginationMeta`] on the wire.
pub fn meta_schema() -> Schema {
    let count = |min: f64, msg: &str| NumberRule::new().integer().gte(min, msg.to_string());
    let pagination = ObjectSchema::new()
        .field("page", count(1.0, "Number must be greater than or equal to 1"))
        .field("size", count(1.0, "Number must be greater than or equal to 1"))
        .field("total", count(0.0, "Number must be greater than or equal to 0"))
        .strict();
    ObjectSchema::new().field("pagination", pagination).strict().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueType;
    use serde_json::json;

    fn decode(query: serde_json::Value) -> Result<PageRequest, crate::ValidationErrors> {
        PageRequest::schema().decode(&query)
    }

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(decode(json!({})).unwrap(), PageRequest::default());
        assert_eq!(decode(json!({ "page": "3" })).unwrap(), PageRequest { page: 3, limit: 10 });
    }

    #[test]
    fn non_numeric_values_are_rejected_with_field_messages() {
        let err = decode(json!({ "page": "abc", "limit": "x" })).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "page");
        assert_eq!(issues[0].message, "Page must be a number");
        assert_eq!(issues[1].field, "limit");
        assert_eq!(issues[1].message, "Limit must be a number");
        assert!(issues.iter().all(|i| i.kind == IssueType::InvalidString));
    }

    #[test]
    fn zero_is_rejected_and_large_limits_pass() {
        assert!(decode(json!({ "page": "0" })).unwrap_err().has_field("page"));
        let err = decode(json!({ "limit": "0" })).unwrap_err();
        assert!(err.has_field("limit"));
        assert_eq!(err.issues()[0].kind, IssueType::TooSmall);
        assert_eq!(decode(json!({ "limit": "101" })).unwrap().limit, 101);
        assert_eq!(decode(json!({ "limit": "5000" })).unwrap().limit, 5000);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 2, limit: 1 }.offset(), 1);
        assert_eq!(PageRequest { page: 4, limit: 25 }.offset(), 75);
        assert_eq!(PageRequest { page: u64::MAX, limit: u64::MAX }.offset(), u64::MAX);
    }

    #[test]
    fn meta_echoes_limit_as_size() {
        let meta = PageRequest { page: 2, limit: 1 }.meta(3);
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            json!({ "pagination": { "page": 2, "size": 1, "total": 3 } })
        );
        assert!(meta_schema().parse(&serde_json::to_value(meta).unwrap()).is_ok());
    }

    #[test]
    fn meta_schema_rejects_extra_keys() {
        let bad = json!({ "pagination": { "page": 1, "size": 10, "total": 0, "pages": 0 } });
        assert!(meta_schema().parse(&bad).is_err());
    }
}

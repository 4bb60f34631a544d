//! Field rules for the coffee resource and the schemas built from them.

use std::sync::OnceLock;

use roastery_core::{HasSchema, NumberRule, ObjectSchema, Schema, StringRule};

use crate::coffee::{CoffeePatch, NewCoffee};

pub const DESCRIPTION_MAX_CHARS: usize = 500;

pub fn name_rule() -> StringRule {
    StringRule::new().min_len(1, "Name is required")
}

pub fn description_rule() -> StringRule {
    StringRule::new().max_len(
        DESCRIPTION_MAX_CHARS,
        format!("Description must contain at most {DESCRIPTION_MAX_CHARS} character(s)"),
    )
}

pub fn price_rule() -> NumberRule {
    NumberRule::new().positive("Price must be positive")
}

/// Fields shared by every coffee shape.
pub fn base_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("name", name_rule())
        .field("description", Schema::from(description_rule()).optional())
        .field("price", price_rule())
}

/// Body of `POST /coffees`.
pub fn create_schema() -> ObjectSchema {
    base_schema()
}

/// Body of `PATCH /coffees/{id}`.
pub fn update_schema() -> ObjectSchema {
    base_schema().partial()
}

/// A full record as it appears in responses.
pub fn record_schema() -> ObjectSchema {
    let id = NumberRule::new()
        .integer()
        .gte(1.0, "Number must be greater than or equal to 1");
    base_schema()
        .extend(
            ObjectSchema::new()
                .field("id", id)
                .field("createdAt", Schema::timestamp())
                .field("updatedAt", Schema::timestamp()),
        )
        .strict()
}

impl HasSchema for NewCoffee {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| create_schema().into())
    }
}

impl HasSchema for CoffeePatch {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| update_schema().into())
    }
}

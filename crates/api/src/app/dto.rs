//! Response shapes for the coffee endpoints.

use std::sync::OnceLock;

use roastery_coffee::schema::record_schema;
use roastery_core::Schema;
use roastery_core::pagination::meta_schema;

use crate::app::envelope::success_schema;

/// `{success, data: Coffee}`: get, create, update, delete.
pub fn coffee_response_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| success_schema(record_schema().into(), None))
}

/// `{success, data: [Coffee], meta: {pagination}}`.
pub fn coffee_list_response_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| success_schema(Schema::array(record_schema().into()), Some(meta_schema())))
}

//! Coffee persistence boundary.
//!
//! Handlers talk to a [`CoffeeStore`]; whether records live in process memory
//! or in PostgreSQL is decided once at startup.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to [`StoreError`] as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (check violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / PoolTimedOut | N/A | `Unavailable` |
//! | Other | N/A | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use roastery_coffee::{Coffee, CoffeeId, CoffeePatch, NewCoffee};
use roastery_core::Page;

pub mod in_memory;
pub mod postgres;
pub mod seed;

pub use in_memory::InMemoryCoffeeStore;
pub use postgres::PostgresCoffeeStore;
pub use seed::seed_defaults;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("constraint violated in {operation}: {message}")]
    Constraint {
        operation: &'static str,
        message: String,
    },

    #[error("store unavailable in {0}")]
    Unavailable(&'static str),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("record ids exhausted")]
    IdsExhausted,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over coffee records.
///
/// By-id operations return `Ok(None)` when no record has that id; deciding
/// what absence means is left to the caller.
#[async_trait]
pub trait CoffeeStore: Send + Sync {
    async fn count(&self) -> StoreResult<u64>;

    /// One page in ascending id order, together with the total record count.
    /// Both are read from the same snapshot.
    async fn list_page(&self, offset: u64, limit: u64) -> StoreResult<Page<Coffee>>;

    async fn find(&self, id: CoffeeId) -> StoreResult<Option<Coffee>>;

    /// Assigns the id and sets `createdAt == updatedAt`.
    async fn create(&self, input: NewCoffee) -> StoreResult<Coffee>;

    /// Replaces the fields present in `patch` and advances `updatedAt`.
    async fn update(&self, id: CoffeeId, patch: CoffeePatch) -> StoreResult<Option<Coffee>>;

    /// Removes the record and returns it as it was.
    async fn delete(&self, id: CoffeeId) -> StoreResult<Option<Coffee>>;

    /// Releases held resources. Called once on shutdown.
    async fn close(&self) {}
}

#[async_trait]
impl<S> CoffeeStore for Arc<S>
where
    S: CoffeeStore + ?Sized,
{
    async fn count(&self) -> StoreResult<u64> {
        (**self).count().await
    }

    async fn list_page(&self, offset: u64, limit: u64) -> StoreResult<Page<Coffee>> {
        (**self).list_page(offset, limit).await
    }

    async fn find(&self, id: CoffeeId) -> StoreResult<Option<Coffee>> {
        (**self).find(id).await
    }

    async fn create(&self, input: NewCoffee) -> StoreResult<Coffee> {
        (**self).create(input).await
    }

    async fn update(&self, id: CoffeeId, patch: CoffeePatch) -> StoreResult<Option<Coffee>> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: CoffeeId) -> StoreResult<Option<Coffee>> {
        (**self).delete(id).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let constraint = matches!(db_err.code().as_deref(), Some("23505") | Some("23514"));
            if constraint {
                StoreError::Constraint {
                    operation,
                    message: db_err.message().to_string(),
                }
            } else {
                StoreError::Database {
                    operation,
                    source: sqlx::Error::Database(db_err),
                }
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => StoreError::Unavailable(operation),
        other => StoreError::Database {
            operation,
            source: other,
        },
    }
}

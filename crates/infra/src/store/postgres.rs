//! Postgres-backed coffee store.
//!
//! Timestamps are assigned by the database: `created_at` and `updated_at`
//! share one `now()` on insert, and every update moves `updated_at` to the
//! later of the wall clock and the previous value plus one microsecond.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, instrument};

use roastery_coffee::{Coffee, CoffeeId, CoffeePatch, NewCoffee};
use roastery_core::{Page, RecordId};

use super::{CoffeeStore, StoreError, StoreResult, map_sqlx_error};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS coffees (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL CHECK (char_length(name) >= 1),
    description TEXT NULL,
    price       DOUBLE PRECISION NOT NULL CHECK (price > 0),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const COLUMNS: &str = "id, name, description, price, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresCoffeeStore {
    pool: Arc<PgPool>,
}

impl PostgresCoffeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Opens a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Creates the `coffees` table when it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CoffeeStore for PostgresCoffeeStore {
    #[instrument(skip(self), err)]
    async fn count(&self) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coffees")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self), fields(item_count = tracing::field::Empty), err)]
    async fn list_page(&self, offset: u64, limit: u64) -> StoreResult<Page<Coffee>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Count and page must come from the same snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coffees")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("list_page", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM coffees ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(clamp_i64(limit))
        .bind(clamp_i64(offset))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_page", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        let items = rows
            .iter()
            .map(decode_row)
            .collect::<StoreResult<Vec<_>>>()?;

        Span::current().record("item_count", items.len());
        Ok(Page {
            total: total.max(0) as u64,
            items,
        })
    }

    #[instrument(skip(self), fields(coffee_id = %id), err)]
    async fn find(&self, id: CoffeeId) -> StoreResult<Option<Coffee>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM coffees WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, input), fields(coffee_id = tracing::field::Empty), err)]
    async fn create(&self, input: NewCoffee) -> StoreResult<Coffee> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO coffees (name, description, price, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.description.as_deref())
        .bind(input.price)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        let coffee = decode_row(&row)?;
        Span::current().record("coffee_id", coffee.id.get());
        Ok(coffee)
    }

    #[instrument(skip(self, patch), fields(coffee_id = %id), err)]
    async fn update(&self, id: CoffeeId, patch: CoffeePatch) -> StoreResult<Option<Coffee>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE coffees SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self), fields(coffee_id = %id), err)]
    async fn delete(&self, id: CoffeeId) -> StoreResult<Option<Coffee>> {
        let row = sqlx::query(&format!("DELETE FROM coffees WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        row.as_ref().map(decode_row).transpose()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[derive(Debug)]
struct CoffeeRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CoffeeRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CoffeeRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<CoffeeRow> for Coffee {
    type Error = StoreError;

    fn try_from(row: CoffeeRow) -> Result<Self, Self::Error> {
        let id = RecordId::new(row.id).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Coffee {
            id: CoffeeId(id),
            name: row.name,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_row(row: &PgRow) -> StoreResult<Coffee> {
    let row = CoffeeRow::from_row(row)
        .map_err(|e| StoreError::Corrupt(format!("failed to decode coffee row: {e}")))?;
    Coffee::try_from(row)
}

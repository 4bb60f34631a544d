use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use roastery_coffee::{Coffee, CoffeeId, CoffeePatch, NewCoffee};
use roastery_core::{ApiError, Page, PageRequest};
use roastery_infra::{AppConfig, CoffeeStore, InMemoryCoffeeStore, PostgresCoffeeStore, seed_defaults};

use crate::app::errors::AppResult;

pub const COFFEE_NOT_FOUND: &str = "Coffee not found";

/// Everything handlers need, shared behind one `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub coffees: CoffeeService,
}

impl AppServices {
    pub fn with_store(store: Arc<dyn CoffeeStore>) -> Self {
        Self {
            coffees: CoffeeService::new(store),
        }
    }

    /// Releases the persistence client. Call once, after the server stops.
    pub async fn close(&self) {
        self.coffees.store.close().await;
    }
}

/// One persistence call per operation; absence becomes a 404.
#[derive(Clone)]
pub struct CoffeeService {
    store: Arc<dyn CoffeeStore>,
}

impl CoffeeService {
    pub fn new(store: Arc<dyn CoffeeStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: PageRequest) -> AppResult<Page<Coffee>> {
        Ok(self.store.list_page(page.offset(), page.limit).await?)
    }

    pub async fn get(&self, id: CoffeeId) -> AppResult<Coffee> {
        found(self.store.find(id).await?)
    }

    pub async fn create(&self, input: NewCoffee) -> AppResult<Coffee> {
        let coffee = self.store.create(input).await?;
        info!(coffee_id = %coffee.id, "coffee created");
        Ok(coffee)
    }

    pub async fn update(&self, id: CoffeeId, patch: CoffeePatch) -> AppResult<Coffee> {
        found(self.store.update(id, patch).await?)
    }

    pub async fn delete(&self, id: CoffeeId) -> AppResult<Coffee> {
        let removed = found(self.store.delete(id).await?)?;
        info!(coffee_id = %removed.id, "coffee deleted");
        Ok(removed)
    }
}

fn found(coffee: Option<Coffee>) -> AppResult<Coffee> {
    coffee.ok_or_else(|| ApiError::not_found(COFFEE_NOT_FOUND).into())
}

/// Picks and prepares the store named by the config.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn CoffeeStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresCoffeeStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to create the coffees table")?;
            info!(max_connections = config.database_max_connections, "using Postgres store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Arc::new(InMemoryCoffeeStore::new())
        }
    };

    if config.seed_data {
        let inserted = seed_defaults(store.as_ref())
            .await
            .context("failed to seed sample coffees")?;
        info!(inserted, "seed complete");
    }

    Ok(AppServices::with_store(store))
}

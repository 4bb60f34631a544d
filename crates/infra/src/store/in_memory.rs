use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use roastery_coffee::{Coffee, CoffeeId, CoffeePatch, NewCoffee};
use roastery_core::{Page, RecordId};

use super::{CoffeeStore, StoreError, StoreResult};

/// Process-local store for development and tests. Contents vanish on exit.
#[derive(Debug)]
pub struct InMemoryCoffeeStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    next_id: Option<RecordId>,
    rows: BTreeMap<CoffeeId, Coffee>,
}

impl InMemoryCoffeeStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: Some(RecordId::FIRST),
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryCoffeeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoffeeStore for InMemoryCoffeeStore {
    async fn count(&self) -> StoreResult<u64> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.rows.len() as u64)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> StoreResult<Page<Coffee>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(Page {
            total: inner.rows.len() as u64,
            items: inner.rows.values().skip(skip).take(take).cloned().collect(),
        })
    }

    async fn find(&self, id: CoffeeId) -> StoreResult<Option<Coffee>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn create(&self, input: NewCoffee) -> StoreResult<Coffee> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let id = inner.next_id.ok_or(StoreError::IdsExhausted)?;
        inner.next_id = id.next();

        let coffee = Coffee::create(CoffeeId(id), input, Utc::now());
        inner.rows.insert(coffee.id, coffee.clone());
        Ok(coffee)
    }

    async fn update(&self, id: CoffeeId, patch: CoffeePatch) -> StoreResult<Option<Coffee>> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.rows.get_mut(&id).map(|coffee| {
            coffee.apply(patch, Utc::now());
            coffee.clone()
        }))
    }

    async fn delete(&self, id: CoffeeId) -> StoreResult<Option<Coffee>> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.rows.remove(&id))
    }
}

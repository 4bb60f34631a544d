use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roastery_core::{Entity, RecordId, Timestamped, next_timestamp};

/// Coffee identifier, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoffeeId(pub RecordId);

impl CoffeeId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0.get()
    }
}

impl From<RecordId> for CoffeeId {
    fn from(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CoffeeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A persisted coffee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coffee {
    pub id: CoffeeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coffee {
    /// Builds a freshly created record: both timestamps are `now`.
    pub fn create(id: CoffeeId, input: NewCoffee, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the fields present in `patch`; absent fields are untouched.
    ///
    /// `updated_at` always moves strictly forward, even for an empty patch.
    pub fn apply(&mut self, patch: CoffeePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        self.updated_at = next_timestamp(self.updated_at, now);
    }
}

impl Entity for Coffee {
    type Id = CoffeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Timestamped for Coffee {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCoffee {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
}

impl NewCoffee {
    pub fn new(name: impl Into<String>, description: Option<&str>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            price,
        }
    }
}

/// Body of an update request. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoffeePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl CoffeePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }
}

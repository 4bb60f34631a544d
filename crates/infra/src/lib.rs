//! Infrastructure layer: persistence and process configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError, Environment};
pub use store::{CoffeeStore, InMemoryCoffeeStore, PostgresCoffeeStore, StoreError, StoreResult, seed_defaults};

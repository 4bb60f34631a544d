//! Coffee resource domain.
//!
//! The record shape, its field rules and the patch semantics. Pure logic: no
//! IO, no HTTP, no storage.

pub mod coffee;
pub mod schema;
pub mod seed;

pub use coffee::{Coffee, CoffeeId, CoffeePatch, NewCoffee};
pub use seed::sample_coffees;

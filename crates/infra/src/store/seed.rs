use tracing::info;

use roastery_coffee::sample_coffees;

use super::{CoffeeStore, StoreResult};

/// Inserts the sample menu when the store holds no records.
///
/// Returns how many records were inserted (zero when the store already had data).
pub async fn seed_defaults<S>(store: &S) -> StoreResult<usize>
where
    S: CoffeeStore + ?Sized,
{
    let existing = store.count().await?;
    if existing > 0 {
        info!(existing, "store already populated; skipping seed");
        return Ok(0);
    }

    let mut inserted = 0;
    for coffee in sample_coffees() {
        let created = store.create(coffee).await?;
        info!(coffee_id = %created.id, name = %created.name, "seeded coffee");
        inserted += 1;
    }
    Ok(inserted)
}

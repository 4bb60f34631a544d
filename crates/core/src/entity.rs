//! Entity traits: identity plus audit timestamps.

use chrono::{DateTime, Utc};

/// Something with a stable identity across state changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity stamped on creation and on every modification.
pub trait Timestamped: Entity {
    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// True until the first modification.
    fn is_pristine(&self) -> bool {
        self.created_at() == self.updated_at()
    }
}

/// The timestamp to record for a modification observed at `now`.
///
/// Strictly after `previous`, even when the clock has not advanced or has
/// gone backwards.
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + chrono::Duration::microseconds(1);
    if now >= floor { now } else { floor }
}

use std::collections::HashSet;

use crate::errors::PersistenceError;
use crate::spot::Spot;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Durable storage for the whole spot collection.
///
/// Implementations overwrite on every save; there is no history and no
/// merging.
pub trait Persistence: Send + Sync {
    /// Loads the stored collection. Returns `Ok(None)` if nothing has
    /// been stored yet.
    fn load(&self) -> Result<Option<Vec<Spot>>, PersistenceError>;

    /// Replaces the stored collection with `spots`.
    fn save(&self, spots: &[Spot]) -> Result<(), PersistenceError>;
}

/// Serializes a collection into the stored layout: a JSON array of
/// spot objects in collection order.
pub fn encode(spots: &[Spot]) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(spots)?)
}

/// Parses the stored layout. Anything that is not an array of complete
/// spot objects with distinct IDs is rejected.
pub fn decode(raw: &str) -> Result<Vec<Spot>, PersistenceError> {
    let spots: Vec<Spot> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(spots.len());

    for spot in &spots {
        if !seen.insert(spot.id()) {
            return Err(PersistenceError::DuplicateId(spot.id()));
        }
    }

    Ok(spots)
}

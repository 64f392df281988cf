use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::errors::PersistenceError;
use crate::persistence::{decode, encode, Persistence};
use crate::spot::Spot;

/// A store that keeps the serialized collection in memory. Useful for
/// tests and for hosts without durable storage.
#[derive(Default)]
pub struct MemoryStore {
    raw: RwLock<Option<String>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out holding `raw`, which need not be well-formed.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        MemoryStore {
            raw: RwLock::new(Some(raw.into())),
            ..Default::default()
        }
    }

    /// Makes every subsequent save fail (or succeed again).
    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The currently stored text, if any.
    pub fn raw(&self) -> Option<String> {
        self.raw.read().map(|raw| (*raw).clone()).unwrap_or_default()
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Result<Option<Vec<Spot>>, PersistenceError> {
        match self.raw() {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, spots: &[Spot]) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                source: std::io::Error::new(std::io::ErrorKind::Other, "saves disabled"),
            });
        }

        let raw = encode(spots)?;

        let mut slot = self.raw.write().map_err(|_| PersistenceError::Io {
            source: std::io::Error::new(std::io::ErrorKind::Other, "memory store poisoned"),
        })?;
        *slot = Some(raw);

        self.saves.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }
}

use std::collections::HashSet;
use std::convert::TryFrom;
use std::sync::Arc;

use log::{debug, info, o, warn, Logger};
use time::OffsetDateTime;

use crate::entropy::Entropy;
use crate::errors::ValidationError;
use crate::geo::Coordinates;
use crate::normalization::normalize_text;
use crate::persistence::Persistence;
use crate::spot::{Draft, Spot, SpotId, DEFAULT_CATEGORY};

/// How far, in degrees on each axis, an added spot may land from its
/// anchor.
pub const ANCHOR_JITTER_DEGREES: f64 = 0.005;

/// Where the collection came from at startup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    /// A well-formed stored collection replaced the seed.
    Persisted,

    /// Nothing usable was stored, so the seed stands.
    Seed,
}

/// The canonical collection of spots.
///
/// Insertion order is kept but carries no meaning for display. Every
/// change is written through to the persistence layer; write failures
/// are logged and otherwise ignored.
pub struct SpotStore {
    spots: Vec<Spot>,
    persistence: Arc<dyn Persistence>,
    entropy: Box<dyn Entropy>,
    logger: Logger,
}

impl SpotStore {
    /// Creates an empty store.
    pub fn new(persistence: Arc<dyn Persistence>, entropy: Box<dyn Entropy>, logger: &Logger) -> Self {
        SpotStore {
            spots: Vec::new(),
            persistence,
            entropy,
            logger: logger.new(o!("component" => "store")),
        }
    }

    /// Sets the starting collection. Meant to run once, before
    /// [`restore`](Self::restore).
    pub fn initialize(&mut self, seed: Vec<Spot>) {
        debug!(self.logger, "Initializing from seed"; "count" => seed.len());
        self.spots = seed;
    }

    /// Replaces the collection with the stored one if there is a usable
    /// one. Otherwise keeps the current collection and stores it, so it
    /// is what the next startup sees.
    pub fn restore(&mut self) -> Origin {
        match self.persistence.load() {
            Ok(Some(spots)) => {
                info!(self.logger, "Restored stored spots"; "count" => spots.len());
                self.spots = spots;
                Origin::Persisted
            }
            Ok(None) => {
                info!(self.logger, "No stored spots; using seed"; "count" => self.spots.len());
                self.persist();
                Origin::Seed
            }
            Err(e) => {
                warn!(self.logger, "Stored spots unusable; using seed"; "error" => %e, "count" => self.spots.len());
                self.persist();
                Origin::Seed
            }
        }
    }

    /// Validates `draft` and appends a new spot near `anchor`.
    ///
    /// The new spot gets a fresh ID, a random level, and is free and
    /// verified but not sponsored. Nothing changes if validation fails.
    pub fn add(&mut self, draft: Draft, anchor: Coordinates) -> Result<Spot, ValidationError> {
        let name = normalize_text(&draft.name);
        let address = normalize_text(&draft.address);

        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        if address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }

        let category = match normalize_text(&draft.category) {
            category if category.is_empty() => DEFAULT_CATEGORY.to_owned(),
            category => category,
        };

        let id = self.next_id();
        let level = self.entropy.level();
        let position = Coordinates::new(
            anchor.lat + self.entropy.jitter(ANCHOR_JITTER_DEGREES),
            anchor.lng + self.entropy.jitter(ANCHOR_JITTER_DEGREES),
        );

        let spot = Spot::new(id, name, address, category, position, level, true, true, false);

        info!(self.logger, "Added spot"; "id" => id, "level" => %level, "lat" => position.lat, "lng" => position.lng);

        self.spots.push(spot.clone());
        self.persist();

        Ok(spot)
    }

    /// Sets whether the spot is verified. Returns `false`, and does
    /// nothing, if there is no such spot.
    pub fn set_verified(&mut self, id: SpotId, verified: bool) -> bool {
        self.update(id, "verified", verified, |spot| spot.set_verified(verified))
    }

    /// Sets whether the spot is sponsored. Returns `false`, and does
    /// nothing, if there is no such spot.
    pub fn set_sponsored(&mut self, id: SpotId, sponsored: bool) -> bool {
        self.update(id, "sponsored", sponsored, |spot| spot.set_sponsored(sponsored))
    }

    /// Flips the verified flag and returns its new value.
    pub fn toggle_verified(&mut self, id: SpotId) -> Option<bool> {
        let verified = !self.get(id)?.is_verified();
        self.set_verified(id, verified);
        Some(verified)
    }

    /// Flips the sponsored flag and returns its new value.
    pub fn toggle_sponsored(&mut self, id: SpotId) -> Option<bool> {
        let sponsored = !self.get(id)?.is_sponsored();
        self.set_sponsored(id, sponsored);
        Some(sponsored)
    }

    /// Removes the spot for good and returns it. A missing ID is not an
    /// error; the caller may hold a stale reference.
    pub fn remove(&mut self, id: SpotId) -> Option<Spot> {
        let index = match self.spots.iter().position(|s| s.id() == id) {
            Some(index) => index,
            None => {
                debug!(self.logger, "Ignoring removal of unknown spot"; "id" => id);
                return None;
            }
        };

        let removed = self.spots.remove(index);

        info!(self.logger, "Removed spot"; "id" => id);
        self.persist();

        Some(removed)
    }

    pub fn get(&self, id: SpotId) -> Option<&Spot> {
        self.spots.iter().find(|s| s.id() == id)
    }

    /// Returns a copy of the collection in insertion order.
    pub fn snapshot(&self) -> Vec<Spot> {
        self.spots.clone()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    fn update(&mut self, id: SpotId, field: &'static str, value: bool, apply: impl FnOnce(&mut Spot)) -> bool {
        let spot = match self.spots.iter_mut().find(|s| s.id() == id) {
            Some(spot) => spot,
            None => {
                debug!(self.logger, "Ignoring update of unknown spot"; "id" => id, "field" => field);
                return false;
            }
        };

        apply(spot);

        info!(self.logger, "Updated spot"; "id" => id, "field" => field, "value" => value);
        self.persist();

        true
    }

    /// The current time in milliseconds, or one past the largest ID in
    /// use if that is later.
    fn next_id(&self) -> SpotId {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let now = SpotId::try_from(now).unwrap_or_default();

        match self.spots.iter().map(Spot::id).max() {
            Some(largest) if largest >= now => match largest.checked_add(1) {
                Some(next) => next,
                None => self.smallest_unused_id(),
            },
            _ => now,
        }
    }

    fn smallest_unused_id(&self) -> SpotId {
        let used = self.spots.iter().map(Spot::id).collect::<HashSet<_>>();

        // fewer spots than IDs, so a gap always exists
        (1..=SpotId::MAX).find(|id| !used.contains(id)).unwrap_or_default()
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.spots) {
            warn!(self.logger, "Failed to save spots"; "error" => %e, "count" => self.spots.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::entropy::{RandomEntropy, ScriptedEntropy};
    use crate::persistence::MemoryStore;
    use crate::spot::Level;

    const ANCHOR: Coordinates = Coordinates { lat: 19.27, lng: 76.77 };

    fn store_with(entropy: impl Entropy + 'static) -> (SpotStore, Arc<MemoryStore>) {
        let persistence = Arc::new(MemoryStore::new());
        let store = SpotStore::new(persistence.clone(), Box::new(entropy), &log::discard_logger());

        (store, persistence)
    }

    fn seeded_spot(id: SpotId, level: Level) -> Spot {
        Spot::new(
            id,
            format!("Spot {}", id),
            format!("Area {}", id),
            DEFAULT_CATEGORY.to_owned(),
            ANCHOR,
            level,
            false,
            false,
            false,
        )
    }

    #[test]
    fn adding_assigns_defaults_and_saves() {
        let (mut store, persistence) = store_with(ScriptedEntropy::with_levels(vec![Level::Bronze]));

        let spot = store
            .add(Draft::new("  Bus Stand Loo ", "Station Road", ""), ANCHOR)
            .expect("add spot");

        assert_eq!(spot.name(), "Bus Stand Loo");
        assert_eq!(spot.category(), DEFAULT_CATEGORY);
        assert_eq!(spot.level(), Level::Bronze);
        assert!(!spot.is_clean());
        assert!(spot.is_free());
        assert!(spot.is_verified());
        assert!(!spot.is_sponsored());
        assert_eq!(store.snapshot(), vec![spot]);
        assert_eq!(persistence.save_count(), 1);
    }

    #[test]
    fn blank_name_is_rejected_without_changes() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(1, Level::Gold)]);

        assert_eq!(
            store.add(Draft::new("", "Y", "Cafe"), ANCHOR),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            store.add(Draft::new("Name", " \t", "Cafe"), ANCHOR),
            Err(ValidationError::MissingAddress)
        );
        assert_eq!(store.len(), 1);
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn added_spots_land_near_the_anchor() {
        let (mut store, _) = store_with(ScriptedEntropy::new(vec![0.5, 0.0, 0.999]));

        let position = store
            .add(Draft::new("A", "B", "Cafe"), ANCHOR)
            .expect("add spot")
            .position();

        assert!((position.lat - (ANCHOR.lat - ANCHOR_JITTER_DEGREES)).abs() < 1e-9);
        assert!(position.lng > ANCHOR.lng && position.lng < ANCHOR.lng + ANCHOR_JITTER_DEGREES);
    }

    #[test]
    fn ids_stay_ahead_of_existing_ones() {
        let (mut store, _) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(u64::MAX - 1, Level::Gold)]);

        let spot = store.add(Draft::new("A", "B", "Cafe"), ANCHOR).expect("add spot");

        assert_eq!(spot.id(), u64::MAX);
    }

    #[test]
    fn ids_fill_a_gap_once_the_largest_is_taken() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(1, Level::Gold), seeded_spot(u64::MAX, Level::Gold)]);

        let first = store.add(Draft::new("A", "B", "Cafe"), ANCHOR).expect("add spot");
        let second = store.add(Draft::new("C", "D", "Cafe"), ANCHOR).expect("add spot");

        assert_eq!((first.id(), second.id()), (2, 3));

        let ids = store.snapshot().iter().map(Spot::id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 4);
        assert_eq!(persistence.load().expect("load").map(|spots| spots.len()), Some(4));
    }

    #[test]
    fn removing_unknown_spot_is_a_no_op() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(1, Level::Gold), seeded_spot(2, Level::Silver)]);
        let before = store.snapshot();

        assert!(store.remove(999).is_none());
        assert_eq!(store.snapshot(), before);
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn removing_known_spot_keeps_the_rest_in_order() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        store.initialize((1..=3).map(|id| seeded_spot(id, Level::Gold)).collect());

        assert_eq!(store.remove(2).map(|s| s.id()), Some(2));
        assert_eq!(store.snapshot().iter().map(Spot::id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(persistence.save_count(), 1);
    }

    #[test]
    fn toggles_only_touch_their_flag() {
        let (mut store, _) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(1, Level::Bronze)]);
        let original = store.snapshot().remove(0);

        assert_eq!(store.toggle_verified(1), Some(true));
        assert_eq!(store.toggle_sponsored(1), Some(true));
        assert_eq!(store.toggle_verified(404), None);

        let spot = store.get(1).expect("spot 1");
        assert!(spot.is_verified());
        assert!(spot.is_sponsored());
        assert_eq!(spot.level(), original.level());
        assert_eq!(spot.is_clean(), original.is_clean());
        assert_eq!(spot.position(), original.position());
        assert_eq!(spot.is_free(), original.is_free());
    }

    #[test]
    fn setting_the_same_value_twice_is_idempotent() {
        let (mut store, _) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(1, Level::Gold)]);

        assert!(store.set_verified(1, true));
        let once = store.snapshot();
        assert!(store.set_verified(1, true));

        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn updates_on_unknown_ids_do_not_save() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(1, Level::Gold)]);

        assert!(!store.set_verified(2, true));
        assert!(!store.set_sponsored(2, true));
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn failed_saves_do_not_undo_mutations() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        persistence.fail_saves(true);

        store.add(Draft::new("A", "B", "Cafe"), ANCHOR).expect("add spot");

        assert_eq!(store.len(), 1);
        assert_eq!(persistence.raw(), None);
    }

    #[test]
    fn stored_collection_replaces_seed() {
        let stored = vec![seeded_spot(42, Level::Silver)];
        let raw = crate::persistence::encode(&stored).expect("encode collection");
        let persistence = Arc::new(MemoryStore::with_raw(raw));
        let mut store = SpotStore::new(
            persistence.clone(),
            Box::new(ScriptedEntropy::default()),
            &log::discard_logger(),
        );
        store.initialize(vec![seeded_spot(1, Level::Gold), seeded_spot(2, Level::Gold)]);

        assert_eq!(store.restore(), Origin::Persisted);
        assert_eq!(store.snapshot(), stored);
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn malformed_storage_falls_back_to_seed() {
        let persistence = Arc::new(MemoryStore::with_raw("{\"broken\":"));
        let mut store = SpotStore::new(
            persistence.clone(),
            Box::new(ScriptedEntropy::default()),
            &log::discard_logger(),
        );
        let seed = vec![seeded_spot(1, Level::Gold)];
        store.initialize(seed.clone());

        assert_eq!(store.restore(), Origin::Seed);
        assert_eq!(store.snapshot(), seed);
        assert_eq!(persistence.load().expect("reload").expect("stored seed"), seed);
    }

    #[test]
    fn empty_storage_falls_back_to_seed() {
        let (mut store, persistence) = store_with(ScriptedEntropy::default());
        store.initialize(vec![seeded_spot(5, Level::Silver)]);

        assert_eq!(store.restore(), Origin::Seed);
        assert_eq!(store.len(), 1);
        assert_eq!(persistence.save_count(), 1);
    }

    proptest! {
        #[test]
        fn added_ids_are_distinct(count in 1usize..64, seed in any::<u64>()) {
            let (mut store, _) = store_with(RandomEntropy::seeded(seed));

            for i in 0..count {
                store.add(Draft::new(format!("Spot {}", i), "Somewhere", "Cafe"), ANCHOR).expect("add spot");
            }

            let ids = store.snapshot().iter().map(Spot::id).collect::<HashSet<_>>();
            prop_assert_eq!(ids.len(), count);
        }

        #[test]
        fn clean_tracks_level_through_toggles(
            seed in any::<u64>(),
            toggles in prop::collection::vec((any::<bool>(), any::<bool>()), 0..16),
        ) {
            let (mut store, _) = store_with(RandomEntropy::seeded(seed));
            let id = store.add(Draft::new("A", "B", "Cafe"), ANCHOR).expect("add spot").id();

            for (verify, value) in toggles {
                if verify {
                    store.set_verified(id, value);
                } else {
                    store.set_sponsored(id, value);
                }
            }

            let spot = store.get(id).expect("added spot");
            prop_assert_eq!(spot.level() == Level::Bronze, !spot.is_clean());
        }
    }
}

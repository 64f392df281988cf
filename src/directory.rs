use std::sync::Arc;
use std::time::Duration;

use log::{debug, o, warn, Logger};

use crate::admin::{AdminGate, Role};
use crate::entropy::Entropy;
use crate::environment::Environment;
use crate::errors::DirectoryError;
use crate::geo::Coordinates;
use crate::location::{resolve_location, LocationProvider};
use crate::seed;
use crate::spot::{AnnotatedSpot, Draft, Spot, SpotId};
use crate::store::{Origin, SpotStore};
use crate::view::{compute_view, Query};

/// Everything one user session holds: the spots, the admin gate, the
/// current query and where the user is.
///
/// Guests may search and filter. Changing spots requires admin mode.
pub struct Directory {
    store: SpotStore,
    gate: AdminGate,
    query: Query,
    origin: Origin,
    location: Arc<dyn LocationProvider>,
    location_timeout: Duration,
    user_location: Option<Coordinates>,
    fallback_location: Coordinates,
    logger: Logger,
}

impl Directory {
    /// Seeds the collection, then lets any stored collection replace it.
    pub fn open(environment: &Environment, mut entropy: Box<dyn Entropy>) -> Self {
        let logger = environment.logger.new(o!("component" => "directory"));
        let config = &environment.config;

        let seed = seed::generate(config.seed_count, &mut *entropy);

        let mut store = SpotStore::new(environment.persistence.clone(), entropy, &logger);
        store.initialize(seed);
        let origin = store.restore();

        Directory {
            store,
            gate: AdminGate::new(config.admin_pin.clone(), &logger),
            query: Query::default(),
            origin,
            location: environment.location.clone(),
            location_timeout: config.location_timeout,
            user_location: None,
            fallback_location: config.fallback_location,
            logger,
        }
    }

    /// Asks for the user's position. Only the first call asks; later
    /// calls return what it settled on.
    pub async fn resolve_location(&mut self) -> Coordinates {
        if let Some(position) = self.user_location {
            return position;
        }

        let position = resolve_location(
            &self.logger,
            self.location.as_ref(),
            self.location_timeout,
            self.fallback_location,
        )
        .await;

        self.user_location = Some(position);
        position
    }

    /// The user's position, if it has been resolved.
    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    /// Where a map should be centred.
    pub fn map_center(&self) -> Coordinates {
        self.user_location.unwrap_or(self.fallback_location)
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query.text = text.into();
    }

    pub fn set_clean_filter(&mut self, clean_only: bool) {
        self.query.clean_only = clean_only;
    }

    pub fn set_free_filter(&mut self, free_only: bool) {
        self.query.free_only = free_only;
    }

    pub fn toggle_clean_filter(&mut self) -> bool {
        self.query.clean_only = !self.query.clean_only;
        self.query.clean_only
    }

    pub fn toggle_free_filter(&mut self) -> bool {
        self.query.free_only = !self.query.free_only;
        self.query.free_only
    }

    /// The spots to show for the current query, in display order.
    pub fn view(&self) -> Vec<AnnotatedSpot> {
        compute_view(&self.store.snapshot(), &self.query, self.user_location)
    }

    pub fn get(&self, id: SpotId) -> Option<&Spot> {
        self.store.get(id)
    }

    /// Returns a copy of every spot in collection order.
    pub fn snapshot(&self) -> Vec<Spot> {
        self.store.snapshot()
    }

    pub fn role(&self) -> Role {
        self.gate.role()
    }

    /// Enters admin mode if `candidate` is the PIN.
    pub fn unlock(&mut self, candidate: &str) -> bool {
        self.gate.check_secret(candidate)
    }

    pub fn lock(&mut self) {
        self.gate.lock();
    }

    /// Adds a spot near the user, or near the fallback location while
    /// the user's position is unknown.
    pub fn add_spot(&mut self, draft: Draft) -> Result<Spot, DirectoryError> {
        self.require_privileges("add")?;

        let anchor = self.map_center();
        Ok(self.store.add(draft, anchor)?)
    }

    pub fn set_verified(&mut self, id: SpotId, verified: bool) -> Result<bool, DirectoryError> {
        self.require_privileges("verify")?;
        Ok(self.store.set_verified(id, verified))
    }

    pub fn set_sponsored(&mut self, id: SpotId, sponsored: bool) -> Result<bool, DirectoryError> {
        self.require_privileges("sponsor")?;
        Ok(self.store.set_sponsored(id, sponsored))
    }

    pub fn toggle_verified(&mut self, id: SpotId) -> Result<Option<bool>, DirectoryError> {
        self.require_privileges("verify")?;
        Ok(self.store.toggle_verified(id))
    }

    pub fn toggle_sponsored(&mut self, id: SpotId) -> Result<Option<bool>, DirectoryError> {
        self.require_privileges("sponsor")?;
        Ok(self.store.toggle_sponsored(id))
    }

    /// Removes a spot once `confirm` agrees to it.
    ///
    /// `confirm` is shown the spot about to go and is not called if the
    /// spot is already gone, in which case this returns `Ok(None)`.
    pub fn remove_spot(
        &mut self,
        id: SpotId,
        confirm: impl FnOnce(&Spot) -> bool,
    ) -> Result<Option<Spot>, DirectoryError> {
        self.require_privileges("delete")?;

        let confirmed = match self.store.get(id) {
            Some(spot) => confirm(spot),
            None => return Ok(None),
        };

        if !confirmed {
            debug!(self.logger, "Deletion declined"; "id" => id);
            return Err(DirectoryError::NotConfirmed);
        }

        Ok(self.store.remove(id))
    }

    fn require_privileges(&self, action: &'static str) -> Result<(), DirectoryError> {
        if self.gate.is_privileged() {
            Ok(())
        } else {
            warn!(self.logger, "Refused admin action for guest"; "action" => action);
            Err(DirectoryError::NotPrivileged)
        }
    }
}

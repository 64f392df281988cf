use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use log::{info, warn, Logger};

use crate::errors::LocationError;
use crate::geo::Coordinates;

/// Something that can tell where the user is.
pub trait LocationProvider: Send + Sync {
    /// Asks for the user's position once.
    fn request_once(&self) -> BoxFuture<'_, Result<Coordinates, LocationError>>;
}

/// A provider that always reports the same position.
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    fn request_once(&self) -> BoxFuture<'_, Result<Coordinates, LocationError>> {
        future::ready(Ok(self.0)).boxed()
    }
}

/// A provider with nothing to offer.
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn request_once(&self) -> BoxFuture<'_, Result<Coordinates, LocationError>> {
        future::ready(Err(LocationError::Unavailable)).boxed()
    }
}

/// Picks a provider from an optional configured position.
pub fn provider_for(position: Option<Coordinates>) -> Box<dyn LocationProvider> {
    match position {
        Some(position) => Box::new(FixedLocation(position)),
        None => Box::new(NoLocation),
    }
}

/// Asks `provider` once, waiting at most `timeout`. Any failure resolves
/// to `fallback`, which callers then treat as the real position.
pub async fn resolve_location(
    logger: &Logger,
    provider: &dyn LocationProvider,
    timeout: Duration,
    fallback: Coordinates,
) -> Coordinates {
    let result = match tokio::time::timeout(timeout, provider.request_once()).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::TimedOut),
    };

    match result {
        Ok(position) => {
            info!(logger, "Resolved user location"; "lat" => position.lat, "lng" => position.lng);
            position
        }
        Err(e) => {
            warn!(logger, "Falling back to default location"; "error" => %e, "lat" => fallback.lat, "lng" => fallback.lng);
            fallback
        }
    }
}

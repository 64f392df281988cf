use std::sync::Arc;

use log::Logger;

use crate::config::Config;
use crate::errors::PersistenceError;
use crate::location::{provider_for, LocationProvider};
use crate::persistence::{FileStore, Persistence};

/// The collaborators a directory is opened with.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub persistence: Arc<dyn Persistence>,
    pub location: Arc<dyn LocationProvider>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        persistence: Arc<dyn Persistence>,
        location: Arc<dyn LocationProvider>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            persistence,
            location,
            config,
        }
    }

    /// Wires up file storage and the configured location provider.
    pub fn from_config(logger: Arc<Logger>, config: Config) -> Result<Self, PersistenceError> {
        let persistence = Arc::new(FileStore::new(&config.data_dir, &config.storage_key)?);
        let location = Arc::from(provider_for(config.user_location));

        Ok(Self::new(logger, persistence, location, config))
    }
}

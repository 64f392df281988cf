use thiserror::Error;

/// Enumerates reasons a draft spot is rejected.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    /// The name was blank after trimming.
    #[error("Missing name")]
    MissingName,

    /// The address was blank after trimming.
    #[error("Missing address")]
    MissingAddress,
}

/// Enumerates errors returned by the persistence subsystem.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Represents a failure to read or write the backing storage.
    #[error("Storage I/O error")]
    Io { source: std::io::Error },

    /// Represents stored data that could not be (de)serialized.
    #[error("Malformed stored collection")]
    Json { source: serde_json::Error },

    /// Represents a stored collection in which two spots share an ID.
    #[error("Duplicate spot ID {0} in stored collection")]
    DuplicateId(u64),

    /// Represents a storage key that cannot be used as a file name.
    #[error("Unusable storage key {0:?}")]
    InvalidKey(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(source: std::io::Error) -> Self {
        PersistenceError::Io { source }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(source: serde_json::Error) -> Self {
        PersistenceError::Json { source }
    }
}

/// Enumerates reasons the user's position could not be determined.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum LocationError {
    /// The provider has no position to offer.
    #[error("Location unavailable")]
    Unavailable,

    /// The provider did not answer in time.
    #[error("Location request timed out")]
    TimedOut,
}

/// Enumerates errors in reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Represents a variable that is set but cannot be parsed.
    #[error("Cannot parse {name} from {value:?}")]
    Malformed { name: &'static str, value: String },

    /// Represents a pair of variables of which only one is set.
    #[error("{present} is set but {missing} is not")]
    Incomplete { present: &'static str, missing: &'static str },
}

/// Enumerates errors surfaced by directory operations.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DirectoryError {
    /// Represents a rejected draft.
    #[error("Invalid spot: {0}")]
    Validation(#[from] ValidationError),

    /// Represents an admin operation attempted by a guest.
    #[error("Admin mode required")]
    NotPrivileged,

    /// Represents a deletion the user declined to confirm.
    #[error("Deletion not confirmed")]
    NotConfirmed,
}

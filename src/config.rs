use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::geo::Coordinates;
use crate::seed::DEFAULT_SEED_COUNT;

pub const ADMIN_PIN: &str = "CLEANPATH_ADMIN_PIN";
pub const DATA_DIR: &str = "CLEANPATH_DATA_DIR";
pub const STORAGE_KEY: &str = "CLEANPATH_STORAGE_KEY";
pub const FALLBACK_LAT: &str = "CLEANPATH_FALLBACK_LAT";
pub const FALLBACK_LNG: &str = "CLEANPATH_FALLBACK_LNG";
pub const USER_LAT: &str = "CLEANPATH_USER_LAT";
pub const USER_LNG: &str = "CLEANPATH_USER_LNG";
pub const LOCATION_TIMEOUT_MS: &str = "CLEANPATH_LOCATION_TIMEOUT_MS";
pub const SEED_COUNT: &str = "CLEANPATH_SEED_COUNT";
pub const RNG_SEED: &str = "CLEANPATH_RNG_SEED";

pub const DEFAULT_ADMIN_PIN: &str = "1234";
pub const DEFAULT_STORAGE_KEY: &str = "cleanpath_spots";
pub const DEFAULT_FALLBACK_LOCATION: Coordinates = Coordinates { lat: 19.27, lng: 76.77 };
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Runtime settings for the directory and its hosts.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The shared admin secret.
    pub admin_pin: String,

    /// Where the collection is stored.
    pub data_dir: PathBuf,

    /// The name the collection is stored under.
    pub storage_key: String,

    /// Where the user is assumed to be when their position is unknown.
    pub fallback_location: Coordinates,

    /// The position the location provider reports, if any.
    pub user_location: Option<Coordinates>,

    /// How long to wait for the location provider.
    pub location_timeout: Duration,

    /// How many seed spots to generate.
    pub seed_count: usize,

    /// Seeds the random choices, for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            admin_pin: DEFAULT_ADMIN_PIN.to_owned(),
            data_dir: env::temp_dir().join("cleanpath"),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            fallback_location: DEFAULT_FALLBACK_LOCATION,
            user_location: None,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            seed_count: DEFAULT_SEED_COUNT,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Reads the settings from the process environment, defaulting
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings through `lookup`, defaulting anything unset.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let fallback_location = Coordinates::new(
            parse_or(&lookup, FALLBACK_LAT, defaults.fallback_location.lat)?,
            parse_or(&lookup, FALLBACK_LNG, defaults.fallback_location.lng)?,
        );

        let user_location = match (parse::<f64>(&lookup, USER_LAT)?, parse::<f64>(&lookup, USER_LNG)?) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: USER_LAT,
                    missing: USER_LNG,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: USER_LNG,
                    missing: USER_LAT,
                })
            }
        };

        Ok(Config {
            admin_pin: lookup(ADMIN_PIN).unwrap_or(defaults.admin_pin),
            data_dir: lookup(DATA_DIR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            storage_key: lookup(STORAGE_KEY).unwrap_or(defaults.storage_key),
            fallback_location,
            user_location,
            location_timeout: parse(&lookup, LOCATION_TIMEOUT_MS)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.location_timeout),
            seed_count: parse_or(&lookup, SEED_COUNT, defaults.seed_count)?,
            rng_seed: parse(&lookup, RNG_SEED)?,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        Some(value) => {
            let parsed = value.trim().parse();

            match parsed {
                Ok(parsed) => Ok(Some(parsed)),
                Err(_) => Err(ConfigError::Malformed { name, value }),
            }
        }
        None => Ok(None),
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    Ok(parse(lookup, name)?.unwrap_or(default))
}

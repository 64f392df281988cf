use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// A spot identifier. Unique within a collection; not ordered in any
/// meaningful way.
pub type SpotId = u64;

/// The category a draft starts with.
pub const DEFAULT_CATEGORY: &str = "Public Toilet";

/// The categories hosts offer when adding a spot. Stored categories
/// are free text and need not come from this list.
pub const CATEGORIES: [&str; 8] = [
    "Public Toilet",
    "Hospital",
    "Hotel",
    "Petrol Pump",
    "Cafe",
    "Railway Station",
    "Bus Stand",
    "College",
];

/// A cleanliness tier.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Gold,
    Silver,
    Bronze,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Gold, Level::Silver, Level::Bronze];

    /// Whether a spot at this level counts as clean.
    pub fn is_clean(self) -> bool {
        self != Level::Bronze
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Gold => "gold",
            Level::Silver => "silver",
            Level::Bronze => "bronze",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single location in the directory.
///
/// `clean` is captured from `level` when the spot is created and is
/// stored as-is afterwards; nothing recomputes it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Spot {
    /// The ID of the spot.
    id: SpotId,

    /// The display name.
    name: String,

    /// The street address or area.
    address: String,

    /// The kind of place.
    category: String,

    /// Latitude in decimal degrees.
    lat: f64,

    /// Longitude in decimal degrees.
    lng: f64,

    /// The cleanliness tier.
    level: Level,

    /// Whether the spot was clean when created.
    clean: bool,

    /// Whether the spot is free to use.
    free: bool,

    /// Whether an admin has vouched for the spot.
    verified: bool,

    /// Whether the spot is pinned to the front of views.
    #[serde(default)]
    sponsored: bool,
}

impl Spot {
    /// Creates a spot, deriving `clean` from `level`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SpotId,
        name: String,
        address: String,
        category: String,
        position: Coordinates,
        level: Level,
        free: bool,
        verified: bool,
        sponsored: bool,
    ) -> Self {
        Spot {
            id,
            name,
            address,
            category,
            lat: position.lat,
            lng: position.lng,
            level,
            clean: level.is_clean(),
            free,
            verified,
            sponsored,
        }
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn is_free(&self) -> bool {
        self.free
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn is_sponsored(&self) -> bool {
        self.sponsored
    }

    pub(crate) fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }

    pub(crate) fn set_sponsored(&mut self, sponsored: bool) {
        self.sponsored = sponsored;
    }
}

/// The user-supplied part of a new spot.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Draft {
    pub name: String,
    pub address: String,
    pub category: String,
}

impl Draft {
    pub fn new(name: impl Into<String>, address: impl Into<String>, category: impl Into<String>) -> Self {
        Draft {
            name: name.into(),
            address: address.into(),
            category: category.into(),
        }
    }
}

impl Default for Draft {
    fn default() -> Self {
        Draft::new("", "", DEFAULT_CATEGORY)
    }
}

/// A spot as it appears in a view, with its distance from the user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotatedSpot {
    #[serde(flatten)]
    pub spot: Spot,

    /// Kilometres from the user, or `None` while the user's location
    /// is unknown.
    pub distance: Option<f64>,
}

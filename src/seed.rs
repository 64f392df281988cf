use crate::entropy::Entropy;
use crate::geo::Coordinates;
use crate::spot::{Spot, SpotId, DEFAULT_CATEGORY};

/// How many spots the seed holds unless configured otherwise.
pub const DEFAULT_SEED_COUNT: usize = 80;

/// The south-west corner of the seed grid.
pub const GRID_ORIGIN: Coordinates = Coordinates { lat: 19.24, lng: 76.74 };

/// Distance in degrees between neighbouring seed spots.
pub const GRID_SPACING_DEGREES: f64 = 0.004;

/// Spots per grid column.
pub const GRID_ROWS: usize = 10;

/// Generates `count` placeholder spots on a grid around Parbhani.
///
/// IDs run from 1. Levels are random, each spot is free and verified on
/// a coin flip, and none are sponsored.
pub fn generate(count: usize, entropy: &mut dyn Entropy) -> Vec<Spot> {
    (0..count)
        .map(|index| {
            let number = index + 1;
            let level = entropy.level();
            let free = entropy.coin();
            let verified = entropy.coin();

            Spot::new(
                number as SpotId,
                format!("CleanPath Spot {}", number),
                format!("Area {}, Parbhani", number),
                DEFAULT_CATEGORY.to_owned(),
                grid_position(index),
                level,
                free,
                verified,
                false,
            )
        })
        .collect()
}

fn grid_position(index: usize) -> Coordinates {
    Coordinates::new(
        GRID_ORIGIN.lat + (index % GRID_ROWS) as f64 * GRID_SPACING_DEGREES,
        GRID_ORIGIN.lng + (index / GRID_ROWS) as f64 * GRID_SPACING_DEGREES,
    )
}

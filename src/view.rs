use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::normalization::fold_for_search;
use crate::spot::{AnnotatedSpot, Spot};

/// Stands in for an unknown distance when sorting, which puts such
/// spots after any realistic distance.
pub const UNKNOWN_DISTANCE_KM: f64 = 9999.0;

/// What the user is currently looking for.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Query {
    /// Matched case-insensitively against name, address and category.
    pub text: String,

    /// Keep only spots that were clean when created.
    pub clean_only: bool,

    /// Keep only spots that are free to use.
    pub free_only: bool,
}

impl Query {
    pub fn new(text: impl Into<String>, clean_only: bool, free_only: bool) -> Self {
        Query {
            text: text.into(),
            clean_only,
            free_only,
        }
    }
}

/// Whether the spot's name, address and category, joined with spaces,
/// contain `needle`. `needle` must already be folded.
pub fn matches_text(spot: &Spot, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let haystack = fold_for_search(format!("{} {} {}", spot.name(), spot.address(), spot.category()));
    haystack.contains(needle)
}

pub fn passes_clean_filter(spot: &Spot, clean_only: bool) -> bool {
    !clean_only || spot.is_clean()
}

pub fn passes_free_filter(spot: &Spot, free_only: bool) -> bool {
    !free_only || spot.is_free()
}

/// Filters, annotates and orders `spots` for display.
///
/// Sponsored spots come first. Within each group spots are ordered by
/// distance from `user_location`, nearest first, with unknown distances
/// last. Spots that compare equal keep their order in `spots`.
pub fn compute_view(spots: &[Spot], query: &Query, user_location: Option<Coordinates>) -> Vec<AnnotatedSpot> {
    let needle = fold_for_search(&query.text);

    let mut view = spots
        .iter()
        .filter(|spot| matches_text(spot, &needle))
        .filter(|spot| passes_clean_filter(spot, query.clean_only))
        .filter(|spot| passes_free_filter(spot, query.free_only))
        .map(|spot| AnnotatedSpot {
            distance: user_location.map(|location| location.distance_to(&spot.position())),
            spot: spot.clone(),
        })
        .collect::<Vec<_>>();

    // stable, so ties keep collection order
    view.sort_by(compare_for_display);

    view
}

fn compare_for_display(a: &AnnotatedSpot, b: &AnnotatedSpot) -> Ordering {
    b.spot
        .is_sponsored()
        .cmp(&a.spot.is_sponsored())
        .then_with(|| sort_distance(a).total_cmp(&sort_distance(b)))
}

fn sort_distance(spot: &AnnotatedSpot) -> f64 {
    spot.distance.unwrap_or(UNKNOWN_DISTANCE_KM)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::persistence::tests::arbitrary_collection;
    use crate::spot::{Level, SpotId};

    const HERE: Coordinates = Coordinates { lat: 19.27, lng: 76.77 };

    fn spot(id: SpotId, category: &str, position: Coordinates, sponsored: bool) -> Spot {
        Spot::new(
            id,
            format!("Spot {}", id),
            format!("Area {}, Parbhani", id),
            category.to_owned(),
            position,
            if id % 3 == 0 { Level::Bronze } else { Level::Gold },
            id % 2 == 0,
            false,
            sponsored,
        )
    }

    /// A point `km` kilometres due north of `HERE`.
    fn north_of_here(km: f64) -> Coordinates {
        Coordinates::new(HERE.lat + (km / crate::geo::EARTH_RADIUS_KM).to_degrees(), HERE.lng)
    }

    fn ids(view: &[AnnotatedSpot]) -> Vec<SpotId> {
        view.iter().map(|s| s.spot.id()).collect()
    }

    #[test]
    fn sponsored_spots_come_first_despite_distance() {
        let spots = vec![
            spot(1, "Cafe", north_of_here(5.0), false),
            spot(2, "Cafe", north_of_here(10.0), true),
        ];

        let view = compute_view(&spots, &Query::default(), Some(HERE));

        assert_eq!(ids(&view), vec![2, 1]);
        assert!((view[0].distance.expect("known distance") - 10.0).abs() < 1e-6);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let spots = vec![spot(1, "Public Toilet", HERE, false), spot(2, "Hotel", HERE, false)];

        for text in &["toilet", "TOILET", "Toilet"] {
            let view = compute_view(&spots, &Query::new(*text, false, false), None);
            assert_eq!(ids(&view), vec![1], "query {:?}", text);
        }

        let view = compute_view(&spots, &Query::new("area 2, parb", false, false), None);
        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn search_spans_field_boundaries() {
        let spots = vec![spot(1, "Cafe", HERE, false)];

        let view = compute_view(&spots, &Query::new("parbhani cafe", false, false), None);

        assert_eq!(ids(&view), vec![1]);
    }

    #[test]
    fn empty_query_matches_everything() {
        let spots = (1..=5).map(|id| spot(id, "Cafe", HERE, false)).collect::<Vec<_>>();

        assert_eq!(compute_view(&spots, &Query::default(), None).len(), 5);
    }

    #[test]
    fn unknown_location_leaves_distance_unknown_and_order_unchanged() {
        let spots = vec![
            spot(3, "Cafe", north_of_here(3.0), false),
            spot(1, "Cafe", north_of_here(1.0), false),
            spot(2, "Cafe", north_of_here(2.0), true),
        ];

        let view = compute_view(&spots, &Query::default(), None);

        assert_eq!(ids(&view), vec![2, 3, 1]);
        assert!(view.iter().all(|s| s.distance.is_none()));
    }

    #[test]
    fn nearer_spots_come_first_within_a_group() {
        let spots = vec![
            spot(1, "Cafe", north_of_here(4.0), false),
            spot(2, "Cafe", north_of_here(0.5), false),
            spot(3, "Cafe", north_of_here(9.0), true),
            spot(4, "Cafe", north_of_here(2.0), true),
        ];

        let view = compute_view(&spots, &Query::default(), Some(HERE));

        assert_eq!(ids(&view), vec![4, 3, 2, 1]);
    }

    #[test]
    fn filters_apply_together() {
        let spots = (1..=12).map(|id| spot(id, "Cafe", HERE, false)).collect::<Vec<_>>();

        let view = compute_view(&spots, &Query::new("", true, true), Some(HERE));

        assert!(view.iter().all(|s| s.spot.is_clean() && s.spot.is_free()));
        assert_eq!(ids(&view), vec![2, 4, 8, 10]);
    }

    fn surviving(spots: &[Spot], first_clean: bool, clean_only: bool, free_only: bool) -> HashSet<SpotId> {
        let clean = |s: &&Spot| passes_clean_filter(s, clean_only);
        let free = |s: &&Spot| passes_free_filter(s, free_only);

        if first_clean {
            spots.iter().filter(clean).filter(free).map(Spot::id).collect()
        } else {
            spots.iter().filter(free).filter(clean).map(Spot::id).collect()
        }
    }

    proptest! {
        #[test]
        fn clean_and_free_filters_commute(
            spots in arbitrary_collection(),
            clean_only in any::<bool>(),
            free_only in any::<bool>(),
        ) {
            let viewed = compute_view(&spots, &Query::new("", clean_only, free_only), None)
                .iter()
                .map(|s| s.spot.id())
                .collect::<HashSet<_>>();

            prop_assert_eq!(&viewed, &surviving(&spots, true, clean_only, free_only));
            prop_assert_eq!(&viewed, &surviving(&spots, false, clean_only, free_only));
        }

        #[test]
        fn views_are_ordered_for_display(
            spots in arbitrary_collection(),
            located in any::<bool>(),
            lat in -90.0f64..90.0,
            lng in -180.0f64..180.0,
        ) {
            let location = if located { Some(Coordinates::new(lat, lng)) } else { None };
            let view = compute_view(&spots, &Query::default(), location);

            prop_assert_eq!(view.len(), spots.len());

            for pair in view.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);

                prop_assert!(a.spot.is_sponsored() || !b.spot.is_sponsored());

                if a.spot.is_sponsored() == b.spot.is_sponsored() {
                    prop_assert!(sort_distance(a) <= sort_distance(b));
                }
            }
        }

        #[test]
        fn views_are_deterministic(spots in arbitrary_collection()) {
            let query = Query::new("a", false, false);

            prop_assert_eq!(
                compute_view(&spots, &query, Some(HERE)),
                compute_view(&spots, &query, Some(HERE))
            );
        }
    }
}

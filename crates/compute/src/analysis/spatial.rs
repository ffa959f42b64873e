use std::fmt;

use foundation::geo::GeoPoint;
use foundation::math::haversine_km;
use scene::reference::ReferenceLocation;
use scene::region::RegionCatalog;
use serde::Serialize;
use tracing::debug;

pub const OUTSIDE_KNOWN_REGIONS: &str = "Outside known regions";

/// Result of a point-in-region lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum RegionMatch {
    Inside(String),
    Outside,
}

impl RegionMatch {
    pub fn label(&self) -> &str {
        match self {
            RegionMatch::Inside(name) => name,
            RegionMatch::Outside => OUTSIDE_KNOWN_REGIONS,
        }
    }
}

impl fmt::Display for RegionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate together with its great-circle distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    pub location: ReferenceLocation,
    pub distance_km: f64,
}

pub struct SpatialAnalysis;

impl SpatialAnalysis {
    /// First region, in catalog order, whose polygons contain `point`.
    ///
    /// Overlapping regions are not expected in a neighborhood map; if they do
    /// occur, catalog order decides.
    pub fn region_containing(point: &GeoPoint, regions: &RegionCatalog) -> RegionMatch {
        regions
            .as_slice()
            .iter()
            .find(|r| r.contains(point))
            .map(|r| RegionMatch::Inside(r.name.clone()))
            .unwrap_or(RegionMatch::Outside)
    }

    /// The `k` candidates closest to `point` by haversine distance, nearest
    /// first. Ties keep their catalog order.
    pub fn nearest_k(
        point: &GeoPoint,
        candidates: &[ReferenceLocation],
        k: usize,
    ) -> Vec<RankedLocation> {
        let mut ranked: Vec<RankedLocation> = candidates
            .iter()
            .map(|c| RankedLocation {
                location: c.clone(),
                distance_km: haversine_km(*point, c.location),
            })
            .collect();
        // `sort_by` is stable.
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked.truncate(k);
        debug!(
            k,
            candidates = candidates.len(),
            nearest_km = ranked.first().map(|r| r.distance_km),
            "nearest_k"
        );
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::{OUTSIDE_KNOWN_REGIONS, RegionMatch, SpatialAnalysis};
    use foundation::geo::GeoPoint;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use scene::reference::{ReferenceLocation, los_angeles_parks};
    use scene::region::{Polygon, RegionCatalog, RegionPolygon};

    fn square(name: &str, min_lat: f64, min_lon: f64, size: f64) -> RegionPolygon {
        RegionPolygon::new(
            name,
            vec![Polygon::new(vec![vec![
                GeoPoint::new(min_lat, min_lon),
                GeoPoint::new(min_lat, min_lon + size),
                GeoPoint::new(min_lat + size, min_lon + size),
                GeoPoint::new(min_lat + size, min_lon),
            ]])],
        )
    }

    #[test]
    fn finds_the_containing_region() {
        let catalog = RegionCatalog::new(vec![
            square("Westlake", 34.0, -118.3, 0.1),
            square("Downtown", 34.0, -118.2, 0.1),
        ]);
        assert_eq!(
            SpatialAnalysis::region_containing(&GeoPoint::new(34.05, -118.15), &catalog),
            RegionMatch::Inside("Downtown".into())
        );
        let outside = SpatialAnalysis::region_containing(&GeoPoint::new(35.0, -118.15), &catalog);
        assert_eq!(outside, RegionMatch::Outside);
        assert_eq!(outside.label(), OUTSIDE_KNOWN_REGIONS);
    }

    #[test]
    fn overlapping_regions_resolve_in_catalog_order() {
        let catalog = RegionCatalog::new(vec![
            square("First", 0.0, 0.0, 2.0),
            square("Second", 1.0, 1.0, 2.0),
        ]);
        assert_eq!(
            SpatialAnalysis::region_containing(&GeoPoint::new(1.5, 1.5), &catalog).label(),
            "First"
        );
    }

    #[test]
    fn empty_catalog_is_outside() {
        assert_eq!(
            SpatialAnalysis::region_containing(&GeoPoint::new(0.0, 0.0), &RegionCatalog::default()),
            RegionMatch::Outside
        );
    }

    #[test]
    fn nearest_three_parks_to_downtown() {
        let parks = los_angeles_parks();
        let a = GeoPoint::new(34.05, -118.25);
        let ranked = SpatialAnalysis::nearest_k(&a, &parks, 3);
        let names: Vec<&str> = ranked.iter().map(|r| r.location.name.as_str()).collect();
        assert_eq!(names, vec!["Grand Park", "Vista Hermosa", "Echo Park"]);
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert_eq!(parks.len(), 10);
    }

    #[test]
    fn k_larger_than_catalog_returns_everything() {
        let parks = los_angeles_parks();
        let ranked = SpatialAnalysis::nearest_k(&GeoPoint::new(34.0, -118.0), &parks, 50);
        assert_eq!(ranked.len(), parks.len());
        assert!(SpatialAnalysis::nearest_k(&GeoPoint::new(34.0, -118.0), &[], 3).is_empty());
        assert!(SpatialAnalysis::nearest_k(&GeoPoint::new(34.0, -118.0), &parks, 0).is_empty());
    }

    #[test]
    fn ties_keep_catalog_order() {
        let sites = vec![
            ReferenceLocation::new("East", 0.0, 1.0),
            ReferenceLocation::new("West", 0.0, -1.0),
            ReferenceLocation::new("Far", 0.0, 5.0),
        ];
        let ranked = SpatialAnalysis::nearest_k(&GeoPoint::new(0.0, 0.0), &sites, 2);
        assert_eq!(ranked[0].location.name, "East");
        assert_eq!(ranked[1].location.name, "West");
    }

    fn sites() -> impl Strategy<Value = Vec<ReferenceLocation>> {
        prop::collection::vec((33.5f64..34.5, -118.8f64..-117.8), 0..16).prop_map(|v| {
            v.into_iter()
                .enumerate()
                .map(|(i, (lat, lon))| ReferenceLocation::new(format!("site-{i}"), lat, lon))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn nearest_k_is_a_sorted_prefix(
            sites in sites(),
            k in 0usize..20,
            lat in 33.5f64..34.5,
            lon in -118.8f64..-117.8,
        ) {
            let ranked = SpatialAnalysis::nearest_k(&GeoPoint::new(lat, lon), &sites, k);
            prop_assert_eq!(ranked.len(), k.min(sites.len()));
            prop_assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

            let mut names: Vec<&str> = ranked.iter().map(|r| r.location.name.as_str()).collect();
            prop_assert!(names.iter().all(|n| sites.iter().any(|s| s.name == *n)));
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), ranked.len());
        }
    }
}

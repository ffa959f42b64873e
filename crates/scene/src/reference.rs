use std::sync::Arc;

use foundation::geo::GeoPoint;
use serde::Serialize;

/// A candidate mitigation site, such as a park.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLocation {
    pub name: String,
    pub location: GeoPoint,
}

impl ReferenceLocation {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            location: GeoPoint::new(lat, lon),
        }
    }
}

/// Static green-space catalog for the Los Angeles deployment.
pub fn los_angeles_parks() -> Arc<[ReferenceLocation]> {
    [
        ReferenceLocation::new("Griffith Park", 34.1365, -118.2942),
        ReferenceLocation::new("Elysian Park", 34.0838, -118.2376),
        ReferenceLocation::new("Kenneth Hahn Rec Area", 34.0085, -118.3644),
        ReferenceLocation::new("Hansen Dam", 34.2585, -118.3779),
        ReferenceLocation::new("Exposition Park", 34.0183, -118.2861),
        ReferenceLocation::new("MacArthur Park", 34.0594, -118.2796),
        ReferenceLocation::new("Echo Park", 34.0728, -118.2606),
        ReferenceLocation::new("Grand Park", 34.0564, -118.2467),
        ReferenceLocation::new("Vista Hermosa", 34.0657, -118.2656),
        ReferenceLocation::new("Lafayette Park", 34.0607, -118.2914),
    ]
    .into()
}

#[cfg(test)]
mod tests {
    use super::los_angeles_parks;

    #[test]
    fn catalog_is_small_and_valid() {
        let parks = los_angeles_parks();
        assert_eq!(parks.len(), 10);
        assert!(parks.iter().all(|p| p.location.is_valid()));
    }
}

//! Geographic coordinates and the validation gate every external coordinate
//! passes through before it reaches camera or query logic.

use serde::{Deserialize, Serialize};

pub const MIN_LAT_DEG: f64 = -90.0;
pub const MAX_LAT_DEG: f64 = 90.0;
pub const MIN_LON_DEG: f64 = -180.0;
pub const MAX_LON_DEG: f64 = 180.0;

/// Returns `true` when `(lat, lon)` is a finite WGS84 position in degrees.
///
/// NaN, infinities and anything outside `[-90, 90]` x `[-180, 180]` fail.
#[inline]
pub fn is_valid(lat: f64, lon: f64) -> bool {
    // Range comparisons are false for NaN, so the finiteness check only has to
    // catch the infinities, which the inclusive bounds already exclude.
    (MIN_LAT_DEG..=MAX_LAT_DEG).contains(&lat) && (MIN_LON_DEG..=MAX_LON_DEG).contains(&lon)
}

#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate (lat {lat}, lon {lon})")]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A position in degrees.
///
/// Construct through [`GeoPoint::try_new`] when the values come from outside
/// the process. `new` is for literals that are known to be in range.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn try_new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if is_valid(lat, lon) {
            Ok(Self { lat, lon })
        } else {
            Err(InvalidCoordinate { lat, lon })
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid(self.lat, self.lon)
    }

    /// Re-validates a point that may have been built with [`GeoPoint::new`].
    pub fn validated(self) -> Result<Self, InvalidCoordinate> {
        Self::try_new(self.lat, self.lon)
    }

    /// `[lon, lat]`, the axis order rendering engines and GeoJSON expect.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Both axes within `tolerance_deg` of `other`.
    pub fn approx_eq(&self, other: &GeoPoint, tolerance_deg: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance_deg && (self.lon - other.lon).abs() < tolerance_deg
    }
}

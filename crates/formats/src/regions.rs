use foundation::geo::GeoPoint;
use scene::region::{Polygon, RegionCatalog, RegionPolygon};
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::geojson::{FeatureCollection, Geometry};

/// Property holding the region's display name.
pub const REGION_NAME_PROPERTY: &str = "name";

pub fn parse_region_catalog(payload: &str) -> Result<RegionCatalog, FormatError> {
    let fc = FeatureCollection::from_geojson_str(payload)?;
    Ok(regions_from_geojson(&fc))
}

/// Builds a catalog from the polygonal, named features of `fc`.
///
/// Unnamed features, non-polygonal geometries and polygons with
/// out-of-range vertices are dropped; document order is kept.
pub fn regions_from_geojson(fc: &FeatureCollection) -> RegionCatalog {
    let mut regions = Vec::new();
    for (index, feature) in fc.features.iter().enumerate() {
        let Some(name) = feature.property_str(REGION_NAME_PROPERTY) else {
            debug!(index, "region feature without a name, skipped");
            continue;
        };
        let polygons = match &feature.geometry {
            Some(Geometry::Polygon(rings)) => vec![rings.clone()],
            Some(Geometry::MultiPolygon(polys)) => polys.clone(),
            _ => {
                debug!(index, name, "region feature is not polygonal, skipped");
                continue;
            }
        };

        let polygons: Vec<Polygon> = polygons
            .into_iter()
            .filter(|rings| {
                let ok = rings.iter().flatten().all(GeoPoint::is_valid);
                if !ok {
                    warn!(index, name, "region polygon has invalid vertices, dropped");
                }
                ok
            })
            .map(Polygon::new)
            .collect();
        if polygons.is_empty() {
            continue;
        }
        regions.push(RegionPolygon::new(name, polygons));
    }
    RegionCatalog::new(regions)
}

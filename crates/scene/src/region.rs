use std::sync::Arc;

use foundation::bounds::GeoBounds;
use foundation::geo::GeoPoint;
use serde::Serialize;

/// One polygon: the outer ring first, holes after it.
///
/// Rings may or may not repeat their first vertex at the end; both forms
/// test the same.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub rings: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    pub fn new(rings: Vec<Vec<GeoPoint>>) -> Self {
        Self { rings }
    }

    pub fn outer(&self) -> &[GeoPoint] {
        self.rings.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Even-odd membership: inside the outer ring and outside every hole.
    pub fn contains(&self, p: &GeoPoint) -> bool {
        let outer = self.outer();
        if outer.len() < 3 || !ring_contains(outer, p) {
            return false;
        }
        !self.rings[1..].iter().any(|hole| ring_contains(hole, p))
    }
}

/// Ray casting in the lon/lat plane.
fn ring_contains(ring: &[GeoPoint], p: &GeoPoint) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].lon, ring[i].lat);
        let (xj, yj) = (ring[j].lon, ring[j].lat);
        if (yi > p.lat) != (yj > p.lat) && p.lon < (xj - xi) * (p.lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Named (multi-)polygon boundary such as a neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPolygon {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl RegionPolygon {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        Self {
            name: name.into(),
            polygons,
        }
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        self.polygons.iter().any(|poly| poly.contains(p))
    }

    /// Bounding box over every outer ring.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.polygons.iter().flat_map(|poly| poly.outer()))
    }

    /// Center of the bounding box; what the neighborhood picker flies to.
    pub fn center(&self) -> Option<GeoPoint> {
        self.bounds().map(|b| b.center())
    }
}

/// Region boundaries loaded once per session, in document order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct RegionCatalog {
    regions: Arc<[RegionPolygon]>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<RegionPolygon>) -> Self {
        Self {
            regions: regions.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn as_slice(&self) -> &[RegionPolygon] {
        &self.regions
    }

    pub fn get(&self, name: &str) -> Option<&RegionPolygon> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Region names sorted for display in a picker.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.regions.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

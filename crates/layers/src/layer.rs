use std::fmt;

use foundation::geo::GeoPoint;
use scene::anomaly::AnomalyId;
use serde::Serialize;

use crate::symbology::Rgba;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `prefix-index`, e.g. `pulse-ring-2`.
    pub fn indexed(prefix: &str, index: usize) -> Self {
        Self(format!("{prefix}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a pickable marker refers back to; the renderer hands this back on
/// hover or click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum PickRef {
    Anomaly(AnomalyId),
    Site(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub position: [f64; 2],
    pub radius_px: f64,
    /// `None` draws the outline only.
    pub fill: Option<Rgba>,
    pub line: Rgba,
    pub line_width_px: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick: Option<PickRef>,
}

impl Marker {
    pub fn at(point: GeoPoint) -> Self {
        Self {
            position: point.lon_lat(),
            radius_px: 1.0,
            fill: None,
            line: Rgba::TRANSPARENT,
            line_width_px: 0.0,
            pick: None,
        }
    }
}

/// Where an outline layer's geometry comes from. The renderer resolves
/// documents itself; only the reference crosses the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum OutlineSource {
    Document { uri: String },
    /// The loaded region catalog, drawn from the document it was parsed from.
    Regions { uri: String, count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineLayer {
    #[serde(flatten)]
    pub source: OutlineSource,
    pub fill: Option<Rgba>,
    pub line: Rgba,
    pub line_width_px: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width_min_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width_max_px: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcLayer {
    pub source: [f64; 2],
    pub target: [f64; 2],
    pub source_color: Rgba,
    pub target_color: Rgba,
    pub width_px: f64,
    /// Arc height relative to its length.
    pub height: f64,
    pub great_circle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayerKind {
    Outline(OutlineLayer),
    Scatter { markers: Vec<Marker> },
    Arc(ArcLayer),
}

/// One declarative layer, in draw order within a [`RenderFrame`](crate::RenderFrame).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLayer {
    pub id: LayerId,
    pub pickable: bool,
    #[serde(flatten)]
    pub kind: LayerKind,
}

impl RenderLayer {
    pub fn new(id: LayerId, kind: LayerKind) -> Self {
        Self {
            id,
            pickable: false,
            kind,
        }
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }

    pub fn markers(&self) -> &[Marker] {
        match &self.kind {
            LayerKind::Scatter { markers } => markers,
            _ => &[],
        }
    }
}

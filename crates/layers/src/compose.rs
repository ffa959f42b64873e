//! Frame composition: current state in, ordered layer list out.
//!
//! [`compose_frame`] is a pure function. Equal inputs produce equal frames,
//! which is what lets the host drop frames identical to the last one it sent.

use compute::analysis::SpatialAnalysis;
use foundation::time::Time;
use runtime::clock::PulseTrain;
use scene::anomaly::{Anomaly, AnomalySet};
use scene::camera::CameraPose;
use scene::reference::ReferenceLocation;
use scene::region::RegionCatalog;
use scene::selection::SelectionState;
use serde::Serialize;

use crate::layer::{ArcLayer, LayerId, LayerKind, Marker, OutlineLayer, OutlineSource, PickRef, RenderLayer};
use crate::symbology::{
    CYAN, HEAT_RED, MAGENTA, PARK_EDGE, PARK_GREEN, Rgba, SLATE, anomaly_radius_px, severity_color,
};

pub const DEFAULT_RELATED_SITES: usize = 3;

pub const ANOMALY_LAYER: &str = "anomalies";
pub const REGIONS_LAYER: &str = "regions";
pub const SITES_LAYER: &str = "reference-sites";
pub const PULSE_CORE_LAYER: &str = "pulse-core";
pub const PULSE_RING_PREFIX: &str = "pulse-ring";
pub const RELATED_ARC_PREFIX: &str = "related-arc";
pub const RELATED_SITE_PREFIX: &str = "related-site";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayerToggles {
    pub heat_islands: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self { heat_islands: true }
    }
}

/// Paths or URLs of the boundary documents the renderer draws outlines from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundaryDocuments {
    pub county: String,
    pub city: String,
    pub neighborhoods: String,
}

/// State read together at the start of a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub camera: CameraPose,
    pub selection: &'a SelectionState,
    pub time: Time,
}

/// Data the layers are built from.
#[derive(Debug, Clone, Copy)]
pub struct LayerInputs<'a> {
    pub anomalies: &'a AnomalySet,
    /// `None` until the neighborhood catalog has loaded.
    pub regions: Option<&'a RegionCatalog>,
    pub sites: &'a [ReferenceLocation],
    pub boundaries: &'a BoundaryDocuments,
    pub toggles: LayerToggles,
    pub pulse: PulseTrain,
    pub related_sites: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub camera: CameraPose,
    pub layers: Vec<RenderLayer>,
}

impl RenderFrame {
    pub fn layer(&self, id: &str) -> Option<&RenderLayer> {
        self.layers.iter().find(|l| l.id.as_str() == id)
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }
}

pub fn compose_frame(snapshot: &FrameSnapshot<'_>, inputs: &LayerInputs<'_>) -> RenderFrame {
    let mut layers = boundary_layers(inputs.boundaries);

    if let Some(regions) = inputs.regions {
        layers.push(regions_layer(&inputs.boundaries.neighborhoods, regions));
    }

    layers.push(sites_layer(inputs.sites));

    if inputs.toggles.heat_islands {
        layers.push(anomaly_layer(inputs.anomalies));
    }

    let selected = snapshot
        .selection
        .selected()
        .and_then(|id| inputs.anomalies.get(id))
        .filter(|a| a.location.is_valid());
    if let Some(anomaly) = selected {
        layers.extend(pulse_layers(anomaly, &inputs.pulse, snapshot.time));
        if snapshot.selection.analysis() {
            layers.extend(analysis_layers(anomaly, inputs.sites, inputs.related_sites));
        }
    }

    RenderFrame {
        camera: snapshot.camera,
        layers,
    }
}

fn outline(
    id: &str,
    uri: &str,
    fill: Option<Rgba>,
    line: Rgba,
    width: f64,
    min_max: Option<(f64, f64)>,
) -> RenderLayer {
    RenderLayer::new(
        LayerId::new(id),
        LayerKind::Outline(OutlineLayer {
            source: OutlineSource::Document {
                uri: uri.to_string(),
            },
            fill,
            line,
            line_width_px: width,
            line_width_min_px: min_max.map(|(min, _)| min),
            line_width_max_px: min_max.map(|(_, max)| max),
        }),
    )
}

/// County and city borders, each a wide faint glow under a thin core line.
fn boundary_layers(docs: &BoundaryDocuments) -> Vec<RenderLayer> {
    vec![
        outline("county-glow", &docs.county, None, CYAN.with_alpha(40), 6.0, Some((2.0, 8.0))),
        outline("county-core", &docs.county, None, CYAN.with_alpha(150), 2.0, Some((1.0, 3.0))),
        outline(
            "city-glow",
            &docs.city,
            Some(Rgba::rgb(255, 0, 255, 5)),
            MAGENTA.with_alpha(50),
            8.0,
            Some((3.0, 10.0)),
        ),
        outline("city-core", &docs.city, None, MAGENTA.with_alpha(200), 2.0, Some((1.0, 3.0))),
    ]
}

fn regions_layer(uri: &str, regions: &RegionCatalog) -> RenderLayer {
    RenderLayer::new(
        LayerId::new(REGIONS_LAYER),
        LayerKind::Outline(OutlineLayer {
            source: OutlineSource::Regions {
                uri: uri.to_string(),
                count: regions.len(),
            },
            fill: None,
            line: SLATE.with_alpha(40),
            line_width_px: 1.0,
            line_width_min_px: None,
            line_width_max_px: None,
        }),
    )
}

fn sites_layer(sites: &[ReferenceLocation]) -> RenderLayer {
    let markers = sites
        .iter()
        .map(|site| Marker {
            radius_px: 8.0,
            fill: Some(PARK_GREEN.with_alpha(200)),
            line: PARK_EDGE,
            line_width_px: 2.0,
            pick: Some(PickRef::Site(site.name.clone())),
            ..Marker::at(site.location)
        })
        .collect();
    RenderLayer::new(LayerId::new(SITES_LAYER), LayerKind::Scatter { markers }).pickable()
}

fn anomaly_layer(anomalies: &AnomalySet) -> RenderLayer {
    let markers = anomalies
        .iter()
        .map(|a| Marker {
            radius_px: anomaly_radius_px(a.intensity),
            fill: Some(severity_color(a.severity)),
            line: Rgba::rgb(255, 255, 255, 150),
            line_width_px: 1.0,
            pick: Some(PickRef::Anomaly(a.id.clone())),
            ..Marker::at(a.location)
        })
        .collect();
    RenderLayer::new(LayerId::new(ANOMALY_LAYER), LayerKind::Scatter { markers }).pickable()
}

fn pulse_layers(anomaly: &Anomaly, pulse: &PulseTrain, time: Time) -> Vec<RenderLayer> {
    let core = Marker {
        radius_px: 12.0,
        fill: Some(CYAN.with_alpha(25)),
        line: CYAN,
        line_width_px: 3.0,
        ..Marker::at(anomaly.location)
    };
    let mut layers = vec![RenderLayer::new(
        LayerId::new(PULSE_CORE_LAYER),
        LayerKind::Scatter {
            markers: vec![core],
        },
    )];

    for (i, ring) in pulse.rings_at(time).enumerate() {
        let marker = Marker {
            radius_px: ring.radius,
            fill: None,
            line: CYAN.with_alpha(ring.opacity),
            line_width_px: 2.0,
            ..Marker::at(anomaly.location)
        };
        layers.push(RenderLayer::new(
            LayerId::indexed(PULSE_RING_PREFIX, i),
            LayerKind::Scatter {
                markers: vec![marker],
            },
        ));
    }
    layers
}

/// Arcs from each of the nearest sites to the anomaly, then a highlight ring
/// on each site.
fn analysis_layers(anomaly: &Anomaly, sites: &[ReferenceLocation], k: usize) -> Vec<RenderLayer> {
    let ranked = SpatialAnalysis::nearest_k(&anomaly.location, sites, k);

    let arcs = ranked.iter().enumerate().map(|(i, r)| {
        RenderLayer::new(
            LayerId::indexed(RELATED_ARC_PREFIX, i),
            LayerKind::Arc(ArcLayer {
                source: r.location.location.lon_lat(),
                target: anomaly.location.lon_lat(),
                source_color: PARK_GREEN,
                target_color: HEAT_RED,
                width_px: 4.0,
                height: 0.3,
                great_circle: true,
            }),
        )
    });
    let highlights = ranked.iter().enumerate().map(|(i, r)| {
        let marker = Marker {
            radius_px: 14.0,
            fill: None,
            line: PARK_GREEN,
            line_width_px: 3.0,
            ..Marker::at(r.location.location)
        };
        RenderLayer::new(
            LayerId::indexed(RELATED_SITE_PREFIX, i),
            LayerKind::Scatter {
                markers: vec![marker],
            },
        )
    });
    arcs.chain(highlights).collect()
}

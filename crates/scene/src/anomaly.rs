use std::fmt;
use std::sync::Arc;

use foundation::geo::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyId(pub String);

impl AnomalyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnomalyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity classification reported by the detector.
///
/// `Unknown` covers labels outside the four known classes; it still renders,
/// with a neutral color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Extreme,
    Unknown,
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "extreme" => Severity::Extreme,
            _ => Severity::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Extreme => "extreme",
            Severity::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub id: AnomalyId,
    pub location: GeoPoint,
    /// Temperature excess over the surroundings (°C), never negative.
    pub intensity: f64,
    pub severity: Severity,
    pub avg_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub size_pixels: Option<u32>,
}

/// Immutable anomaly collection.
///
/// Refreshes build a new set and swap it in whole; nothing edits a set in
/// place, so a frame never sees half of an update.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AnomalySet {
    items: Arc<[Anomaly]>,
}

impl AnomalySet {
    pub fn new(items: Vec<Anomaly>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Anomaly] {
        &self.items
    }

    pub fn get(&self, id: &AnomalyId) -> Option<&Anomaly> {
        self.items.iter().find(|a| &a.id == id)
    }

    /// First anomaly whose location is within `tolerance_deg` of `point` on
    /// both axes.
    pub fn near(&self, point: &GeoPoint, tolerance_deg: f64) -> Option<&Anomaly> {
        self.items
            .iter()
            .find(|a| a.location.approx_eq(point, tolerance_deg))
    }
}

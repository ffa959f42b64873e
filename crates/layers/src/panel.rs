use compute::analysis::{RegionMatch, SpatialAnalysis};
use scene::anomaly::{AnomalyId, AnomalySet, Severity};
use scene::reference::ReferenceLocation;
use scene::region::RegionCatalog;
use scene::selection::SelectionState;
use serde::Serialize;

use crate::tooltip::anomaly_title;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySite {
    pub name: String,
    pub distance_km: f64,
}

/// Detail card for the selected anomaly.
///
/// `nearest` is only filled in analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionPanel {
    pub id: AnomalyId,
    pub title: String,
    /// `None` while the region catalog is not loaded.
    pub region: Option<RegionMatch>,
    pub severity: Severity,
    pub intensity: f64,
    pub avg_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub size_pixels: Option<u32>,
    pub analysis: bool,
    pub nearest: Vec<NearbySite>,
}

impl SelectionPanel {
    pub fn text(&self) -> String {
        let mut out = self.title.clone();
        if let Some(region) = &self.region {
            out.push('\n');
            out.push_str(region.label());
        }
        out.push_str(&format!("\nIntensity: +{}°C", self.intensity));
        match self.max_temp_c {
            Some(t) => out.push_str(&format!("\nMax Temp: {t}°C")),
            None => out.push_str("\nMax Temp: n/a"),
        }
        if self.analysis {
            out.push_str("\nNearest Parks");
            for site in &self.nearest {
                out.push_str(&format!("\n{} {:.1}km", site.name, site.distance_km));
            }
        }
        out
    }
}

/// Card for the current selection, or `None` when nothing resolvable is
/// selected.
pub fn selection_panel(
    selection: &SelectionState,
    anomalies: &AnomalySet,
    regions: Option<&RegionCatalog>,
    sites: &[ReferenceLocation],
    related_sites: usize,
) -> Option<SelectionPanel> {
    let anomaly = anomalies.get(selection.selected()?)?;
    let nearest = if selection.analysis() {
        SpatialAnalysis::nearest_k(&anomaly.location, sites, related_sites)
            .into_iter()
            .map(|r| NearbySite {
                name: r.location.name,
                distance_km: r.distance_km,
            })
            .collect()
    } else {
        Vec::new()
    };
    Some(SelectionPanel {
        id: anomaly.id.clone(),
        title: anomaly_title(anomaly.id.as_str()),
        region: regions.map(|r| SpatialAnalysis::region_containing(&anomaly.location, r)),
        severity: anomaly.severity,
        intensity: anomaly.intensity,
        avg_temp_c: anomaly.avg_temp_c,
        max_temp_c: anomaly.max_temp_c,
        size_pixels: anomaly.size_pixels,
        analysis: selection.analysis(),
        nearest,
    })
}

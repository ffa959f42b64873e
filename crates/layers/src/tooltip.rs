use compute::analysis::{RegionMatch, SpatialAnalysis};
use scene::anomaly::AnomalySet;
use scene::region::RegionCatalog;
use serde::Serialize;

use crate::layer::PickRef;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Tooltip {
    Anomaly {
        title: String,
        /// `None` while the region catalog is not loaded.
        region: Option<RegionMatch>,
        avg_temp_c: Option<f64>,
        intensity: f64,
    },
    Site {
        name: String,
    },
}

impl Tooltip {
    /// Plain-text rendering, one fact per line.
    pub fn text(&self) -> String {
        match self {
            Tooltip::Anomaly {
                title,
                region,
                avg_temp_c,
                intensity,
            } => {
                let region = region
                    .as_ref()
                    .map_or("Region data unavailable", RegionMatch::label);
                let avg = avg_temp_c.map_or_else(|| "n/a".to_string(), |t| format!("{t}°C"));
                format!("{title}\n{region}\nAvg Temp: {avg}\nIntensity: +{intensity}°C")
            }
            Tooltip::Site { name } => name.clone(),
        }
    }
}

/// `hi_12` reads as `Heat Island #12`; other ids are shown as they are.
pub fn anomaly_title(id: &str) -> String {
    match id.strip_prefix("hi_") {
        Some(n) => format!("Heat Island #{n}"),
        None => format!("Heat Island {id}"),
    }
}

/// Tooltip for a hovered marker. `None` when the reference no longer
/// resolves, e.g. after a refresh dropped the anomaly.
pub fn tooltip_for(
    pick: &PickRef,
    anomalies: &AnomalySet,
    regions: Option<&RegionCatalog>,
) -> Option<Tooltip> {
    match pick {
        PickRef::Anomaly(id) => {
            let anomaly = anomalies.get(id)?;
            Some(Tooltip::Anomaly {
                title: anomaly_title(id.as_str()),
                region: regions.map(|r| SpatialAnalysis::region_containing(&anomaly.location, r)),
                avg_temp_c: anomaly.avg_temp_c,
                intensity: anomaly.intensity,
            })
        }
        PickRef::Site(name) => Some(Tooltip::Site { name: name.clone() }),
    }
}

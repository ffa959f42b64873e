//! Heat-island feed (`GET {api}/heat-islands/all`).
//!
//! The payload is decoded record by record: a malformed record is dropped
//! with a warning instead of failing the whole refresh.

use std::collections::BTreeMap;

use foundation::geo::GeoPoint;
use scene::anomaly::{Anomaly, AnomalyId, AnomalySet, Severity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FormatError;

pub const HEAT_ISLANDS_PATH: &str = "heat-islands/all";

#[derive(Debug, Clone, Deserialize)]
struct FeedPayload {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    heat_islands: Vec<Value>,
    #[serde(default)]
    severity_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Clone, Deserialize)]
struct FeedRecord {
    id: RawId,
    lat: f64,
    lon: f64,
    intensity: f64,
    // Auxiliary fields never decide whether a record is kept.
    #[serde(default)]
    severity: Option<Value>,
    #[serde(default)]
    avg_temp: Option<Value>,
    #[serde(default)]
    max_temp: Option<Value>,
    #[serde(default)]
    size_pixels: Option<Value>,
}

/// Numbers, or numeric strings such as `"41.5"`. Anything else is dropped.
fn lenient_f64(value: Option<Value>, field: &'static str) -> Option<f64> {
    let parsed = match value? {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let parsed = parsed.filter(|v| v.is_finite());
    if parsed.is_none() {
        debug!(field, "ignoring unusable auxiliary value");
    }
    parsed
}

/// Whole, non-negative pixel counts; `120.0` is accepted as `120`.
fn lenient_count(value: Option<Value>, field: &'static str) -> Option<u32> {
    let v = lenient_f64(value, field)?;
    if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        debug!(field, value = v, "ignoring unusable auxiliary value");
        None
    }
}

impl FeedRecord {
    fn into_anomaly(self) -> Result<Anomaly, String> {
        let location = GeoPoint::try_new(self.lat, self.lon).map_err(|e| e.to_string())?;
        if !(self.intensity.is_finite() && self.intensity >= 0.0) {
            return Err(format!("invalid intensity {}", self.intensity));
        }
        let id = match self.id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        Ok(Anomaly {
            id: AnomalyId(id),
            location,
            intensity: self.intensity,
            severity: self
                .severity
                .as_ref()
                .and_then(Value::as_str)
                .map_or(Severity::Unknown, Severity::from_label),
            avg_temp_c: lenient_f64(self.avg_temp, "avg_temp"),
            max_temp_c: lenient_f64(self.max_temp, "max_temp"),
            size_pixels: lenient_count(self.size_pixels, "size_pixels"),
        })
    }
}

/// Counts reported alongside the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FeedSummary {
    /// As reported upstream; may exceed the number of usable records.
    pub total_count: u64,
    pub severity_distribution: BTreeMap<String, u64>,
    pub dropped: usize,
}

impl FeedSummary {
    pub fn count(&self, severity: Severity) -> u64 {
        self.severity_distribution
            .get(severity.label())
            .copied()
            .unwrap_or(0)
    }

    /// Extreme plus high.
    pub fn severe_count(&self) -> u64 {
        self.count(Severity::Extreme) + self.count(Severity::High)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatIslandFeed {
    pub anomalies: AnomalySet,
    pub summary: FeedSummary,
}

impl HeatIslandFeed {
    pub fn from_json_str(payload: &str) -> Result<Self, FormatError> {
        let payload: FeedPayload = serde_json::from_str(payload)?;
        Ok(Self::from_payload(payload))
    }

    pub fn from_json_value(value: Value) -> Result<Self, FormatError> {
        let payload: FeedPayload = serde_json::from_value(value)?;
        Ok(Self::from_payload(payload))
    }

    fn from_payload(payload: FeedPayload) -> Self {
        let received = payload.heat_islands.len();
        let mut anomalies = Vec::with_capacity(received);
        let mut dropped = 0;
        for (index, raw) in payload.heat_islands.into_iter().enumerate() {
            let decoded = serde_json::from_value::<FeedRecord>(raw)
                .map_err(|e| e.to_string())
                .and_then(FeedRecord::into_anomaly);
            match decoded {
                Ok(a) => anomalies.push(a),
                Err(reason) => {
                    warn!(index, %reason, "heat-island record dropped");
                    dropped += 1;
                }
            }
        }
        debug!(received, kept = anomalies.len(), dropped, "heat-island feed decoded");

        let summary = FeedSummary {
            total_count: payload.total_count.unwrap_or(received as u64),
            severity_distribution: payload.severity_distribution,
            dropped,
        };
        Self {
            anomalies: AnomalySet::new(anomalies),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HeatIslandFeed;
    use crate::error::FormatError;
    use pretty_assertions::assert_eq;
    use scene::anomaly::{AnomalyId, Severity};

    const PAYLOAD: &str = r#"{
        "total_count": 5,
        "heat_islands": [
            {"id": "hi_1", "lat": 34.05, "lon": -118.25, "intensity": 6.2, "severity": "extreme",
             "avg_temp": 41.5, "max_temp": 47.0, "size_pixels": 120},
            {"id": 2, "lat": 34.10, "lon": -118.30, "intensity": 2.1, "severity": "Low"},
            {"id": "hi_3", "lat": 134.0, "lon": -118.3, "intensity": 3.0, "severity": "high"},
            {"id": "hi_4", "lat": 34.0, "lon": -118.3, "intensity": -1.0, "severity": "high"},
            {"id": "hi_5", "lat": "34.0", "lon": -118.3, "intensity": 1.0},
            {"id": "hi_6", "lat": 34.2, "lon": -118.4, "intensity": 1.5, "severity": "scorching"}
        ],
        "severity_distribution": {"extreme": 1, "high": 2, "low": 1}
    }"#;

    #[test]
    fn decodes_and_normalises_records() {
        let feed = HeatIslandFeed::from_json_str(PAYLOAD).unwrap();
        let ids: Vec<&str> = feed.anomalies.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["hi_1", "2", "hi_6"]);

        let first = feed.anomalies.get(&AnomalyId::new("hi_1")).unwrap();
        assert_eq!(first.severity, Severity::Extreme);
        assert_eq!(first.avg_temp_c, Some(41.5));
        assert_eq!(first.size_pixels, Some(120));
        assert_eq!(feed.anomalies.as_slice()[1].severity, Severity::Low);
        assert_eq!(feed.anomalies.as_slice()[2].severity, Severity::Unknown);

        assert_eq!(feed.summary.dropped, 3);
        assert_eq!(feed.summary.total_count, 5);
        assert_eq!(feed.summary.severe_count(), 3);
        assert_eq!(feed.summary.count(Severity::Medium), 0);
    }

    #[test]
    fn badly_typed_auxiliary_fields_keep_the_record() {
        let payload = r#"{
            "heat_islands": [
                {"id": "hi_1", "lat": 34.05, "lon": -118.25, "intensity": 6.2, "size_pixels": 120.0},
                {"id": "hi_2", "lat": 34.10, "lon": -118.30, "intensity": 2.1, "avg_temp": "41.5",
                 "max_temp": true, "severity": 3},
                {"id": "hi_3", "lat": 34.20, "lon": -118.40, "intensity": 1.0, "size_pixels": -4,
                 "avg_temp": null}
            ]
        }"#;
        let feed = HeatIslandFeed::from_json_str(payload).unwrap();
        assert_eq!(feed.anomalies.len(), 3);
        assert_eq!(feed.summary.dropped, 0);

        let slice = feed.anomalies.as_slice();
        assert_eq!(slice[0].size_pixels, Some(120));
        assert_eq!(slice[1].avg_temp_c, Some(41.5));
        assert_eq!(slice[1].max_temp_c, None);
        assert_eq!(slice[1].severity, Severity::Unknown);
        assert_eq!(slice[2].size_pixels, None);
        assert_eq!(slice[2].avg_temp_c, None);
    }

    #[test]
    fn empty_payload_is_an_empty_feed() {
        let feed = HeatIslandFeed::from_json_str("{}").unwrap();
        assert!(feed.anomalies.is_empty());
        assert_eq!(feed.summary.total_count, 0);
    }

    #[test]
    fn non_object_payload_is_an_error() {
        assert!(matches!(
            HeatIslandFeed::from_json_str(r#""nope""#),
            Err(FormatError::Json(_))
        ));
    }
}

//! Line commands read from stdin.

use std::str::FromStr;

use foundation::geo::GeoPoint;
use layers::layer::PickRef;
use scene::anomaly::AnomalyId;
use scene::camera::{CameraPose, Interpolation};

use crate::error::ViewerError;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(AnomalyId),
    Clear,
    Related,
    Fly { lat: f64, lon: f64, zoom: Option<f64> },
    Goto { lat: f64, lon: f64 },
    Region(String),
    Cluster { primary: GeoPoint, satellites: Vec<GeoPoint> },
    /// Pose reported by the renderer after a drag/zoom/rotate.
    Pose(CameraPose),
    Hover(PickRef),
    /// Detail card for the current selection.
    Info,
    /// Names of the loaded regions.
    Regions,
    Reset,
    Heat(bool),
    Quit,
}

fn number(word: Option<&str>, what: &str) -> Result<f64, ViewerError> {
    let word = word.ok_or_else(|| ViewerError::InvalidCommand(format!("missing {what}")))?;
    word.parse::<f64>()
        .map_err(|_| ViewerError::InvalidCommand(format!("{what} is not a number: {word}")))
}

fn rest(words: std::str::SplitWhitespace<'_>, what: &str) -> Result<String, ViewerError> {
    let joined = words.collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        Err(ViewerError::InvalidCommand(format!("missing {what}")))
    } else {
        Ok(joined)
    }
}

impl FromStr for Command {
    type Err = ViewerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| ViewerError::InvalidCommand("empty line".to_string()))?;

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "select" => Command::Select(AnomalyId::new(rest(words, "anomaly id")?)),
            "clear" => Command::Clear,
            "related" => Command::Related,
            "fly" => {
                let lat = number(words.next(), "latitude")?;
                let lon = number(words.next(), "longitude")?;
                let zoom = match words.next() {
                    Some(z) => Some(number(Some(z), "zoom")?),
                    None => None,
                };
                Command::Fly { lat, lon, zoom }
            }
            "goto" => Command::Goto {
                lat: number(words.next(), "latitude")?,
                lon: number(words.next(), "longitude")?,
            },
            "region" => Command::Region(rest(words, "region name")?),
            "cluster" => {
                let values = words
                    .map(|w| number(Some(w), "coordinate"))
                    .collect::<Result<Vec<_>, _>>()?;
                if values.len() < 4 || values.len() % 2 != 0 {
                    return Err(ViewerError::InvalidCommand(
                        "cluster needs lat/lon pairs: primary then satellites".to_string(),
                    ));
                }
                let mut points = values.chunks_exact(2).map(|c| GeoPoint::new(c[0], c[1]));
                let primary = points
                    .next()
                    .ok_or_else(|| ViewerError::InvalidCommand("missing primary".to_string()))?;
                Command::Cluster {
                    primary,
                    satellites: points.collect(),
                }
            }
            "pose" => Command::Pose(CameraPose {
                latitude: number(words.next(), "latitude")?,
                longitude: number(words.next(), "longitude")?,
                zoom: number(words.next(), "zoom")?,
                pitch: number(words.next(), "pitch")?,
                bearing: number(words.next(), "bearing")?,
                transition_duration_ms: 0,
                interpolation: Interpolation::Linear,
            }),
            "hover" => match words.next() {
                Some("anomaly") => Command::Hover(PickRef::Anomaly(AnomalyId::new(rest(words, "anomaly id")?))),
                Some("site") => Command::Hover(PickRef::Site(rest(words, "site name")?)),
                _ => {
                    return Err(ViewerError::InvalidCommand(
                        "hover needs `anomaly <id>` or `site <name>`".to_string(),
                    ))
                }
            },
            "info" => Command::Info,
            "regions" => Command::Regions,
            "reset" => Command::Reset,
            "heat" => match words.next() {
                Some("on") => Command::Heat(true),
                Some("off") => Command::Heat(false),
                _ => return Err(ViewerError::InvalidCommand("heat needs on|off".to_string())),
            },
            "quit" | "exit" => Command::Quit,
            other => return Err(ViewerError::InvalidCommand(format!("unknown command: {other}"))),
        };
        Ok(cmd)
    }
}

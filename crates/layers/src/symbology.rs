use scene::anomaly::Severity;
use serde::Serialize;

/// 8-bit RGBA, serialized as `[r, g, b, a]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    pub const fn rgb(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, a])
    }
}

pub const CYAN: Rgba = Rgba::rgb(0, 255, 255, 255);
pub const MAGENTA: Rgba = Rgba::rgb(255, 0, 150, 255);
pub const PARK_GREEN: Rgba = Rgba::rgb(34, 197, 94, 255);
pub const PARK_EDGE: Rgba = Rgba::rgb(16, 120, 60, 255);
pub const HEAT_RED: Rgba = Rgba::rgb(239, 68, 68, 255);
pub const SLATE: Rgba = Rgba::rgb(100, 116, 139, 255);

pub const ANOMALY_ALPHA: u8 = 200;

pub fn severity_color(severity: Severity) -> Rgba {
    let rgb = match severity {
        Severity::Extreme => Rgba::rgb(239, 68, 68, 255),
        Severity::High => Rgba::rgb(249, 115, 22, 255),
        Severity::Medium => Rgba::rgb(234, 179, 8, 255),
        Severity::Low => Rgba::rgb(250, 204, 21, 255),
        Severity::Unknown => Rgba::rgb(200, 200, 200, 255),
    };
    rgb.with_alpha(ANOMALY_ALPHA)
}

/// Marker radius for an anomaly: grows with intensity, never below 6 px.
pub fn anomaly_radius_px(intensity: f64) -> f64 {
    (intensity * 1.5).max(6.0)
}

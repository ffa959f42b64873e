use clap::Parser;
use layers::compose::{BoundaryDocuments, DEFAULT_RELATED_SITES};
use runtime::animation::DEFAULT_FRAME_RATE_HZ;
use scene::camera::CameraTuning;

use crate::error::ViewerError;

/// Viewer host options. Every flag can also come from the environment.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Heat-island map viewer: reads commands on stdin, writes frames on stdout")]
pub struct ViewerConfig {
    /// Base URL of the heat-island API
    #[arg(long, env = "HEAT_API_BASE", default_value = "http://localhost:5000/api")]
    pub api_base: String,

    /// Access token for the basemap provider
    #[arg(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,

    /// County boundary GeoJSON (path or URL)
    #[arg(long, env = "COUNTY_BOUNDARY", default_value = "/data/LA_County_Boundary.geojson")]
    pub county_boundary: String,

    /// City boundary GeoJSON (path or URL)
    #[arg(long, env = "CITY_BOUNDARY", default_value = "/data/la_boundary.geojson")]
    pub city_boundary: String,

    /// Neighborhood polygons GeoJSON (path or URL)
    #[arg(long, env = "NEIGHBORHOODS", default_value = "/data/la_neighborhoods.geojson")]
    pub neighborhoods: String,

    #[arg(long, env = "FRAME_RATE", default_value_t = DEFAULT_FRAME_RATE_HZ)]
    pub frame_rate: f64,

    /// Added to the fitted cluster zoom
    #[arg(long, env = "ZOOM_BIAS", default_value_t = 0.8, allow_negative_numbers = true)]
    pub zoom_bias: f64,

    #[arg(long, env = "ZOOM_MIN", default_value_t = 9.0)]
    pub zoom_min: f64,

    #[arg(long, env = "ZOOM_MAX", default_value_t = 14.0)]
    pub zoom_max: f64,

    /// Reference sites linked to a selected anomaly in analysis mode
    #[arg(long, env = "RELATED_SITES", default_value_t = DEFAULT_RELATED_SITES)]
    pub related_sites: usize,

    /// Stop after this many animation frames (batch runs)
    #[arg(long, env = "MAX_FRAMES")]
    pub max_frames: Option<u64>,
}

impl ViewerConfig {
    /// The basemap token; a blank value counts as missing.
    pub fn access_token(&self) -> Result<&str, ViewerError> {
        match self.mapbox_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ViewerError::MissingCapability("map access token (MAPBOX_TOKEN)")),
        }
    }

    pub fn camera_tuning(&self) -> Result<CameraTuning, ViewerError> {
        let tuning = CameraTuning {
            zoom_bias: self.zoom_bias,
            zoom_min: self.zoom_min,
            zoom_max: self.zoom_max,
            ..CameraTuning::default()
        };
        tuning.validate().map_err(|err| {
            ViewerError::Config(format!(
                "zoom clamp [{}, {}] with bias {}: {err}",
                self.zoom_min, self.zoom_max, self.zoom_bias
            ))
        })?;
        Ok(tuning)
    }

    pub fn boundaries(&self) -> BoundaryDocuments {
        BoundaryDocuments {
            county: self.county_boundary.clone(),
            city: self.city_boundary.clone(),
            neighborhoods: self.neighborhoods.clone(),
        }
    }

    pub fn feed_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            formats::feed::HEAT_ISLANDS_PATH
        )
    }
}

use scene::camera::CameraError;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("required external capability missing: {0}")]
    MissingCapability(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("reference data not loaded: {0}")]
    MissingReferenceData(&'static str),
    #[error("unknown anomaly {0}")]
    UnknownAnomaly(String),
    #[error("unknown region {0}")]
    UnknownRegion(String),
    #[error("no anomaly selected")]
    NothingSelected,
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("upstream fetch failed for {uri}: {reason}")]
    UpstreamFetch { uri: String, reason: String },
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Format(#[from] formats::FormatError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

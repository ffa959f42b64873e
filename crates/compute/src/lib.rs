//! Spatial queries over the loaded anomaly and reference data.
pub mod analysis;

pub use analysis::*;

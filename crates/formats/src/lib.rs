//! Decoders for the documents the viewer loads: GeoJSON boundaries and the
//! heat-island feed. Everything is validated here, so the rest of the
//! workspace only ever sees well-formed domain types.
pub mod error;
pub mod feed;
pub mod geojson;
pub mod regions;

pub use error::*;
pub use feed::*;
pub use geojson::*;
pub use regions::*;

pub mod compose;
pub mod layer;
pub mod panel;
pub mod symbology;
pub mod tooltip;

pub use compose::*;
pub use layer::*;
pub use panel::*;
pub use tooltip::*;

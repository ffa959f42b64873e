pub mod anomaly;
pub mod camera;
pub mod reference;
pub mod region;
pub mod selection;

pub use anomaly::*;
pub use camera::*;
pub use reference::*;
pub use region::*;
pub use selection::*;

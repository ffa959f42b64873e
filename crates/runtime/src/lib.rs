pub mod animation;
pub mod clock;
pub mod frame;

pub use animation::*;
pub use clock::*;
pub use frame::*;

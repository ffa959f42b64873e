pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod loader;
pub mod session;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use session::MapSession;

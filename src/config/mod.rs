pub mod loader;
pub mod settings;

pub use settings::{LogFormat, LoggingConfig, ServiceConfig};

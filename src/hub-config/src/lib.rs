mod config;
mod error;
mod hub;
mod pod;

pub use config::*;
pub use error::ConfigError;
pub use hub::*;
pub use pod::*;

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::{AnalyticsConfig, ConfigManager, InviteConfig, LoggingConfig, Settings};
pub use error::*;
pub use types::*;
pub use validation::*;

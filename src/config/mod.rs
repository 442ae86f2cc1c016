use serde::{Deserialize, Serialize};

pub mod funding;
pub mod risk;
pub mod loader;

pub use funding::FundingConfig;
pub use risk::{DeleveragingConfig, RiskConfig};

/// Engine parameters fixed at construction time.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub risk: RiskConfig,
    pub deleveraging: DeleveragingConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

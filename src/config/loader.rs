use crate::config::{DeleveragingConfig, EngineConfig, FundingConfig, LoggingConfig, RiskConfig};
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub risk: RiskConfig,
    pub funding: FundingConfig,
    pub deleveraging: DeleveragingConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layer `config/default`, `config/{env}` and `PERPETUAL__*` variables.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PERPETUAL").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            risk: self.risk.clone(),
            deleveraging: self.deleveraging.clone(),
        }
    }
}

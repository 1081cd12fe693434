use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

use crate::error::AppError;

/// Settings shared with every service: bind port only.
#[derive(Debug, Deserialize, Clone)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// host:port of the signal-cli REST gateway, no scheme.
    pub host: String,
    /// Sender account registered with the gateway.
    pub phone_number: String,
    /// Opaque recipient group identifier.
    pub group_id: String,
}

#[derive(Debug, Clone)]
pub struct SnsConfig {
    /// The only topic this relay accepts notifications for.
    pub topic_arn: String,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: CommonConfig,
    pub signal: SignalConfig,
    pub sns: SnsConfig,
}

impl RelayConfig {
    /// Load configuration from the environment. All Signal/SNS settings are
    /// required; a missing or empty value is a startup error so the process
    /// never serves traffic half-configured.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let common = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(RelayConfig {
            common,
            signal: SignalConfig {
                host: require_env("SIGNAL_HOST")?,
                phone_number: require_env("SIGNAL_PHONE_NUMBER")?,
                group_id: require_env("SIGNAL_GROUP_ID")?,
            },
            sns: SnsConfig {
                topic_arn: require_env("SNS_TOPIC_ARN")?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(val),
        Ok(_) => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is set but empty",
            key
        ))),
        Err(_) => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            key
        ))),
    }
}

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::{error::BrokerResult, interest::ResolutionMode, logging::LoggingConfig};

/// Префикс переменных окружения по умолчанию.
pub const ENV_PREFIX: &str = "EVENTBROKER";

/// Настройки, которые реестр передаёт каждому своему брокеру.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    pub resolution: ResolutionMode,
}

impl BrokerSettings {
    pub fn lenient() -> Self {
        Self {
            resolution: ResolutionMode::Lenient,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Значения по умолчанию плюс переменные окружения
    /// `EVENTBROKER__<SECTION>__<KEY>`.
    ///
    /// Ошибки источников и десериализации возвращаются как
    /// [`BrokerError::Config`](crate::error::BrokerError::Config).
    pub fn load() -> BrokerResult<Self> {
        Self::load_with_prefix(ENV_PREFIX)
    }

    pub fn load_with_prefix(prefix: &str) -> BrokerResult<Self> {
        let cfg = Config::builder()
            // Adding default values
            .set_default("broker.resolution", "strict")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "compact")?
            .set_default("logging.with_target", true)?
            .set_default("logging.with_ansi", true)?
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

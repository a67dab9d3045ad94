use std::any::Any;

use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use eventbroker_error::{
    DispatchError, ErrorExt, InvalidEventError, LogLevel, ResolutionError, StatusCode,
};

pub type BrokerResult<T> = Result<T, BrokerError>;

/// Общая ошибка операций брокера и реестра.
#[derive(Debug, Error)]
pub enum BrokerError {
    // ==== Interest registration ====
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    // ==== Trigger ====
    #[error(transparent)]
    InvalidEvent(#[from] InvalidEventError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    // ==== Configuration ====
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl BrokerError {
    /// Пишет ошибку в лог на уровне, который рекомендует её статус-код.
    pub fn log(&self) {
        let code = self.status_code();
        let message = self.log_message();
        match code.log_level() {
            LogLevel::Debug => debug!(status = %code, "{message}"),
            LogLevel::Info => info!(status = %code, "{message}"),
            LogLevel::Warn => warn!(status = %code, "{message}"),
            LogLevel::Error => error!(status = %code, "{message}"),
        }
    }

    /// Логирует ошибку и возвращает её; удобно в `map_err`.
    pub(crate) fn logged(self) -> Self {
        self.log();
        self
    }
}

impl ErrorExt for BrokerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Resolution(e) => e.status_code(),
            Self::InvalidEvent(e) => e.status_code(),
            Self::Dispatch(e) => e.status_code(),
            Self::Config(_) => StatusCode::InvalidConfig,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn log_message(&self) -> String {
        match self {
            Self::Resolution(e) => e.log_message(),
            Self::InvalidEvent(e) => e.log_message(),
            Self::Dispatch(e) => e.log_message(),
            Self::Config(e) => format!("{e}"),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Resolution(e) => e.metrics_tags(),
            Self::InvalidEvent(e) => e.metrics_tags(),
            Self::Dispatch(e) => e.metrics_tags(),
            Self::Config(_) => vec![
                ("error_type", "config".to_string()),
                ("status_code", self.status_code().to_string()),
            ],
        }
    }
}

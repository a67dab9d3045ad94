use serde::{Deserialize, Serialize};

/// Формат вывода логов.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень или полная директива `EnvFilter` (`"info"`,
    /// `"eventbroker=debug,warn"`)
    pub level: String,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_target: true,
            with_ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Директива для `EnvFilter`.
    ///
    /// Голый уровень (`"debug"`) ограничивается этим крейтом, остальные
    /// цели получают `warn`. Директива с `=` или `,` используется как есть.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("warn,eventbroker={level}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, LogFormat::Compact);
        assert!(cfg.with_target);
    }

    #[test]
    fn test_filter_directive() {
        let mut cfg = LoggingConfig::default();
        assert_eq!(cfg.build_filter_directive(), "warn,eventbroker=info");

        cfg.level = "eventbroker=trace,warn".to_string();
        assert_eq!(cfg.build_filter_directive(), "eventbroker=trace,warn");
    }

    #[test]
    fn test_format_deserialize() {
        let cfg: LoggingConfig =
            serde_json::from_str(r#"{"format": "json", "with_ansi": false}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(!cfg.with_ansi);
        assert_eq!(cfg.level, "info");
    }
}

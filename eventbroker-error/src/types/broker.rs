use std::{any::Any, error::Error, sync::Arc};

use crate::{ErrorExt, StatusCode};

/// Ошибки разрешения карты интересов (event → имя метода) на контексте.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// У контекста нет члена с таким именем
    MethodNotFound { event: String, method: String },
    /// Член с таким именем есть, но это не метод
    NotCallable { event: String, method: String },
    /// Неявная форма вызова, но контекст не объявляет интересов
    MissingInterests { context: String },
    /// Карта интересов передана без контекста
    MissingContext,
}

/// Имя события отсутствует (аналог `null`/`undefined`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEventError {
    pub namespace: String,
}

/// Ошибки доставки события подписчикам.
#[derive(Debug, Clone)]
pub enum DispatchError {
    /// Обработчик вернул ошибку; доставка прервана
    HandlerFailed {
        event: String,
        source: Arc<dyn Error + Send + Sync>,
    },
}

impl ResolutionError {
    /// Событие, для которого не удалось разрешить метод.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::MethodNotFound { event, .. } | Self::NotCallable { event, .. } => Some(event),
            _ => None,
        }
    }

    /// Имя метода, который не удалось разрешить.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::MethodNotFound { method, .. } | Self::NotCallable { method, .. } => {
                Some(method)
            }
            _ => None,
        }
    }
}

impl DispatchError {
    pub fn event(&self) -> &str {
        match self {
            Self::HandlerFailed { event, .. } => event,
        }
    }
}

impl std::fmt::Display for ResolutionError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::MethodNotFound { event, method } => {
                write!(f, "method '{method}' not found for event '{event}'")
            }
            Self::NotCallable { event, method } => {
                write!(f, "member '{method}' mapped to event '{event}' is not callable")
            }
            Self::MissingInterests { context } => {
                write!(f, "context '{context}' does not declare interests")
            }
            Self::MissingContext => write!(f, "interests were given without a context"),
        }
    }
}

impl Error for ResolutionError {}

impl ErrorExt for ResolutionError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotFound { .. } => StatusCode::MethodNotFound,
            Self::NotCallable { .. } => StatusCode::NotCallable,
            Self::MissingInterests { .. } => StatusCode::MissingInterests,
            Self::MissingContext => StatusCode::MissingContext,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "interest_resolution".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        match self {
            Self::MethodNotFound { event, method } | Self::NotCallable { event, method } => {
                tags.push(("event", event.clone()));
                tags.push(("method", method.clone()));
            }
            Self::MissingInterests { context } => {
                tags.push(("context", context.clone()));
            }
            Self::MissingContext => {}
        }

        tags
    }
}

impl std::fmt::Display for InvalidEventError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "trigger invoked with null or undefined event")
        } else {
            write!(
                f,
                "trigger invoked with null or undefined event on broker '{}'",
                self.namespace
            )
        }
    }
}

impl Error for InvalidEventError {}

impl ErrorExt for InvalidEventError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidEvent
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::HandlerFailed { event, source } => {
                write!(f, "handler for event '{event}' failed: {source}")
            }
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HandlerFailed { source, .. } => {
                let err: &(dyn Error + 'static) = source.as_ref();
                Some(err)
            }
        }
    }
}

impl ErrorExt for DispatchError {
    fn status_code(&self) -> StatusCode {
        StatusCode::HandlerFailed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        format!("Handler for event '{}' failed", self.event())
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", "dispatch".to_string()),
            ("status_code", self.status_code().to_string()),
            ("event", self.event().to_string()),
        ]
    }
}

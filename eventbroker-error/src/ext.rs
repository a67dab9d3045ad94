use std::{any::Any, error::Error};

use crate::StatusCode;

/// Общий интерфейс ошибок брокера.
///
/// Трейт object-safe: ошибки разных слоёв (разрешение интересов, доставка,
/// конфигурация) можно хранить как `Box<dyn ErrorExt>` и всё равно получать
/// статус-код, безопасный текст и теги для логов.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки; без переопределения считается внутренней.
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Для downcast к конкретному типу ошибки.
    fn as_any(&self) -> &dyn Any;

    /// Текст для вызывающей стороны. Детали внутренних ошибок скрываются.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Полное описание для логов.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Пары ключ–значение для структурированных логов.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ]
    }

    /// Короткое имя типа, без пути модуля.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string()
    }
}

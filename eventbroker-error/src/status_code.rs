use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок брокера.
///
/// # Диапазоны:
/// - 1xxx: Внутренние ошибки
/// - 2xxx: Ошибки регистрации интересов (resolution)
/// - 3xxx: Ошибки событий и доставки
/// - 4xxx: Конфигурация
///
/// # Реализация:
/// - `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde_repr").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Внутренние ошибки ===
    Internal = 1000,

    // === 2xxx: Регистрация интересов ===
    MethodNotFound = 2000,
    NotCallable = 2001,
    MissingInterests = 2002,
    MissingContext = 2003,

    // === 3xxx: События и доставка ===
    InvalidEvent = 3000,
    HandlerFailed = 3001,

    // === 4xxx: Конфигурация ===
    InvalidConfig = 4000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    ///
    /// Возвращает `None`, если значение не соответствует ни одному варианту.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Ошибка вызывающей стороны: неверная карта интересов, контекст без
    /// нужного метода, пустое имя события.
    pub fn is_client_error(&self) -> bool {
        matches!(self.code(), 2000..=3000)
    }

    /// Внутренняя ошибка, сбой обработчика или неверная конфигурация.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::MissingInterests | Self::MissingContext => LogLevel::Debug,
            Self::InvalidEvent => LogLevel::Info,
            Self::MethodNotFound | Self::NotCallable | Self::InvalidConfig => LogLevel::Warn,
            Self::Internal | Self::HandlerFailed => LogLevel::Error,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        // Если включён feature "strum", используем human-readable имя (AsRefStr).
        // Иначе Debug-имя.
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

use std::{
    any::{Any, TypeId},
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

use super::Event;

/// Ошибка, которую может вернуть обработчик события.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
/// Результат обработчика события.
pub type HandlerResult = Result<(), HandlerError>;

type HandlerFn = dyn Fn(&Event) -> HandlerResult + Send + Sync;

static NEXT_CALLBACK_ID: AtomicU64 = AtomicU64::new(1);

/// Идентичность обработчика.
///
/// Анонимные обработчики сравниваются по выданному им id (клоны равны),
/// обработчики-методы по типу контекста и имени метода, так что повторное
/// разрешение одной и той же карты интересов даёт равные обработчики.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CallbackKey {
    Anonymous(u64),
    Method { owner: TypeId, name: Arc<str> },
}

/// Обработчик события.
#[derive(Clone)]
pub struct Callback {
    key: CallbackKey,
    func: Arc<HandlerFn>,
}

impl Callback {
    /// Оборачивает замыкание в обработчик с уникальной идентичностью.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            key: CallbackKey::Anonymous(NEXT_CALLBACK_ID.fetch_add(1, Ordering::Relaxed)),
            func: Arc::new(f),
        }
    }

    /// Обработчик-метод контекста типа `C`.
    pub(crate) fn method<C, F>(
        name: Arc<str>,
        f: F,
    ) -> Self
    where
        C: 'static,
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            key: CallbackKey::Method {
                owner: TypeId::of::<C>(),
                name,
            },
            func: Arc::new(f),
        }
    }

    /// Один и тот же обработчик (для `off`).
    pub fn same(
        &self,
        other: &Callback,
    ) -> bool {
        self.key == other.key
    }

    /// Имя метода, если обработчик получен из карты интересов.
    pub fn method_name(&self) -> Option<&str> {
        match &self.key {
            CallbackKey::Method { name, .. } => Some(name),
            CallbackKey::Anonymous(_) => None,
        }
    }

    pub fn call(
        &self,
        event: &Event,
    ) -> HandlerResult {
        (self.func)(event)
    }
}

impl fmt::Debug for Callback {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Callback").field("key", &self.key).finish()
    }
}

/// Ссылка на контекст подписки.
///
/// Хранит только слабую ссылку: подписка не продлевает жизнь контекста.
/// Сравнение идёт по адресу аллокации, который не переиспользуется, пока
/// жива хотя бы одна `Weak`.
#[derive(Clone)]
pub struct ContextRef {
    inner: Weak<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ContextRef {
    pub fn new<C: Any + Send + Sync>(context: &Arc<C>) -> Self {
        let erased: Arc<dyn Any + Send + Sync> = context.clone();
        Self {
            inner: Arc::downgrade(&erased),
            type_name: std::any::type_name::<C>(),
        }
    }

    /// Тот же самый контекст.
    pub fn same(
        &self,
        other: &ContextRef,
    ) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }

    /// Жив ли ещё контекст.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ContextRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ContextRef")
            .field("type", &self.type_name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

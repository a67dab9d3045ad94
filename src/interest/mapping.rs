use std::{borrow::Cow, fmt, sync::Arc};

/// Карта интересов: имя события → имя метода контекста.
///
/// Порядок вставки сохраняется. Повторная вставка того же события заменяет
/// метод, но оставляет событие на прежней позиции.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interests {
    entries: Vec<(Arc<str>, Arc<str>)>,
}

impl Interests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-вариант [`insert`](Self::insert).
    pub fn with(
        mut self,
        event: impl AsRef<str>,
        method: impl AsRef<str>,
    ) -> Self {
        self.insert(event, method);
        self
    }

    /// Добавляет или заменяет привязку; возвращает прежний метод.
    pub fn insert(
        &mut self,
        event: impl AsRef<str>,
        method: impl AsRef<str>,
    ) -> Option<Arc<str>> {
        let event = event.as_ref();
        let method: Arc<str> = Arc::from(method.as_ref());
        match self.entries.iter_mut().find(|(e, _)| &**e == event) {
            Some((_, existing)) => Some(std::mem::replace(existing, method)),
            None => {
                self.entries.push((Arc::from(event), method));
                None
            }
        }
    }

    pub fn get(
        &self,
        event: &str,
    ) -> Option<&str> {
        self.entries
            .iter()
            .find(|(e, _)| &**e == event)
            .map(|(_, m)| &**m)
    }

    /// Пары (событие, метод) в порядке вставки.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(e, m)| (&**e, &**m))
    }

    pub(crate) fn entries(&self) -> &[(Arc<str>, Arc<str>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E, M> FromIterator<(E, M)> for Interests
where
    E: AsRef<str>,
    M: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (E, M)>>(iter: I) -> Self {
        let mut interests = Interests::new();
        for (event, method) in iter {
            interests.insert(event, method);
        }
        interests
    }
}

impl<E, M, const N: usize> From<[(E, M); N]> for Interests
where
    E: AsRef<str>,
    M: AsRef<str>,
{
    fn from(pairs: [(E, M); N]) -> Self {
        pairs.into_iter().collect()
    }
}

type Producer = dyn Fn() -> Interests + Send + Sync;

/// Источник карты интересов: готовая карта либо функция без аргументов,
/// которая её строит. Функция вызывается один раз на каждый
/// `register`/`unregister`.
#[derive(Clone)]
pub enum InterestSource {
    Mapping(Interests),
    Deferred(Arc<Producer>),
}

impl InterestSource {
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn() -> Interests + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(f))
    }

    /// Вычисляет карту интересов.
    pub fn evaluate(&self) -> Cow<'_, Interests> {
        match self {
            Self::Mapping(interests) => Cow::Borrowed(interests),
            Self::Deferred(producer) => Cow::Owned(producer()),
        }
    }
}

impl fmt::Debug for InterestSource {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Mapping(interests) => f.debug_tuple("Mapping").field(interests).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Interests> for InterestSource {
    fn from(interests: Interests) -> Self {
        Self::Mapping(interests)
    }
}

impl From<&Interests> for InterestSource {
    fn from(interests: &Interests) -> Self {
        Self::Mapping(interests.clone())
    }
}

impl<E, M, const N: usize> From<[(E, M); N]> for InterestSource
where
    E: AsRef<str>,
    M: AsRef<str>,
{
    fn from(pairs: [(E, M); N]) -> Self {
        Self::Mapping(pairs.into())
    }
}

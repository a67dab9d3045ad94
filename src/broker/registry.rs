use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use super::Broker;
use crate::{
    config::{BrokerSettings, Settings},
    error::ErrorExt,
};

/// Реестр брокеров по пространствам имён.
///
/// - `get` создаёт брокер при первом обращении и дальше возвращает тот же
///   `Arc`, пока пространство имён не уничтожено;
/// - брокер по умолчанию живёт вне карты пространств имён: он доступен
///   через [`default_broker`](Self::default_broker), а `""` считается
///   обычным именем;
/// - все брокеры наследуют настройки реестра.
pub struct Registry {
    /// Пространство имён → брокер
    brokers: DashMap<Arc<str>, Arc<Broker>>,
    default: Arc<Broker>,
    settings: BrokerSettings,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_settings(BrokerSettings::default())
    }

    pub fn with_settings(settings: BrokerSettings) -> Self {
        Self {
            brokers: DashMap::new(),
            default: Arc::new(Broker::with_settings("", settings)),
            settings,
        }
    }

    /// Брокер для пространства имён; создаётся при первом обращении.
    pub fn get(
        &self,
        namespace: &str,
    ) -> Arc<Broker> {
        if let Some(broker) = self.brokers.get(namespace) {
            return broker.clone();
        }

        // entry() гарантирует один брокер на имя при гонке потоков
        self.brokers
            .entry(Arc::from(namespace))
            .or_insert_with(|| {
                debug!(namespace, "broker created");
                Arc::new(Broker::with_settings(namespace, self.settings))
            })
            .clone()
    }

    /// Есть ли в реестре брокер для пространства имён.
    pub fn has(
        &self,
        namespace: &str,
    ) -> bool {
        self.brokers.contains_key(namespace)
    }

    /// Уничтожает брокер: снимает все его подписки и убирает из реестра.
    ///
    /// Отсутствующее имя игнорируется.
    pub fn destroy(
        &self,
        namespace: &str,
    ) -> &Self {
        if let Some((_, broker)) = self.brokers.remove(namespace) {
            let removed = broker.off_all();
            debug!(namespace, removed, "broker destroyed");
        }
        self
    }

    /// Уничтожает каждое из перечисленных пространств имён.
    pub fn destroy_many<I, S>(
        &self,
        namespaces: I,
    ) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for namespace in namespaces {
            self.destroy(namespace.as_ref());
        }
        self
    }

    /// Уничтожает все брокеры с именами. Брокер по умолчанию не трогается.
    pub fn destroy_all(&self) -> &Self {
        // Ключи собираются заранее: destroy() удаляет из той же карты
        for namespace in self.namespaces() {
            self.destroy(&namespace);
        }
        self
    }

    /// `destroy_all` плюс очистка брокера по умолчанию.
    pub fn reset(&self) -> &Self {
        self.destroy_all();
        let removed = self.default.off_all();
        debug!(removed, "default broker cleared");
        self
    }

    pub fn default_broker(&self) -> &Arc<Broker> {
        &self.default
    }

    /// Имена брокеров в реестре, в произвольном порядке.
    pub fn namespaces(&self) -> Vec<Arc<str>> {
        self.brokers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Количество брокеров с именами.
    pub fn len(&self) -> usize {
        self.brokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brokers.is_empty()
    }

    pub fn settings(&self) -> BrokerSettings {
        self.settings
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("namespaces", &self.namespaces())
            .field("settings", &self.settings)
            .finish()
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(|| {
    let settings = match Settings::load() {
        Ok(settings) => settings.broker,
        Err(e) => {
            warn!(
                status = %e.status_code(),
                error = %e,
                "failed to load broker settings, using defaults"
            );
            BrokerSettings::default()
        }
    };
    Registry::with_settings(settings)
});

/// Общий реестр процесса.
///
/// Настройки читаются из окружения один раз, при первом обращении.
pub fn global() -> &'static Registry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dispatch::Callback, interest::ResolutionMode};

    fn noop() -> Callback {
        Callback::new(|_| Ok(()))
    }

    #[test]
    fn test_get_is_memoized() {
        let registry = Registry::new();
        let a = registry.get("users");
        let b = registry.get("users");
        let c = registry.get("orders");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.namespace(), "users");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_has_and_destroy() {
        let registry = Registry::new();
        assert!(!registry.has("users"));

        let first = registry.get("users");
        first.on("x", noop());
        assert!(registry.has("users"));

        registry.destroy("users");
        assert!(!registry.has("users"));
        assert!(!first.has_listeners());

        let second = registry.get("users");
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!second.has_listeners());
    }

    #[test]
    fn test_destroy_missing_is_noop() {
        let registry = Registry::new();
        registry.destroy("ghost").destroy("ghost");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_destroy_many() {
        let registry = Registry::new();
        for ns in ["a", "b", "c"] {
            registry.get(ns);
        }

        registry.destroy_many(["a", "b"]);
        assert_eq!(registry.namespaces(), vec![Arc::<str>::from("c")]);

        registry.destroy_many(vec![String::from("c")]);
        assert!(registry.is_empty());
    }

    /// Проверяет, что брокер по умолчанию переживает `destroy_all`, но
    /// очищается `reset`.
    #[test]
    fn test_destroy_all_keeps_default() {
        let registry = Registry::new();
        registry.get("a").on("x", noop());
        registry.get("b");
        registry.default_broker().on("x", noop());

        registry.destroy_all();
        assert!(registry.is_empty());
        assert!(!registry.has(""));
        assert_eq!(registry.default_broker().listener_count("x"), 1);

        registry.reset();
        assert!(!registry.default_broker().has_listeners());
    }

    /// Проверяет, что `""` ведёт себя как обычное пространство имён и не
    /// затрагивает брокер по умолчанию.
    #[test]
    fn test_empty_namespace_is_a_regular_key() {
        let registry = Registry::new();
        assert!(!registry.has(""));
        assert!(registry.is_empty());

        let empty = registry.get("");
        assert!(registry.has(""));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&empty, &registry.get("")));
        assert!(!Arc::ptr_eq(&empty, registry.default_broker()));

        empty.on("x", noop());
        registry.default_broker().on("x", noop());
        registry.destroy("");
        assert!(!registry.has(""));
        assert!(!empty.has_listeners());
        assert_eq!(registry.default_broker().listener_count("x"), 1);
    }

    #[test]
    fn test_settings_are_inherited() {
        let registry = Registry::with_settings(BrokerSettings::lenient());
        assert_eq!(registry.get("x").resolution_mode(), ResolutionMode::Lenient);
        assert_eq!(
            registry.default_broker().resolution_mode(),
            ResolutionMode::Lenient
        );
        assert_eq!(registry.settings(), BrokerSettings::lenient());
    }

    /// Проверяет, что потоки, одновременно запросившие одно имя, получают
    /// один и тот же брокер.
    #[test]
    fn test_concurrent_get_creates_one_broker() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get("shared"))
            })
            .collect();

        let brokers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for broker in &brokers[1..] {
            assert!(Arc::ptr_eq(&brokers[0], broker));
        }
        assert_eq!(registry.len(), 1);
    }
}

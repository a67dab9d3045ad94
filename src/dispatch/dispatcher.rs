use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use super::{split_event_names, Callback, ContextRef, Event};
use crate::error::DispatchError;

/// Итог одной доставки.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Сколько обработчиков было вызвано
    pub delivered: usize,
}

/// Снимок счётчиков диспетчера.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub triggered: usize,
    pub delivered: usize,
    pub failed: usize,
}

struct Listener {
    callback: Callback,
    context: Option<ContextRef>,
    once: bool,
    /// Сбрасывается при `off`, чтобы идущая доставка не вызвала обработчик
    active: AtomicBool,
}

impl Listener {
    fn matches(
        &self,
        callback: Option<&Callback>,
        context: Option<&ContextRef>,
    ) -> bool {
        callback.map_or(true, |cb| self.callback.same(cb))
            && context.map_or(true, |ctx| {
                self.context
                    .as_ref()
                    .is_some_and(|own| own.same(ctx))
            })
    }
}

/// Синхронный внутрипроцессный диспетчер событий.
///
/// Гарантии:
/// - обработчики вызываются в порядке подписки;
/// - обработчик, отписанный во время доставки, уже не вызывается;
/// - обработчик, подписанный во время доставки, начнёт получать события со
///   следующей доставки;
/// - пользовательский код никогда не выполняется под блокировкой таблицы,
///   поэтому обработчики могут повторно входить в `on`/`off`/`trigger`.
#[derive(Default)]
pub struct Dispatcher {
    /// Имя события → подписчики в порядке подписки
    listeners: RwLock<HashMap<Arc<str>, Vec<Arc<Listener>>>>,
    /// Общее количество вызовов `trigger`
    triggered: AtomicUsize,
    /// Количество вызванных обработчиков
    delivered: AtomicUsize,
    /// Количество обработчиков, вернувших ошибку
    failed: AtomicUsize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Подписка на одно или несколько событий (через пробел).
    pub fn on(
        &self,
        events: &str,
        callback: Callback,
        context: Option<ContextRef>,
    ) {
        self.add(events, callback, context, false);
    }

    /// Одноразовая подписка: обработчик снимается перед первым вызовом.
    pub fn once(
        &self,
        events: &str,
        callback: Callback,
        context: Option<ContextRef>,
    ) {
        self.add(events, callback, context, true);
    }

    fn add(
        &self,
        events: &str,
        callback: Callback,
        context: Option<ContextRef>,
        once: bool,
    ) {
        let mut table = self.listeners.write();
        for name in split_event_names(events) {
            // Ключ таблицы переиспользуется, новые имена выделяются только здесь
            let key = table
                .get_key_value(name)
                .map_or_else(|| Arc::from(name), |(key, _)| key.clone());
            table
                .entry(key)
                .or_default()
                .push(Arc::new(Listener {
                    callback: callback.clone(),
                    context: context.clone(),
                    once,
                    active: AtomicBool::new(true),
                }));
        }
    }

    /// Снимает все подписки, подходящие под все заданные фильтры.
    ///
    /// `off(None, None, None)` очищает таблицу целиком. Возвращает количество
    /// снятых подписок.
    pub fn off(
        &self,
        events: Option<&str>,
        callback: Option<&Callback>,
        context: Option<&ContextRef>,
    ) -> usize {
        let mut table = self.listeners.write();
        let names: Vec<Arc<str>> = match events {
            Some(events) => split_event_names(events)
                .into_iter()
                .filter_map(|name| table.get_key_value(name).map(|(key, _)| key.clone()))
                .collect(),
            None => table.keys().cloned().collect(),
        };

        let mut removed = 0;
        for name in names {
            let Some(list) = table.get_mut(&name) else {
                continue;
            };
            list.retain(|listener| {
                if listener.matches(callback, context) {
                    listener.active.store(false, Ordering::Release);
                    removed += 1;
                    false
                } else {
                    true
                }
            });
            if list.is_empty() {
                table.remove(&name);
            }
        }
        removed
    }

    /// Снимает все подписки.
    pub fn clear(&self) -> usize {
        self.off(None, None, None)
    }

    /// Доставляет событие всем текущим подписчикам.
    ///
    /// Первая ошибка обработчика прерывает доставку и возвращается как есть
    /// внутри [`DispatchError::HandlerFailed`].
    pub fn trigger(
        &self,
        events: &str,
        args: Vec<Value>,
    ) -> Result<Delivery, DispatchError> {
        self.triggered.fetch_add(1, Ordering::Relaxed);
        let args: Arc<[Value]> = args.into();
        let mut delivery = Delivery::default();

        for name in split_event_names(events) {
            let (name, snapshot) = match self.listeners.read().get_key_value(name) {
                Some((key, list)) => (key.clone(), list.clone()),
                None => continue,
            };
            trace!(event = %name, listeners = snapshot.len(), "dispatching event");

            let event = Event {
                name: name.clone(),
                args: args.clone(),
            };
            for listener in snapshot {
                if !listener.active.load(Ordering::Acquire) {
                    continue;
                }
                if listener
                    .context
                    .as_ref()
                    .is_some_and(|ctx| !ctx.is_alive())
                {
                    self.retire(&name, &listener);
                    continue;
                }
                if listener.once {
                    // Только одна доставка выигрывает право вызвать once-обработчик
                    if !listener.active.swap(false, Ordering::AcqRel) {
                        continue;
                    }
                    self.retire(&name, &listener);
                }

                delivery.delivered += 1;
                self.delivered.fetch_add(1, Ordering::Relaxed);
                if let Err(source) = listener.callback.call(&event) {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    return Err(DispatchError::HandlerFailed {
                        event: name.to_string(),
                        source: Arc::from(source),
                    });
                }
            }
        }
        Ok(delivery)
    }

    /// Удаляет конкретного подписчика из таблицы.
    fn retire(
        &self,
        name: &Arc<str>,
        listener: &Arc<Listener>,
    ) {
        listener.active.store(false, Ordering::Release);
        let mut table = self.listeners.write();
        if let Some(list) = table.get_mut(name) {
            list.retain(|other| !Arc::ptr_eq(other, listener));
            if list.is_empty() {
                table.remove(name);
            }
        }
    }

    /// Количество подписчиков события.
    pub fn listener_count(
        &self,
        event: &str,
    ) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.read().is_empty()
    }

    /// Имена событий, на которые есть хотя бы одна подписка.
    pub fn event_names(&self) -> Vec<Arc<str>> {
        self.listeners.read().keys().cloned().collect()
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            triggered: self.triggered.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

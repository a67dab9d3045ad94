use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::{debug_span, trace};

use crate::{
    config::BrokerSettings,
    dispatch::{Callback, ContextRef, Delivery, DispatchStats, Dispatcher, IntoEventName},
    error::{BrokerError, BrokerResult, InvalidEventError, ResolutionError},
    interest::{
        registrar::{apply_interests, Action, Shape},
        Context, InterestSource, ResolutionMode,
    },
};

/// Брокер событий, привязанный к пространству имён.
///
/// Объединяет диспетчер (publish/subscribe) и массовую регистрацию
/// интересов.
pub struct Broker {
    namespace: Arc<str>,
    dispatcher: Dispatcher,
    settings: BrokerSettings,
}

impl Broker {
    /// Отдельный брокер вне реестра, с настройками по умолчанию.
    pub fn new(namespace: &str) -> Self {
        Self::with_settings(namespace, BrokerSettings::default())
    }

    pub fn with_settings(
        namespace: &str,
        settings: BrokerSettings,
    ) -> Self {
        Self {
            namespace: Arc::from(namespace),
            dispatcher: Dispatcher::new(),
            settings,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn settings(&self) -> BrokerSettings {
        self.settings
    }

    pub fn resolution_mode(&self) -> ResolutionMode {
        self.settings.resolution
    }

    ////////////////////////////////////////////////////////////////////////////
    // Регистрация интересов
    ////////////////////////////////////////////////////////////////////////////

    /// Подписывает методы контекста на события по карте интересов.
    ///
    /// Вся карта разрешается до первой подписки: при ошибке (в строгом
    /// режиме) брокер остаётся без изменений.
    pub fn register<C: Context>(
        &self,
        interests: impl Into<InterestSource>,
        context: &Arc<C>,
    ) -> BrokerResult<&Self> {
        self.apply(Shape::Explicit(interests.into(), context), Action::Subscribe)
    }

    /// Снимает подписки, созданные `register` с той же картой и контекстом.
    pub fn unregister<C: Context>(
        &self,
        interests: impl Into<InterestSource>,
        context: &Arc<C>,
    ) -> BrokerResult<&Self> {
        self.apply(Shape::Explicit(interests.into(), context), Action::Unsubscribe)
    }

    /// Регистрация по собственной карте интересов контекста.
    pub fn register_implied<C: Context>(
        &self,
        context: &Arc<C>,
    ) -> BrokerResult<&Self> {
        self.apply(Shape::Implied(context), Action::Subscribe)
    }

    pub fn unregister_implied<C: Context>(
        &self,
        context: &Arc<C>,
    ) -> BrokerResult<&Self> {
        self.apply(Shape::Implied(context), Action::Unsubscribe)
    }

    /// Форма с необязательными аргументами.
    ///
    /// | interests | context | поведение |
    /// |---|---|---|
    /// | `None` | `None` | ничего не делает |
    /// | `None` | `Some` | как [`register_implied`](Self::register_implied) |
    /// | `Some` | `Some` | как [`register`](Self::register) |
    /// | `Some` | `None` | [`ResolutionError::MissingContext`] |
    pub fn register_optional<C: Context>(
        &self,
        interests: Option<InterestSource>,
        context: Option<&Arc<C>>,
    ) -> BrokerResult<&Self> {
        self.apply_optional(interests, context, Action::Subscribe)
    }

    pub fn unregister_optional<C: Context>(
        &self,
        interests: Option<InterestSource>,
        context: Option<&Arc<C>>,
    ) -> BrokerResult<&Self> {
        self.apply_optional(interests, context, Action::Unsubscribe)
    }

    fn apply_optional<C: Context>(
        &self,
        interests: Option<InterestSource>,
        context: Option<&Arc<C>>,
        action: Action,
    ) -> BrokerResult<&Self> {
        match (interests, context) {
            (None, None) => Ok(self),
            (None, Some(context)) => self.apply(Shape::Implied(context), action),
            (Some(source), Some(context)) => self.apply(Shape::Explicit(source, context), action),
            (Some(_), None) => Err(BrokerError::from(ResolutionError::MissingContext).logged()),
        }
    }

    fn apply<C: Context>(
        &self,
        shape: Shape<'_, C>,
        action: Action,
    ) -> BrokerResult<&Self> {
        let _span = debug_span!("broker", namespace = %self.namespace).entered();
        apply_interests(&self.dispatcher, shape, self.settings.resolution, action)
            .map_err(|e| BrokerError::from(e).logged())?;
        Ok(self)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Publish / subscribe
    ////////////////////////////////////////////////////////////////////////////

    /// Публикует событие.
    ///
    /// `None` вместо имени события отвергается до доставки. Любое другое
    /// имя, в том числе пустое, передаётся диспетчеру вместе с аргументами.
    pub fn trigger(
        &self,
        event: impl IntoEventName,
        args: impl IntoIterator<Item = Value>,
    ) -> BrokerResult<Delivery> {
        let Some(name) = event.into_event_name() else {
            return Err(BrokerError::from(InvalidEventError {
                namespace: self.namespace.to_string(),
            })
            .logged());
        };

        trace!(namespace = %self.namespace, event = %name, "trigger");
        self.dispatcher
            .trigger(&name, args.into_iter().collect())
            .map_err(|e| BrokerError::from(e).logged())
    }

    /// Подписывает обработчик на одно или несколько событий (через пробел).
    pub fn on(
        &self,
        events: &str,
        callback: Callback,
    ) -> &Self {
        self.dispatcher.on(events, callback, None);
        self
    }

    /// Подписка, привязанная к контексту: снимается через
    /// [`off_context`](Self::off_context) и пропадает вместе с контекстом.
    pub fn on_with_context<C: Send + Sync + 'static>(
        &self,
        events: &str,
        callback: Callback,
        context: &Arc<C>,
    ) -> &Self {
        self.dispatcher
            .on(events, callback, Some(ContextRef::new(context)));
        self
    }

    /// Одноразовая подписка.
    pub fn once(
        &self,
        events: &str,
        callback: Callback,
    ) -> &Self {
        self.dispatcher.once(events, callback, None);
        self
    }

    /// Снимает подписки по событию и/или обработчику; `None` означает любой.
    pub fn off(
        &self,
        events: Option<&str>,
        callback: Option<&Callback>,
    ) -> usize {
        self.dispatcher.off(events, callback, None)
    }

    /// Снимает все подписки контекста.
    pub fn off_context<C: Send + Sync + 'static>(
        &self,
        context: &Arc<C>,
    ) -> usize {
        self.dispatcher
            .off(None, None, Some(&ContextRef::new(context)))
    }

    /// Снимает все подписки брокера.
    pub fn off_all(&self) -> usize {
        self.dispatcher.clear()
    }

    pub fn listener_count(
        &self,
        event: &str,
    ) -> usize {
        self.dispatcher.listener_count(event)
    }

    pub fn has_listeners(&self) -> bool {
        self.dispatcher.has_listeners()
    }

    pub fn event_names(&self) -> Vec<Arc<str>> {
        self.dispatcher.event_names()
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }
}

impl Default for Broker {
    /// Брокер с пустым пространством имён.
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for Broker {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Broker")
            .field("namespace", &self.namespace)
            .field("resolution", &self.settings.resolution)
            .field("events", &self.dispatcher.event_names().len())
            .finish()
    }
}

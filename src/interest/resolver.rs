use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{InterestSource, Interests};
use crate::{
    dispatch::{Callback, ContextRef, Event, HandlerResult},
    error::ResolutionError,
};

/// Сигнатура метода контекста, пригодного в качестве обработчика.
pub type MethodFn<C> = fn(&C, &Event) -> HandlerResult;

/// Результат поиска члена контекста по имени.
pub enum Member<C> {
    /// Вызываемый метод.
    Method(MethodFn<C>),
    /// Имя существует, но это не метод.
    Field,
    /// Имени нет.
    Absent,
}

/// Контекст, против которого разрешаются имена методов из карты интересов.
///
/// ```
/// use eventbroker::{Context, Event, HandlerResult, Member};
///
/// struct Counter;
///
/// impl Counter {
///     fn bump(&self, _event: &Event) -> HandlerResult {
///         Ok(())
///     }
/// }
///
/// impl Context for Counter {
///     fn member(&self, name: &str) -> Member<Self> {
///         match name {
///             "bump" => Member::Method(Counter::bump),
///             _ => Member::Absent,
///         }
///     }
/// }
/// ```
pub trait Context: Send + Sync + Sized + 'static {
    fn member(
        &self,
        name: &str,
    ) -> Member<Self>;

    /// Собственная карта интересов контекста (форма вызова с одним
    /// аргументом). По умолчанию отсутствует.
    fn interests(&self) -> Option<InterestSource> {
        None
    }
}

/// Как поступать с парами, которые не удалось разрешить.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Первая ошибка прерывает весь вызов.
    #[default]
    Strict,
    /// Ошибки собираются и логируются, остальные пары применяются.
    Lenient,
}

/// Разрешённая тройка (событие, обработчик, контекст).
#[derive(Debug, Clone)]
pub struct Registration {
    pub event: Arc<str>,
    pub callback: Callback,
    pub context: ContextRef,
}

/// Итог разрешения карты интересов.
#[derive(Debug, Default)]
pub struct Resolution {
    pub registrations: Vec<Registration>,
    /// Пропущенные пары (только в [`ResolutionMode::Lenient`]).
    pub skipped: Vec<ResolutionError>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Разрешает карту интересов против контекста.
///
/// Ничего не подписывает: результат применяется отдельно, поэтому ошибка в
/// строгом режиме не оставляет частичных подписок.
pub fn resolve<C: Context>(
    source: &InterestSource,
    context: &Arc<C>,
    mode: ResolutionMode,
) -> Result<Resolution, ResolutionError> {
    let interests = source.evaluate();
    resolve_mapping(&interests, context, mode)
}

/// Разрешает собственную карту интересов контекста.
pub fn resolve_implied<C: Context>(
    context: &Arc<C>,
    mode: ResolutionMode,
) -> Result<Resolution, ResolutionError> {
    let source = context
        .interests()
        .ok_or_else(|| ResolutionError::MissingInterests {
            context: std::any::type_name::<C>().to_string(),
        })?;
    resolve(&source, context, mode)
}

fn resolve_mapping<C: Context>(
    interests: &Interests,
    context: &Arc<C>,
    mode: ResolutionMode,
) -> Result<Resolution, ResolutionError> {
    let context_ref = ContextRef::new(context);
    let mut resolution = Resolution::default();

    for (event, method) in interests.entries() {
        let failure = match context.member(method) {
            Member::Method(f) => {
                resolution.registrations.push(Registration {
                    event: event.clone(),
                    callback: bind(context, method, f),
                    context: context_ref.clone(),
                });
                continue;
            }
            Member::Field => ResolutionError::NotCallable {
                event: event.to_string(),
                method: method.to_string(),
            },
            Member::Absent => ResolutionError::MethodNotFound {
                event: event.to_string(),
                method: method.to_string(),
            },
        };

        match mode {
            ResolutionMode::Strict => return Err(failure),
            ResolutionMode::Lenient => {
                warn!(
                    event = %event,
                    method = %method,
                    context = std::any::type_name::<C>(),
                    "skipping unresolvable interest: {failure}"
                );
                resolution.skipped.push(failure);
            }
        }
    }

    Ok(resolution)
}

/// Привязывает метод к контексту через слабую ссылку.
fn bind<C: Context>(
    context: &Arc<C>,
    method: &Arc<str>,
    f: MethodFn<C>,
) -> Callback {
    let weak = Arc::downgrade(context);
    Callback::method::<C, _>(method.clone(), move |event| match weak.upgrade() {
        Some(ctx) => f(&ctx, event),
        None => Ok(()),
    })
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(
            &self,
            event: &Event,
        ) -> HandlerResult {
            self.seen.lock().push(event.name.to_string());
            Ok(())
        }
    }

    impl Context for Recorder {
        fn member(
            &self,
            name: &str,
        ) -> Member<Self> {
            match name {
                "record" => Member::Method(Recorder::record),
                "label" => Member::Field,
                _ => Member::Absent,
            }
        }
    }

    #[test]
    fn test_resolve_produces_triples_in_order() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([("b", "record"), ("a", "record")]);

        let resolution = resolve(&source, &ctx, ResolutionMode::Strict).unwrap();

        let events: Vec<_> = resolution
            .registrations
            .iter()
            .map(|r| r.event.to_string())
            .collect();
        assert_eq!(events, vec!["b", "a"]);
        assert!(resolution.is_complete());
        assert!(resolution.registrations[0]
            .context
            .same(&ContextRef::new(&ctx)));
    }

    /// Проверяет, что повторное разрешение даёт равные обработчики.
    #[test]
    fn test_resolved_callbacks_are_stable() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([("a", "record")]);

        let first = resolve(&source, &ctx, ResolutionMode::Strict).unwrap();
        let second = resolve(&source, &ctx, ResolutionMode::Strict).unwrap();

        assert!(first.registrations[0]
            .callback
            .same(&second.registrations[0].callback));
        assert_eq!(first.registrations[0].callback.method_name(), Some("record"));
    }

    #[test]
    fn test_bound_callback_calls_method() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([("ping", "record")]);
        let resolution = resolve(&source, &ctx, ResolutionMode::Strict).unwrap();

        resolution.registrations[0]
            .callback
            .call(&Event::new("ping", [json!(1)]))
            .unwrap();

        assert_eq!(*ctx.seen.lock(), vec!["ping".to_string()]);
    }

    #[test]
    fn test_strict_missing_method() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([("ok", "record"), ("users:update", "update")]);

        let err = resolve(&source, &ctx, ResolutionMode::Strict).unwrap_err();

        assert_eq!(err, ResolutionError::MethodNotFound {
            event: "users:update".into(),
            method: "update".into(),
        });
    }

    #[test]
    fn test_strict_field_is_not_callable() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([("users:update", "label")]);

        let err = resolve(&source, &ctx, ResolutionMode::Strict).unwrap_err();

        assert!(matches!(err, ResolutionError::NotCallable { .. }));
        assert_eq!(err.method(), Some("label"));
        assert_eq!(err.event(), Some("users:update"));
    }

    /// Проверяет, что в мягком режиме ошибки собираются, а остальное
    /// разрешается.
    #[test]
    fn test_lenient_collects_failures() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([
            ("a", "missing"),
            ("b", "record"),
            ("c", "label"),
        ]);

        let resolution = resolve(&source, &ctx, ResolutionMode::Lenient).unwrap();

        assert_eq!(resolution.registrations.len(), 1);
        assert_eq!(&*resolution.registrations[0].event, "b");
        assert_eq!(resolution.skipped.len(), 2);
        assert!(!resolution.is_complete());
    }

    #[test]
    fn test_implied_without_interests() {
        let ctx = Arc::new(Recorder::default());
        let err = resolve_implied(&ctx, ResolutionMode::Strict).unwrap_err();
        assert!(matches!(err, ResolutionError::MissingInterests { .. }));
    }

    #[test]
    fn test_callback_after_context_dropped_is_noop() {
        let ctx = Arc::new(Recorder::default());
        let source = InterestSource::from([("a", "record")]);
        let resolution = resolve(&source, &ctx, ResolutionMode::Strict).unwrap();
        drop(ctx);

        let registration = &resolution.registrations[0];
        assert!(!registration.context.is_alive());
        assert!(registration.callback.call(&Event::new("a", [])).is_ok());
    }

    #[test]
    fn test_resolution_mode_serde() {
        let mode: ResolutionMode = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(mode, ResolutionMode::Lenient);
        assert_eq!(serde_json::to_string(&ResolutionMode::Strict).unwrap(), "\"strict\"");
        assert_eq!(ResolutionMode::default(), ResolutionMode::Strict);
    }
}

use std::sync::Arc;

use tracing::debug;

use super::{resolve, resolve_implied, Context, InterestSource, Registration, ResolutionMode};
use crate::{dispatch::Dispatcher, error::ResolutionError};

/// Что делать с разрешёнными тройками.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Subscribe,
    Unsubscribe,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Self::Subscribe => "register",
            Self::Unsubscribe => "unregister",
        }
    }
}

/// Форма вызова `register`/`unregister`.
pub(crate) enum Shape<'a, C> {
    /// Карта интересов передана явно.
    Explicit(InterestSource, &'a Arc<C>),
    /// Карта берётся из самого контекста.
    Implied(&'a Arc<C>),
}

/// Разрешает карту интересов и применяет её к диспетчеру.
///
/// Возвращает количество затронутых подписок.
pub(crate) fn apply_interests<C: Context>(
    dispatcher: &Dispatcher,
    shape: Shape<'_, C>,
    mode: ResolutionMode,
    action: Action,
) -> Result<usize, ResolutionError> {
    let resolution = match shape {
        Shape::Explicit(source, context) => resolve(&source, context, mode)?,
        Shape::Implied(context) => resolve_implied(context, mode)?,
    };

    let affected = apply(dispatcher, &resolution.registrations, action);
    debug!(
        action = action.as_str(),
        context = std::any::type_name::<C>(),
        resolved = resolution.registrations.len(),
        skipped = resolution.skipped.len(),
        affected,
        "interests applied"
    );
    Ok(affected)
}

/// Применяет тройки к диспетчеру: `on` для подписки, `off` с полным набором
/// фильтров для отписки.
pub(crate) fn apply(
    dispatcher: &Dispatcher,
    registrations: &[Registration],
    action: Action,
) -> usize {
    registrations
        .iter()
        .map(|r| match action {
            Action::Subscribe => {
                dispatcher.on(&r.event, r.callback.clone(), Some(r.context.clone()));
                1
            }
            Action::Unsubscribe => {
                dispatcher.off(Some(&r.event), Some(&r.callback), Some(&r.context))
            }
        })
        .sum()
}

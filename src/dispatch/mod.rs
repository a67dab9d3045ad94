//! Синхронный диспетчер событий (publish/subscribe примитив).
//!
//! - `callback`: обработчики событий и ссылки на контексты подписок.
//! - `dispatcher`: таблица подписок, доставка, статистика.
//! - `event`: событие, передаваемое обработчикам, и имена событий.

pub mod callback;
pub mod dispatcher;
pub mod event;

pub use callback::{Callback, ContextRef, HandlerError, HandlerResult};
pub use dispatcher::{Delivery, DispatchStats, Dispatcher};
pub use event::{Event, IntoEventName};
pub(crate) use event::split_event_names;

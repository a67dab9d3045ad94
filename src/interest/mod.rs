//! Декларативная регистрация интересов.
//!
//! Карта `событие → имя метода` ([`Interests`]) разрешается против контекста
//! ([`Context`]) в набор троек ([`Registration`]), которые затем
//! подписываются или отписываются в диспетчере брокера.

pub mod mapping;
pub(crate) mod registrar;
pub mod resolver;

pub use mapping::{InterestSource, Interests};
pub use resolver::{
    resolve, resolve_implied, Context, Member, MethodFn, Registration, Resolution, ResolutionMode,
};

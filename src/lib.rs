/// Namespaced brokers and the broker registry.
pub mod broker;
/// Settings loading (defaults + `EVENTBROKER__*` environment).
pub mod config;
/// Synchronous in-process dispatch: listeners, callbacks, events.
pub mod dispatch;
/// Error types and result aliases.
pub mod error;
/// Declarative interest mappings and their resolution against a context.
pub mod interest;
/// Logging setup (formatting, filters).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Brokers, the registry and the process-wide registry.
pub use broker::{global, Broker, Registry};
/// config
pub use config::{BrokerSettings, Settings};
/// Dispatch API.
pub use dispatch::{
    Callback, ContextRef, Delivery, DispatchStats, Dispatcher, Event, HandlerError, HandlerResult,
    IntoEventName,
};
/// Operation errors and result types.
pub use error::{
    BrokerError, BrokerResult, DispatchError, ErrorExt, InvalidEventError, ResolutionError,
    StatusCode,
};
/// Interest registration.
pub use interest::{
    Context, InterestSource, Interests, Member, MethodFn, Registration, Resolution,
    ResolutionMode,
};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig};

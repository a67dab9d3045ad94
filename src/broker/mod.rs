#[allow(clippy::module_inception)]
pub mod broker;
pub mod registry;

pub use broker::Broker;
pub use registry::{global, Registry};

//! Capability-scoped OAuth 2.0 access for the conferencing provider.

mod broker;
mod capability;

pub mod providers;
pub mod token;

pub use broker::Broker;
#[cfg(feature = "mock")]
pub use broker::MockBroker;
pub use capability::{Capability, CapabilitySet};

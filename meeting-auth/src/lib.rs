//! # meeting-auth
//!
//! Authentication for talking to the conferencing provider on behalf of a party organizer:
//! - Capabilities: the fixed set of provider permission scopes a session episode can need
//! - Tokens: capability-scoped bearer credentials with expiry
//! - The `Broker` trait (scope token broker) and its Google OAuth implementation
//! - HTTP client building with retry middleware, shared with the provider and backend gateways
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_auth::{
//!     oauth::{Broker, Capability, CapabilitySet},
//!     http::HttpClientBuilder,
//! };
//!
//! let token = broker.request_token(&CapabilitySet::session_episode()).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};

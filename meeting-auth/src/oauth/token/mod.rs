//! Capability-scoped access tokens.

mod tokens;

pub use tokens::Tokens;

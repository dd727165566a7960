//! Broker implementations for specific OAuth providers.

pub mod google;

//! Provider traits.

pub mod conferencing;

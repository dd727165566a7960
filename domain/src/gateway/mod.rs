//! HTTP adapters for the services the controller talks to.

pub mod backend;
pub mod google_meet;

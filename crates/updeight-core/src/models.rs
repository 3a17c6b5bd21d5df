//! Domain models for Updeight.
//!
//! Each entity has a read model plus `Create*` / `Update*` inputs
//! consumed by the repository traits.

pub mod client;
pub mod member;
pub mod organization;
pub mod session;
pub mod tracker;

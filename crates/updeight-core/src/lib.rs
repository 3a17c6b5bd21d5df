//! Updeight Core — domain models, repository traits, the error
//! taxonomy and the authorization rules shared by every other crate.
//!
//! Nothing in this crate performs I/O. Storage is reached only through
//! the traits in [`repository`].

pub mod authz;
pub mod envelope;
pub mod error;
pub mod models;
pub mod repository;

pub use envelope::{Envelope, OperationStatus};
pub use error::{UpdeightError, UpdeightResult};

//! Updeight domain services.
//!
//! Each service composes the session store, the authorization
//! predicates from `updeight-core` and a repository. Inputs are
//! validated explicitly before any repository call.

pub mod client;
pub mod member;
pub mod organization;
pub mod tracker;
pub mod validation;

pub use client::{ClientService, CreateClientInput, UpdateClientInput};
pub use member::{
    Authenticated, LoginInput, MemberService, RegisterInput, UpdateMemberInput,
};
pub use organization::{OrganizationInput, OrganizationService};
pub use tracker::{CreateTrackerInput, TrackerService, UpdateTrackerInput};

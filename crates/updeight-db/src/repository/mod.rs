//! SurrealDB implementations of the `updeight-core` repository traits.

mod client;
mod member;
mod organization;
mod session;
mod tracker;

pub use client::SurrealClientRepository;
pub use member::SurrealMemberRepository;
pub use organization::SurrealOrganizationRepository;
pub use session::SurrealSessionRepository;
pub use tracker::SurrealTrackerRepository;

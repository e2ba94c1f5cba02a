//! Celebration messages: guest-written notes with attached images on an
//! invitation page, owned by a `(name, password)` pair rather than an account.
//!
//! Three layers as elsewhere in this crate: domain types, repository
//! abstraction (with SeaORM and in-memory implementations) and the service.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use errors::CelebrationMsgError;
pub use service::{CelebrationMsgConfig, CelebrationMsgService};

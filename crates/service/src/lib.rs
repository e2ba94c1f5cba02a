//! Service layer for guest celebration messages on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Blob cleanup for edited messages goes through the `blob` adapter.

pub mod blob;
pub mod celebration_msg;
pub mod credentials;
pub mod pagination;
#[cfg(test)]
pub mod test_support;

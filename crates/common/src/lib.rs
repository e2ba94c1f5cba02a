//! Cross-crate helpers shared by the service crate and the binaries.

pub mod utils;

//! Database models for the Warehouse Back-Office Platform
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;

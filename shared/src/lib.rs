//! Shared types and models for the Warehouse Back-Office Platform
//!
//! This crate contains types shared between the backend and other components
//! of the system: inventory ledger enums, ticket status machines, and the
//! bulk-operation report aggregates.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

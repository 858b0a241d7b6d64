//! Request middleware for the Warehouse Back-Office Platform

mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};

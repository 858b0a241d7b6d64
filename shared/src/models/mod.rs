//! Domain models for the Warehouse Back-Office Platform

mod stock;
mod ticket;

pub use stock::*;
pub use ticket::*;

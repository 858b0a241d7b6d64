//! HTTP handlers for the Warehouse Back-Office Platform

mod health;
mod inventory;
mod production;
mod purchasing;
mod sales;

pub use health::*;
pub use inventory::*;
pub use production::*;
pub use purchasing::*;
pub use sales::*;

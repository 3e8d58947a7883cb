//! Database models for the Pharmacy Inventory Management System
//!
//! Re-exports models from the shared crate

pub use shared::models::*;

//! Shared types and models for the Pharmacy Inventory Management System
//!
//! This crate contains domain models, common types, and pure validation
//! helpers shared between the backend and its test suites.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

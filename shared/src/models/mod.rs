//! Domain models for the Pharmacy Inventory Management System

mod medication;
mod movement;

pub use medication::*;
pub use movement::*;

//! HTTP handlers for the Pharmacy Inventory Management System

pub mod alert;
pub mod health;
pub mod medication;
pub mod movement;

pub use alert::*;
pub use health::*;
pub use medication::*;
pub use movement::*;

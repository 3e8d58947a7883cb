//! Business logic services for the Pharmacy Inventory Management System

pub mod alert;
pub mod medication;
pub mod movement;

pub use alert::AlertService;
pub use medication::MedicationService;
pub use movement::MovementService;

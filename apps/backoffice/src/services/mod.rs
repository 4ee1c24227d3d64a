//! Service implementations.
//!
//! One service per concern, each owning a cheap clone of the database
//! handle. Services validate input, call the pure calculators in
//! presswork-core and persist through the repositories in presswork-db.

pub mod allocation_service;
pub mod expense_service;
pub mod order_service;
pub mod profit_service;
pub mod purchase_service;

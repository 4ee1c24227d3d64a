//! # Repository Implementations
//!
//! One repository per aggregate. Each repository owns a clone of the
//! connection pool and exposes the operations the service layer needs;
//! multi-row writes (installment plans, allocation transactions) run in a
//! single SQL transaction.
//!
//! ## Queries
//! Queries are built with the runtime `sqlx::query`/`query_as` API and
//! `FromRow` row types from presswork-core; the workspace builds without a
//! prepared database.

pub mod account;
pub mod allocation;
pub mod client;
pub mod expense;
pub mod notification;
pub mod order;
pub mod profit;
pub mod purchase;

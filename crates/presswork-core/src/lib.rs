//! # presswork-core: Pure Business Logic for Presswork
//!
//! This crate is the **heart** of the Presswork back-office engine. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Presswork Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/backoffice (Services)                     │   │
//! │  │   OrderService ─ PurchaseService ─ ExpenseService ─ Allocation  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ presswork-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌────────────┐ ┌─────────────┐ ┌──────────────┐  │   │
//! │  │  │  money  │ │ allocation │ │ installments│ │  recurrence  │  │   │
//! │  │  │  Money  │ │  rule split│ │  plan dates │ │  next date   │  │   │
//! │  │  │ Percent │ │  shares    │ │  residual   │ │  reminders   │  │   │
//! │  │  └─────────┘ └────────────┘ └─────────────┘ └──────────────┘  │   │
//! │  │  ┌─────────┐ ┌────────────┐ ┌─────────────┐                   │   │
//! │  │  │  types  │ │   profit   │ │   totals    │                   │   │
//! │  │  └─────────┘ └────────────┘ └─────────────┘                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  presswork-db (Database Layer)                  │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Expense, Account, etc.)
//! - [`money`] - Money and Percent types with integer arithmetic
//! - [`error`] - Domain error types and the [`error::BestEffort`] result mode
//! - [`validation`] - Business rule validation
//! - [`allocation`] - Percentage split of incoming money across accounts
//! - [`installments`] - Installment plan generation for purchases
//! - [`recurrence`] - Recurring expense date stepping and reminders
//! - [`profit`] - Profit/labor calculation for order line items
//! - [`totals`] - Order totals aggregation and payment status
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod installments;
pub mod money;
pub mod profit;
pub mod recurrence;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use presswork_core::Money` instead of
// `use presswork_core::money::Money`

pub use error::{BestEffort, CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of installments in a single payment plan.
///
/// ## Business Reason
/// Prevents runaway plans (e.g., typing 500 instead of 5). Five years of
/// monthly installments is the longest plan the shop extends to a supplier.
pub const MAX_INSTALLMENTS: u32 = 60;

/// Maximum reminder lead time for a recurring expense, in days.
pub const MAX_REMINDER_DAYS: i64 = 90;

/// Total active allocation percentage per source may never exceed this (100%).
pub const ALLOCATION_CAP_BPS: u32 = 10_000;

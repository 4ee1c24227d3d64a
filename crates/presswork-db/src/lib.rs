//! # presswork-db: Database Layer for Presswork
//!
//! This crate provides database access for the Presswork back-office engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Presswork Data Flow                               │
//! │                                                                         │
//! │  Service call (e.g. ExpenseService::run_recurring_sweep)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   presswork-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (expense.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  order.rs,..) │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ one per       │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │ aggregate     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                     SQLite Database (WAL mode)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (orders, expenses, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use presswork_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/presswork.db");
//! let db = Database::new(config).await?;
//!
//! let due = db.expenses().list_active_recurring(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::allocation::AllocationRuleRepository;
pub use repository::client::ClientRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::notification::NotificationRepository;
pub use repository::order::OrderRepository;
pub use repository::profit::ProfitSettingsRepository;
pub use repository::purchase::PurchaseRepository;

//! # Presswork Backoffice
//!
//! Service layer and CLI for the Presswork back-office engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Backoffice Services                               │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ OrderService   │  │ ExpenseService │  │ AllocationService          ││
//! │  │                │  │                │  │                            ││
//! │  │ • items        │  │ • sweep        │  │ • accounts                 ││
//! │  │ • payments     │  │ • occurrences  │  │ • rules (≤100% cap)        ││
//! │  │ • totals       │  │ • reminders    │  │ • allocate → ledger        ││
//! │  │ • allocation   │  └────────────────┘  └────────────────────────────┘│
//! │  └────────────────┘                                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │PurchaseService │  │ ProfitService  │                                │
//! │  │                │  │                │                                │
//! │  │ • payments     │  │ • settings     │                                │
//! │  │ • installments │  │ • overrides    │                                │
//! │  │ • notes        │  └────────────────┘                                │
//! │  └────────────────┘                                                     │
//! │                                                                         │
//! │  Every service is a thin orchestration layer: validation and           │
//! │  persistence here, all business math in presswork-core.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PRESSWORK_DB_PATH` - SQLite database file (default: ./presswork.db)
//! - `PRESSWORK_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `PRESSWORK_REMINDERS_ENABLED` - sweep reminder emission (default: true)
//! - `RUST_LOG` - tracing filter (default: info)

pub mod config;
pub mod error;
pub mod services;

// Re-exports
pub use config::AppConfig;
pub use error::{ApiError, ErrorCode};
pub use services::allocation_service::AllocationService;
pub use services::expense_service::{ExpenseService, SweepReport};
pub use services::order_service::{NewOrderItem, OrderService};
pub use services::profit_service::ProfitService;
pub use services::purchase_service::PurchaseService;

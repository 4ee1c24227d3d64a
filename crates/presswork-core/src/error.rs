//! # Error Types
//!
//! Domain-specific error types for presswork-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  presswork-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── BestEffort<T>    - Explicit "log and carry on" result mode        │
//! │                                                                         │
//! │  presswork-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  backoffice errors (in app)                                            │
//! │  └── ApiError         - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Activating this rule set would push the allocation total for a
    /// source over 100%.
    ///
    /// ## When This Occurs
    /// - Creating a rule whose percent, added to the existing active
    ///   rules for the same source, exceeds 10000 bps
    /// - Re-activating or raising an existing rule past the cap
    #[error("allocation for {source_label} would reach {attempted_bps} bps, cap is {cap_bps}")]
    AllocationCapExceeded {
        source_label: String,
        attempted_bps: u32,
        cap_bps: u32,
    },

    /// Account still has ledger transactions and cannot be deleted.
    #[error("account {account_id} has ledger transactions and cannot be deleted")]
    AccountInUse { account_id: String },

    /// Occurrence is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Completing an already completed or skipped occurrence
    /// - Skipping a completed occurrence
    /// Both transitions are one-way from `pending` only.
    #[error("occurrence {occurrence_id} is {current_status}, cannot perform transition")]
    InvalidOccurrenceStatus {
        occurrence_id: String,
        current_status: String,
    },

    /// A recurring expense template has no parsable recurrence definition.
    #[error("expense {expense_id} is recurring but has no valid recurrence definition")]
    MissingRecurrence { expense_id: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// BestEffort
// =============================================================================

/// Outcome of an operation that deliberately never fails its caller.
///
/// The order totals aggregator runs after every item/payment mutation; a
/// failure there must not roll back the mutation that triggered it. Rather
/// than swallowing the failure invisibly, the aggregator returns this type:
/// callers can inspect it or ignore it, and the failure is always logged at
/// the site that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    /// The operation completed and produced a value.
    Done(T),
    /// The operation failed; the message has already been logged.
    Failed(String),
}

impl<T> BestEffort<T> {
    /// True if the operation completed.
    pub fn is_done(&self) -> bool {
        matches!(self, BestEffort::Done(_))
    }

    /// Converts into `Option`, discarding the failure message.
    pub fn ok(self) -> Option<T> {
        match self {
            BestEffort::Done(value) => Some(value),
            BestEffort::Failed(_) => None,
        }
    }

    /// Returns the failure message, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            BestEffort::Done(_) => None,
            BestEffort::Failed(message) => Some(message),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

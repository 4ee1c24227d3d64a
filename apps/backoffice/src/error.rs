//! # API Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Presswork                              │
//! │                                                                         │
//! │  Caller                      Service Layer                              │
//! │  ──────                      ─────────────                              │
//! │                                                                         │
//! │  order_service.add_payment(...)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Method                                                  │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::Validation ───── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two service outcomes deliberately do NOT use this type: the order totals
//! recompute returns [`presswork_core::BestEffort`] (it must never fail the
//! mutation that triggered it), and the recurring sweep returns a
//! [`crate::services::expense_service::SweepReport`] that carries per-item
//! failures instead of aborting the batch.

use serde::Serialize;

use presswork_core::CoreError;
use presswork_db::DbError;

/// API error returned from service operations.
///
/// ## Serialization
/// This is what a transport layer would hand to callers on failure:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 7f2c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// A business or store constraint rejected the operation
    /// (allocation cap, occurrence transition, account still referenced)
    Constraint,

    /// The underlying data store failed
    StoreError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a constraint error.
    pub fn constraint(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Constraint, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Constraint,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::Constraint, "Invalid or still-referenced record")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check violation: {}", message);
                ApiError::new(ErrorCode::Constraint, "Value rejected by store constraint")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::StoreError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::StoreError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StoreError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AllocationCapExceeded { .. } => {
                ApiError::constraint(err.to_string())
            }
            CoreError::AccountInUse { account_id } => ApiError::new(
                ErrorCode::Constraint,
                format!(
                    "Account {} still has ledger transactions; deactivate it instead",
                    account_id
                ),
            ),
            CoreError::InvalidOccurrenceStatus {
                occurrence_id,
                current_status,
            } => ApiError::new(
                ErrorCode::Constraint,
                format!(
                    "Occurrence {} is {}, only pending occurrences can transition",
                    occurrence_id, current_status
                ),
            ),
            CoreError::MissingRecurrence { expense_id } => ApiError::validation(format!(
                "Expense {} has no valid recurrence definition",
                expense_id
            )),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use presswork_core::ValidationError;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ApiError = DbError::not_found("Order", "o-1").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: o-1");
    }

    #[test]
    fn test_core_cap_maps_to_constraint() {
        let err: ApiError = CoreError::AllocationCapExceeded {
            source_label: "profit".to_string(),
            attempted_bps: 10_500,
            cap_bps: 10_000,
        }
        .into();
        assert_eq!(err.code, ErrorCode::Constraint);
    }

    #[test]
    fn test_validation_maps_through() {
        let err: ApiError = CoreError::Validation(ValidationError::MustBePositive {
            field: "amount".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "amount must be positive");
    }
}

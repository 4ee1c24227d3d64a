//! # Expense Repository
//!
//! Database operations for expenses and recurring expense occurrences.
//!
//! ## Occurrence State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            ┌──────────► completed  (links a concrete Expense)          │
//! │   pending ─┤                                                            │
//! │            └──────────► skipped    (terminal, no side effects)         │
//! │                                                                         │
//! │  Both UPDATEs carry `WHERE status = 'pending'`; zero rows affected     │
//! │  means the transition was attempted from the wrong state.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use presswork_core::{Expense, PaymentStatus, RecurringExpenseOccurrence};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts an expense (concrete or recurring template).
    pub async fn insert(&self, expense: &Expense) -> DbResult<()> {
        debug!(id = %expense.id, item = %expense.item_name, recurring = expense.is_recurring, "Inserting expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, category, item_name, expense_date,
                total_cents, paid_cents, payment_status,
                is_recurring, recurrence_json, recurrence_end_date,
                next_occurrence_date, reminder_days,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(&expense.item_name)
        .bind(expense.expense_date)
        .bind(expense.total_cents)
        .bind(expense.paid_cents)
        .bind(expense.payment_status)
        .bind(expense.is_recurring)
        .bind(&expense.recurrence_json)
        .bind(expense.recurrence_end_date)
        .bind(expense.next_occurrence_date)
        .bind(expense.reminder_days)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, item_name, expense_date,
                   total_cents, paid_cents, payment_status,
                   is_recurring, recurrence_json, recurrence_end_date,
                   next_occurrence_date, reminder_days,
                   created_at, updated_at
            FROM expenses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Lists recurring templates still in force as of `as_of`: recurring
    /// rows whose end date is unset or not yet passed. The sweep partitions
    /// these into due-now and reminder candidates.
    pub async fn list_active_recurring(&self, as_of: NaiveDate) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, item_name, expense_date,
                   total_cents, paid_cents, payment_status,
                   is_recurring, recurrence_json, recurrence_end_date,
                   next_occurrence_date, reminder_days,
                   created_at, updated_at
            FROM expenses
            WHERE is_recurring = 1
              AND (recurrence_end_date IS NULL OR recurrence_end_date >= ?1)
            ORDER BY next_occurrence_date
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Advances a template's next-occurrence date.
    pub async fn update_next_occurrence(
        &self,
        expense_id: &str,
        next: NaiveDate,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE expenses SET next_occurrence_date = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(expense_id)
        .bind(next)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", expense_id));
        }

        Ok(())
    }

    /// Writes a recomputed paid amount and status.
    pub async fn update_paid(
        &self,
        expense_id: &str,
        paid_cents: i64,
        payment_status: PaymentStatus,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                paid_cents = ?2,
                payment_status = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(expense_id)
        .bind(paid_cents)
        .bind(payment_status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", expense_id));
        }

        Ok(())
    }

    // =========================================================================
    // Occurrences
    // =========================================================================

    /// Inserts a (pending) occurrence.
    pub async fn insert_occurrence(
        &self,
        occurrence: &RecurringExpenseOccurrence,
    ) -> DbResult<()> {
        debug!(
            parent = %occurrence.parent_expense_id,
            date = %occurrence.occurrence_date,
            "Inserting occurrence"
        );

        sqlx::query(
            r#"
            INSERT INTO recurring_expense_occurrences (
                id, parent_expense_id, occurrence_date, status,
                linked_expense_id, completed_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&occurrence.id)
        .bind(&occurrence.parent_expense_id)
        .bind(occurrence.occurrence_date)
        .bind(occurrence.status)
        .bind(&occurrence.linked_expense_id)
        .bind(occurrence.completed_date)
        .bind(occurrence.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an occurrence by ID.
    pub async fn get_occurrence(
        &self,
        id: &str,
    ) -> DbResult<Option<RecurringExpenseOccurrence>> {
        let occurrence = sqlx::query_as::<_, RecurringExpenseOccurrence>(
            r#"
            SELECT id, parent_expense_id, occurrence_date, status,
                   linked_expense_id, completed_date, created_at
            FROM recurring_expense_occurrences
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(occurrence)
    }

    /// Lists occurrences of a template, newest first.
    pub async fn list_occurrences(
        &self,
        parent_expense_id: &str,
    ) -> DbResult<Vec<RecurringExpenseOccurrence>> {
        let occurrences = sqlx::query_as::<_, RecurringExpenseOccurrence>(
            r#"
            SELECT id, parent_expense_id, occurrence_date, status,
                   linked_expense_id, completed_date, created_at
            FROM recurring_expense_occurrences
            WHERE parent_expense_id = ?1
            ORDER BY occurrence_date DESC
            "#,
        )
        .bind(parent_expense_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(occurrences)
    }

    /// Marks a pending occurrence completed, linking the concrete expense.
    ///
    /// Returns false if the occurrence was not pending (the guard matched
    /// zero rows); the caller decides how to report the stale transition.
    pub async fn mark_occurrence_completed(
        &self,
        occurrence_id: &str,
        linked_expense_id: &str,
        completed_date: NaiveDate,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE recurring_expense_occurrences SET
                status = 'completed',
                linked_expense_id = ?2,
                completed_date = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(occurrence_id)
        .bind(linked_expense_id)
        .bind(completed_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks a pending occurrence skipped. Terminal; no side effects.
    ///
    /// Returns false if the occurrence was not pending.
    pub async fn mark_occurrence_skipped(&self, occurrence_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE recurring_expense_occurrences SET status = 'skipped'
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(occurrence_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Expense Service
//!
//! Expense orchestration: concrete expenses, recurring templates, the
//! daily sweep that materializes due occurrences, and the one-way
//! occurrence transitions.
//!
//! ## The Sweep
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  run_recurring_sweep(today)                                             │
//! │                                                                         │
//! │  for each recurring template still in force:                           │
//! │    1. reminder check: days until next occurrence == reminder_days      │
//! │       → exactly one Notification (narrow equality, see recurrence)     │
//! │    2. due check: next_occurrence_date <= today                         │
//! │       → ONE pending occurrence dated next_occurrence_date              │
//! │       → advance the template past today                                │
//! │                                                                         │
//! │  A failure on one template is recorded in the report and the sweep     │
//! │  moves on; the batch never aborts.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Templates are processed sequentially; the sweep is a single start-to-
//! finish invocation (one cron tick), not a fan-out.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use presswork_core::recurrence::{reminder_due, Recurrence};
use presswork_core::totals::derive_payment_status;
use presswork_core::validation::{
    validate_name, validate_non_negative_amount, validate_positive_amount,
    validate_reminder_days,
};
use presswork_core::{
    CoreError, Expense, Money, Notification, NotificationKind, OccurrenceStatus, PaymentStatus,
    RecurringExpenseOccurrence,
};
use presswork_db::Database;

/// One failed template in a sweep run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepError {
    pub expense_id: String,
    pub message: String,
}

/// Aggregate outcome of one sweep run. Per-item failures are carried here
/// instead of aborting the batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub occurrences_created: usize,
    pub reminders_sent: usize,
    pub errors: Vec<SweepError>,
}

#[derive(Default)]
struct TemplateOutcome {
    created: bool,
    reminded: bool,
}

/// Service for expenses, recurring templates and occurrences.
#[derive(Debug, Clone)]
pub struct ExpenseService {
    db: Database,
    reminders_enabled: bool,
}

impl ExpenseService {
    pub fn new(db: Database) -> Self {
        ExpenseService {
            db,
            reminders_enabled: true,
        }
    }

    /// Disables reminder emission (sweep still creates occurrences).
    pub fn with_reminders(mut self, enabled: bool) -> Self {
        self.reminders_enabled = enabled;
        self
    }

    // =========================================================================
    // Expense Creation
    // =========================================================================

    /// Records a concrete (non-recurring) expense.
    pub async fn create_expense(
        &self,
        category: &str,
        item_name: &str,
        expense_date: NaiveDate,
        total_cents: i64,
    ) -> Result<Expense, ApiError> {
        validate_name("category", category).map_err(CoreError::from)?;
        validate_name("item_name", item_name).map_err(CoreError::from)?;
        validate_non_negative_amount("total", total_cents).map_err(CoreError::from)?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: category.trim().to_string(),
            item_name: item_name.trim().to_string(),
            expense_date,
            total_cents,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            is_recurring: false,
            recurrence_json: None,
            recurrence_end_date: None,
            next_occurrence_date: None,
            reminder_days: None,
            created_at: now,
            updated_at: now,
        };

        self.db.expenses().insert(&expense).await?;
        Ok(expense)
    }

    /// Records a recurring expense template. The first occurrence falls on
    /// `first_occurrence`; the sweep takes it from there.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_recurring_template(
        &self,
        category: &str,
        item_name: &str,
        total_cents: i64,
        recurrence: Recurrence,
        first_occurrence: NaiveDate,
        recurrence_end_date: Option<NaiveDate>,
        reminder_days: Option<i64>,
    ) -> Result<Expense, ApiError> {
        validate_name("category", category).map_err(CoreError::from)?;
        validate_name("item_name", item_name).map_err(CoreError::from)?;
        validate_non_negative_amount("total", total_cents).map_err(CoreError::from)?;
        if let Some(days) = reminder_days {
            validate_reminder_days(days).map_err(CoreError::from)?;
        }

        let recurrence_json = serde_json::to_string(&recurrence)
            .map_err(|e| ApiError::internal(format!("recurrence serialization failed: {}", e)))?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: category.trim().to_string(),
            item_name: item_name.trim().to_string(),
            expense_date: first_occurrence,
            total_cents,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            is_recurring: true,
            recurrence_json: Some(recurrence_json),
            recurrence_end_date,
            next_occurrence_date: Some(first_occurrence),
            reminder_days,
            created_at: now,
            updated_at: now,
        };

        self.db.expenses().insert(&expense).await?;
        info!(expense_id = %expense.id, item = %expense.item_name, "Recurring template created");

        Ok(expense)
    }

    /// Records a payment against an expense and rederives its tri-state
    /// status. Expenses carry no payment children; the paid amount
    /// accumulates on the row itself.
    pub async fn record_payment(
        &self,
        expense_id: &str,
        amount_cents: i64,
    ) -> Result<PaymentStatus, ApiError> {
        validate_positive_amount("amount", amount_cents).map_err(CoreError::from)?;

        let expense = self
            .db
            .expenses()
            .get_by_id(expense_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Expense", expense_id))?;

        let paid = expense.paid_cents + amount_cents;
        let status = derive_payment_status(expense.total(), Money::from_cents(paid));
        self.db.expenses().update_paid(expense_id, paid, status).await?;

        Ok(status)
    }

    // =========================================================================
    // Sweep
    // =========================================================================

    /// Runs the daily sweep over all recurring templates still in force.
    ///
    /// Each due template yields exactly one pending occurrence per run and
    /// has its next date advanced strictly past `today`. Errors on one
    /// template are captured into the report and never stop the rest.
    pub async fn run_recurring_sweep(&self, today: NaiveDate) -> Result<SweepReport, ApiError> {
        let templates = self.db.expenses().list_active_recurring(today).await?;

        let mut report = SweepReport::default();
        for template in &templates {
            report.scanned += 1;
            match self.process_template(template, today).await {
                Ok(outcome) => {
                    if outcome.created {
                        report.occurrences_created += 1;
                    }
                    if outcome.reminded {
                        report.reminders_sent += 1;
                    }
                }
                Err(e) => {
                    warn!(expense_id = %template.id, error = %e, "Sweep item failed");
                    report.errors.push(SweepError {
                        expense_id: template.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            scanned = report.scanned,
            created = report.occurrences_created,
            reminders = report.reminders_sent,
            failed = report.errors.len(),
            "Recurring sweep complete"
        );

        Ok(report)
    }

    /// Handles one template: reminder first (against the stored date, as
    /// loaded), then occurrence creation and date advance.
    async fn process_template(
        &self,
        template: &Expense,
        today: NaiveDate,
    ) -> Result<TemplateOutcome, ApiError> {
        let mut outcome = TemplateOutcome::default();

        let Some(next) = template.next_occurrence_date else {
            // A template that never got a next date produces nothing.
            debug!(expense_id = %template.id, "Template has no next occurrence date");
            return Ok(outcome);
        };

        if self.reminders_enabled {
            if let Some(days) = template.reminder_days {
                if reminder_due(next, today, days) {
                    self.emit_reminder(template, next).await?;
                    outcome.reminded = true;
                }
            }
        }

        if next <= today {
            let recurrence = template
                .recurrence()
                .ok_or_else(|| CoreError::MissingRecurrence {
                    expense_id: template.id.clone(),
                })?;

            let occurrence = RecurringExpenseOccurrence {
                id: Uuid::new_v4().to_string(),
                parent_expense_id: template.id.clone(),
                occurrence_date: next,
                status: OccurrenceStatus::Pending,
                linked_expense_id: None,
                completed_date: None,
                created_at: Utc::now(),
            };
            self.db.expenses().insert_occurrence(&occurrence).await?;

            let advanced = recurrence.next_after(next, today);
            self.db
                .expenses()
                .update_next_occurrence(&template.id, advanced)
                .await?;

            debug!(
                expense_id = %template.id,
                occurrence_date = %next,
                next = %advanced,
                "Occurrence created"
            );
            outcome.created = true;
        }

        Ok(outcome)
    }

    async fn emit_reminder(&self, template: &Expense, next: NaiveDate) -> Result<(), ApiError> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            title: format!("{} due soon", template.item_name),
            body: format!(
                "{} ({}) is due on {}",
                template.item_name, template.category, next
            ),
            kind: NotificationKind::Reminder,
            reference_id: Some(template.id.clone()),
            is_read: false,
            created_at: Utc::now(),
        };
        self.db.notifications().insert(&notification).await?;
        Ok(())
    }

    // =========================================================================
    // Occurrence Transitions
    // =========================================================================

    /// Completes a pending occurrence: creates the concrete paid expense,
    /// links it back and stamps the completion date. One-way.
    pub async fn complete_occurrence(
        &self,
        occurrence_id: &str,
        completed_date: NaiveDate,
    ) -> Result<Expense, ApiError> {
        let occurrence = self
            .db
            .expenses()
            .get_occurrence(occurrence_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Occurrence", occurrence_id))?;

        if occurrence.status != OccurrenceStatus::Pending {
            return Err(self.stale_transition(&occurrence));
        }

        let template = self
            .db
            .expenses()
            .get_by_id(&occurrence.parent_expense_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Expense", &occurrence.parent_expense_id))?;

        let now = Utc::now();
        let concrete = Expense {
            id: Uuid::new_v4().to_string(),
            category: template.category.clone(),
            item_name: template.item_name.clone(),
            expense_date: occurrence.occurrence_date,
            total_cents: template.total_cents,
            paid_cents: template.total_cents,
            payment_status: PaymentStatus::Paid,
            is_recurring: false,
            recurrence_json: None,
            recurrence_end_date: None,
            next_occurrence_date: None,
            reminder_days: None,
            created_at: now,
            updated_at: now,
        };
        self.db.expenses().insert(&concrete).await?;

        let flipped = self
            .db
            .expenses()
            .mark_occurrence_completed(occurrence_id, &concrete.id, completed_date)
            .await?;
        if !flipped {
            // Lost the race: someone else transitioned it first.
            return Err(self.stale_transition(&occurrence));
        }

        info!(
            occurrence_id = %occurrence_id,
            expense_id = %concrete.id,
            "Occurrence completed"
        );

        Ok(concrete)
    }

    /// Skips a pending occurrence. Terminal, no side effects.
    pub async fn skip_occurrence(&self, occurrence_id: &str) -> Result<(), ApiError> {
        let occurrence = self
            .db
            .expenses()
            .get_occurrence(occurrence_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Occurrence", occurrence_id))?;

        if occurrence.status != OccurrenceStatus::Pending {
            return Err(self.stale_transition(&occurrence));
        }

        let flipped = self.db.expenses().mark_occurrence_skipped(occurrence_id).await?;
        if !flipped {
            return Err(self.stale_transition(&occurrence));
        }

        info!(occurrence_id = %occurrence_id, "Occurrence skipped");
        Ok(())
    }

    fn stale_transition(&self, occurrence: &RecurringExpenseOccurrence) -> ApiError {
        CoreError::InvalidOccurrenceStatus {
            occurrence_id: occurrence.id.clone(),
            current_status: format!("{:?}", occurrence.status).to_lowercase(),
        }
        .into()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use presswork_core::recurrence::{RecurrenceFrequency, RecurrenceRule};
    use presswork_db::DbConfig;

    async fn service() -> ExpenseService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ExpenseService::new(db)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(day: u32) -> Recurrence {
        Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(day),
        }
    }

    #[tokio::test]
    async fn test_sweep_creates_one_occurrence_and_advances() {
        let svc = service().await;
        let template = svc
            .create_recurring_template(
                "rent",
                "Shop rent",
                4_500_000,
                monthly(1),
                date(2024, 4, 1),
                None,
                None,
            )
            .await
            .unwrap();

        let report = svc.run_recurring_sweep(date(2024, 4, 3)).await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.occurrences_created, 1);
        assert!(report.errors.is_empty());

        let occurrences = svc.db.expenses().list_occurrences(&template.id).await.unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].occurrence_date, date(2024, 4, 1));
        assert_eq!(occurrences[0].status, OccurrenceStatus::Pending);

        // Template advanced strictly past today
        let loaded = svc.db.expenses().get_by_id(&template.id).await.unwrap().unwrap();
        assert_eq!(loaded.next_occurrence_date, Some(date(2024, 5, 1)));

        // A second run on the same day creates nothing new
        let report = svc.run_recurring_sweep(date(2024, 4, 3)).await.unwrap();
        assert_eq!(report.occurrences_created, 0);
        assert_eq!(svc.db.expenses().list_occurrences(&template.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_catches_up_over_a_gap_with_one_occurrence() {
        let svc = service().await;
        let template = svc
            .create_recurring_template(
                "utilities",
                "Internet",
                350_000,
                monthly(10),
                date(2024, 1, 10),
                None,
                None,
            )
            .await
            .unwrap();

        // The job did not run for three months: one occurrence per run,
        // but the next date clears today in a single sweep
        let report = svc.run_recurring_sweep(date(2024, 4, 2)).await.unwrap();
        assert_eq!(report.occurrences_created, 1);

        let loaded = svc.db.expenses().get_by_id(&template.id).await.unwrap().unwrap();
        assert_eq!(loaded.next_occurrence_date, Some(date(2024, 4, 10)));
    }

    #[tokio::test]
    async fn test_sweep_isolates_per_template_failures() {
        let svc = service().await;

        // A template whose stored recurrence does not parse
        let now = Utc::now();
        let broken = Expense {
            id: Uuid::new_v4().to_string(),
            category: "utilities".to_string(),
            item_name: "Electricity".to_string(),
            expense_date: date(2024, 4, 1),
            total_cents: 10_000,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            is_recurring: true,
            recurrence_json: Some("not json".to_string()),
            recurrence_end_date: None,
            next_occurrence_date: Some(date(2024, 4, 1)),
            reminder_days: None,
            created_at: now,
            updated_at: now,
        };
        svc.db.expenses().insert(&broken).await.unwrap();

        let healthy = svc
            .create_recurring_template(
                "rent",
                "Shop rent",
                4_500_000,
                monthly(1),
                date(2024, 4, 1),
                None,
                None,
            )
            .await
            .unwrap();

        let report = svc.run_recurring_sweep(date(2024, 4, 2)).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.occurrences_created, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].expense_id, broken.id);

        // The healthy template was processed despite the broken one
        assert_eq!(svc.db.expenses().list_occurrences(&healthy.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reminder_fires_on_exact_day_only() {
        let svc = service().await;
        svc.create_recurring_template(
            "rent",
            "Shop rent",
            4_500_000,
            monthly(10),
            date(2024, 4, 10),
            None,
            Some(3),
        )
        .await
        .unwrap();

        // 4 days out: nothing
        let report = svc.run_recurring_sweep(date(2024, 4, 6)).await.unwrap();
        assert_eq!(report.reminders_sent, 0);

        // Exactly 3 days out: one reminder
        let report = svc.run_recurring_sweep(date(2024, 4, 7)).await.unwrap();
        assert_eq!(report.reminders_sent, 1);

        let unread = svc.db.notifications().list_unread().await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].kind, NotificationKind::Reminder);

        // 2 days out: the window has passed, no duplicate
        let report = svc.run_recurring_sweep(date(2024, 4, 8)).await.unwrap();
        assert_eq!(report.reminders_sent, 0);
    }

    #[tokio::test]
    async fn test_reminders_can_be_disabled() {
        let svc = service().await.with_reminders(false);
        svc.create_recurring_template(
            "rent",
            "Shop rent",
            4_500_000,
            monthly(10),
            date(2024, 4, 10),
            None,
            Some(3),
        )
        .await
        .unwrap();

        let report = svc.run_recurring_sweep(date(2024, 4, 7)).await.unwrap();
        assert_eq!(report.reminders_sent, 0);
        assert!(svc.db.notifications().list_unread().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ended_template_is_skipped() {
        let svc = service().await;
        svc.create_recurring_template(
            "rent",
            "Old lease",
            1_000_000,
            monthly(1),
            date(2024, 4, 1),
            Some(date(2024, 1, 31)),
            None,
        )
        .await
        .unwrap();

        let report = svc.run_recurring_sweep(date(2024, 4, 2)).await.unwrap();
        assert_eq!(report.scanned, 0);
        assert_eq!(report.occurrences_created, 0);
    }

    #[tokio::test]
    async fn test_complete_occurrence_creates_paid_expense() {
        let svc = service().await;
        let template = svc
            .create_recurring_template(
                "rent",
                "Shop rent",
                4_500_000,
                monthly(1),
                date(2024, 4, 1),
                None,
                None,
            )
            .await
            .unwrap();
        svc.run_recurring_sweep(date(2024, 4, 1)).await.unwrap();

        let occurrence = svc.db.expenses().list_occurrences(&template.id).await.unwrap()[0].clone();

        let concrete = svc
            .complete_occurrence(&occurrence.id, date(2024, 4, 2))
            .await
            .unwrap();
        assert_eq!(concrete.payment_status, PaymentStatus::Paid);
        assert_eq!(concrete.paid_cents, 4_500_000);
        assert_eq!(concrete.expense_date, date(2024, 4, 1));
        assert!(!concrete.is_recurring);

        let loaded = svc.db.expenses().get_occurrence(&occurrence.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OccurrenceStatus::Completed);
        assert_eq!(loaded.linked_expense_id.as_deref(), Some(concrete.id.as_str()));
        assert_eq!(loaded.completed_date, Some(date(2024, 4, 2)));

        // One-way: completing again is a constraint error
        let err = svc
            .complete_occurrence(&occurrence.id, date(2024, 4, 3))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Constraint);
    }

    #[tokio::test]
    async fn test_record_payment_walks_status() {
        let svc = service().await;
        let expense = svc
            .create_expense("utilities", "Electricity", date(2024, 4, 1), 10_000)
            .await
            .unwrap();

        let status = svc.record_payment(&expense.id, 4_000).await.unwrap();
        assert_eq!(status, PaymentStatus::PartiallyPaid);

        let status = svc.record_payment(&expense.id, 6_000).await.unwrap();
        assert_eq!(status, PaymentStatus::Paid);

        let loaded = svc.db.expenses().get_by_id(&expense.id).await.unwrap().unwrap();
        assert_eq!(loaded.paid_cents, 10_000);

        assert!(svc.record_payment(&expense.id, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_skip_is_terminal() {
        let svc = service().await;
        let template = svc
            .create_recurring_template(
                "utilities",
                "Internet",
                350_000,
                monthly(15),
                date(2024, 4, 15),
                None,
                None,
            )
            .await
            .unwrap();
        svc.run_recurring_sweep(date(2024, 4, 15)).await.unwrap();

        let occurrence = svc.db.expenses().list_occurrences(&template.id).await.unwrap()[0].clone();
        svc.skip_occurrence(&occurrence.id).await.unwrap();

        let err = svc
            .complete_occurrence(&occurrence.id, date(2024, 4, 16))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Constraint);
        assert!(svc.skip_occurrence(&occurrence.id).await.is_err());
    }
}

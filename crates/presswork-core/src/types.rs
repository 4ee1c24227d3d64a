//! # Domain Types
//!
//! Core domain types used throughout Presswork.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │     Order       │   │ MaterialPurchase │   │    Expense      │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  OrderItem      │   │  MaterialPayment │   │  Recurring-     │      │
//! │  │  OrderPayment   │   │  MaterialInstal. │   │  ExpenseOccur.  │      │
//! │  └─────────────────┘   │  MaterialNote    │   └─────────────────┘      │
//! │                        └──────────────────┘                            │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Account      │   │  AllocationRule  │   │  Notification   │      │
//! │  │  AccountTrans.  │   │  (% per source)  │   │                 │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` used for database relations. Human-facing
//! identity (supplier name, item name, category) is plain data and mutable.
//!
//! ## Derived Fields
//! `Order.balance_cents`, `Order.payment_status` and
//! `MaterialPurchase.payment_status` are DERIVED values, recomputed by the
//! totals aggregator whenever the underlying items or payments change. They
//! are never set independently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Percent};
use crate::recurrence::Recurrence;

// =============================================================================
// Payment Status
// =============================================================================

/// Tri-state payment status shared by orders, purchases and expenses.
///
/// Derivation rule (see [`crate::totals::derive_payment_status`]):
/// - `Unpaid` when the total is zero or nothing has been paid
/// - `Paid` when the paid amount covers the total
/// - `PartiallyPaid` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

// =============================================================================
// Allocation & Ledger Types
// =============================================================================

/// The kind of money movement an allocation rule (or transaction) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Profit,
    Labor,
    OrderPayment,
    Expense,
}

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

/// Ledger account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Profit,
    Labor,
    Expense,
    Revenue,
    Custom,
}

/// A ledger account money can be allocated to.
///
/// An account cannot be deleted while any [`AccountTransaction`] references
/// it; the store enforces this with a RESTRICT foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    /// Whether the account participates in allocation (soft disable).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in the append-only account ledger.
///
/// Immutable once created: there is no update or delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AccountTransaction {
    pub id: String,
    pub account_id: String,
    /// Always positive; direction is carried by `transaction_type`.
    pub amount_cents: i64,
    pub transaction_type: TransactionType,
    /// What kind of money movement produced this entry.
    pub source_type: SourceType,
    /// Originating record (order, expense, ...), if any.
    pub source_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AccountTransaction {
    /// Returns the transaction amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A configured percentage split of incoming money to a ledger account.
///
/// ## Invariant
/// For a given `source_type`, the sum of `percent_bps` over all rules with
/// `is_active = true` must never exceed 10000 (100%). The invariant is
/// enforced at rule create/update time; allocation itself trusts whatever
/// is currently active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AllocationRule {
    pub id: String,
    pub source_type: SourceType,
    pub account_id: String,
    /// Share of the source amount, in basis points (2550 = 25.50%).
    pub percent_bps: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AllocationRule {
    /// Returns the rule's share as a Percent.
    #[inline]
    pub fn percent(&self) -> Percent {
        Percent::from_bps(self.percent_bps.max(0) as u32)
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer of the shop. Orders reference clients by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

/// Production status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    MobileMoney,
    Cheque,
}

/// A client order.
///
/// `total_cents`, `paid_cents` and `payment_status` are recomputed from the
/// order's items and payments by the totals aggregator; `balance_cents` is a
/// generated column in the store (total - paid) and is never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// A line item on an order.
///
/// `profit_cents` and `labor_cents` are computed ONCE at creation/update by
/// the profit calculator and stored; they are not recomputed lazily. Under
/// the `unit_price` calculation basis they are per-unit amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Catalog item reference, when the line came from the catalog.
    pub item_id: Option<String>,
    pub item_name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Line total (unit_price × quantity).
    pub total_cents: i64,
    pub profit_cents: i64,
    pub labor_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    #[inline]
    pub fn labor(&self) -> Money {
        Money::from_cents(self.labor_cents)
    }
}

/// A payment towards an order. Append/delete only; each mutation re-runs
/// the totals aggregator for the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderPayment {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl OrderPayment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Material Purchases
// =============================================================================

/// A purchase of raw material from a supplier.
///
/// `payment_status` is derived and recomputed whenever `paid_cents` changes
/// (via payment add/delete). Child payments, installments and notes cascade
/// on delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MaterialPurchase {
    pub id: String,
    pub supplier_name: String,
    pub material_name: String,
    pub purchase_date: NaiveDate,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaterialPurchase {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// Amount still owed to the supplier.
    #[inline]
    pub fn outstanding(&self) -> Money {
        self.total() - self.paid()
    }
}

/// A payment towards a material purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MaterialPayment {
    pub id: String,
    pub purchase_id: String,
    pub amount_cents: i64,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl MaterialPayment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Status of a scheduled installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

/// One scheduled installment of a purchase payment plan.
///
/// Generated as a batch by the installment plan generator; the sum of all
/// installment amounts equals the purchase's outstanding balance at
/// generation time exactly (rounding absorbed into the last installment).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MaterialInstallment {
    pub id: String,
    pub purchase_id: String,
    /// 1-based, sequential within the plan.
    pub installment_number: i64,
    pub amount_cents: i64,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub created_at: DateTime<Utc>,
}

impl MaterialInstallment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Free-form note attached to a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MaterialNote {
    pub id: String,
    pub purchase_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Expenses
// =============================================================================

/// A business expense. When `is_recurring` is set, the row acts as a
/// TEMPLATE for [`RecurringExpenseOccurrence`] rows: `recurrence_json`
/// holds the serialized [`Recurrence`] definition and
/// `next_occurrence_date` tracks when the next occurrence falls due.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub item_name: String,
    pub expense_date: NaiveDate,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub payment_status: PaymentStatus,
    pub is_recurring: bool,
    /// Serialized [`Recurrence`]; present iff `is_recurring`.
    pub recurrence_json: Option<String>,
    /// After this date the template stops producing occurrences.
    pub recurrence_end_date: Option<NaiveDate>,
    pub next_occurrence_date: Option<NaiveDate>,
    /// Emit a reminder notification exactly this many days before the
    /// next occurrence. None disables reminders.
    pub reminder_days: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// Parses the stored recurrence definition.
    ///
    /// Returns None when the row has no definition or the stored JSON does
    /// not parse; a recurring template without a parsable definition is
    /// reported as a per-item sweep error, not a panic.
    pub fn recurrence(&self) -> Option<Recurrence> {
        self.recurrence_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Status of one concrete instance of a recurring expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Pending,
    Completed,
    Skipped,
}

/// One concrete instance of a recurring expense template, due on a
/// specific date.
///
/// Transitions are ONE-WAY: `pending → completed` (creates a concrete paid
/// [`Expense`] and links it back) or `pending → skipped` (terminal, no side
/// effects). Nothing reverts a completed or skipped occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RecurringExpenseOccurrence {
    pub id: String,
    pub parent_expense_id: String,
    pub occurrence_date: NaiveDate,
    pub status: OccurrenceStatus,
    /// The concrete Expense created on completion.
    pub linked_expense_id: Option<String>,
    pub completed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notifications
// =============================================================================

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Alert,
    Info,
}

/// An in-app notification (e.g. an upcoming recurring expense reminder).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    /// The record this notification refers to (expense id, order id, ...).
    pub reference_id: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{RecurrenceFrequency, RecurrenceRule};

    #[test]
    fn test_payment_status_default() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_purchase_outstanding() {
        let purchase = MaterialPurchase {
            id: "p1".to_string(),
            supplier_name: "Karachi Paper Mart".to_string(),
            material_name: "80gsm offset".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            quantity: 10,
            unit_price_cents: 5_000,
            total_cents: 50_000,
            paid_cents: 12_500,
            payment_status: PaymentStatus::PartiallyPaid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(purchase.outstanding().cents(), 37_500);
    }

    #[test]
    fn test_expense_recurrence_roundtrip() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(15),
        };
        let json = serde_json::to_string(&recurrence).unwrap();

        let expense = Expense {
            id: "e1".to_string(),
            category: "rent".to_string(),
            item_name: "Shop rent".to_string(),
            expense_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            total_cents: 80_000,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            is_recurring: true,
            recurrence_json: Some(json),
            recurrence_end_date: None,
            next_occurrence_date: NaiveDate::from_ymd_opt(2024, 2, 15),
            reminder_days: Some(3),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let parsed = expense.recurrence().unwrap();
        assert_eq!(parsed.frequency, RecurrenceFrequency::Monthly);
        assert_eq!(parsed.rule, RecurrenceRule::DayOfMonth(15));
    }

    #[test]
    fn test_expense_invalid_recurrence_is_none() {
        let expense = Expense {
            id: "e2".to_string(),
            category: "utilities".to_string(),
            item_name: "Electricity".to_string(),
            expense_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total_cents: 10_000,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            is_recurring: true,
            recurrence_json: Some("not json".to_string()),
            recurrence_end_date: None,
            next_occurrence_date: None,
            reminder_days: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(expense.recurrence().is_none());
    }

    #[test]
    fn test_allocation_rule_percent_clamps_negative() {
        let rule = AllocationRule {
            id: "r1".to_string(),
            source_type: SourceType::Profit,
            account_id: "a1".to_string(),
            percent_bps: -50,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(rule.percent().is_zero());
    }
}

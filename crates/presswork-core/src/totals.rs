//! # Order Totals Aggregator
//!
//! Recomputes an order's derived money fields from its items and payments.
//! The same tri-state status derivation backs material purchases and
//! expenses.
//!
//! ## Derivation
//! ```text
//! total   = Σ item.total
//! paid    = Σ payment.amount
//! balance = total - paid          (generated by the store, never written)
//!
//! status  = unpaid          if total == 0 or paid <= 0
//!         = paid            if paid >= total
//!         = partially_paid  otherwise
//! ```
//!
//! The computation is pure and idempotent; running it twice over the same
//! children produces identical output. Persistence of the result is the
//! service layer's job and runs in "best effort" mode
//! (see [`crate::error::BestEffort`]).

use crate::money::Money;
use crate::types::{MaterialPayment, OrderItem, OrderPayment, PaymentStatus};

/// Recomputed totals for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub total: Money,
    pub paid: Money,
    pub balance: Money,
    pub payment_status: PaymentStatus,
}

/// Derives the tri-state payment status from a total and a paid amount.
pub fn derive_payment_status(total: Money, paid: Money) -> PaymentStatus {
    if total.is_zero() || !paid.is_positive() {
        PaymentStatus::Unpaid
    } else if paid >= total {
        PaymentStatus::Paid
    } else {
        PaymentStatus::PartiallyPaid
    }
}

/// Recomputes an order's totals from its line items and payments.
pub fn compute_order_totals(items: &[OrderItem], payments: &[OrderPayment]) -> OrderTotals {
    let total: Money = items.iter().map(|item| item.total()).sum();
    let paid: Money = payments.iter().map(|payment| payment.amount()).sum();

    OrderTotals {
        total,
        paid,
        balance: total - paid,
        payment_status: derive_payment_status(total, paid),
    }
}

/// Recomputes a material purchase's paid amount and status from its
/// payments.
pub fn compute_purchase_paid(
    purchase_total: Money,
    payments: &[MaterialPayment],
) -> (Money, PaymentStatus) {
    let paid: Money = payments.iter().map(|payment| payment.amount()).sum();
    (paid, derive_payment_status(purchase_total, paid))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{NaiveDate, Utc};

    fn order_item(total_cents: i64) -> OrderItem {
        OrderItem {
            id: "i".to_string(),
            order_id: "o1".to_string(),
            item_id: None,
            item_name: "Flyers".to_string(),
            category_id: None,
            category_name: None,
            quantity: 1,
            unit_price_cents: total_cents,
            total_cents,
            profit_cents: 0,
            labor_cents: 0,
            created_at: Utc::now(),
        }
    }

    fn order_payment(amount_cents: i64) -> OrderPayment {
        OrderPayment {
            id: "p".to_string(),
            order_id: "o1".to_string(),
            amount_cents,
            payment_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            method: PaymentMethod::Cash,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fully_paid_order() {
        let items = vec![order_item(10_000), order_item(5_000)];
        let payments = vec![order_payment(15_000)];

        let totals = compute_order_totals(&items, &payments);
        assert_eq!(totals.total.cents(), 15_000);
        assert_eq!(totals.paid.cents(), 15_000);
        assert_eq!(totals.balance.cents(), 0);
        assert_eq!(totals.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_unpaid_order() {
        let items = vec![order_item(15_000)];

        let totals = compute_order_totals(&items, &[]);
        assert_eq!(totals.payment_status, PaymentStatus::Unpaid);
        assert_eq!(totals.balance.cents(), 15_000);
    }

    #[test]
    fn test_partially_paid_order() {
        let items = vec![order_item(15_000)];
        let payments = vec![order_payment(5_000)];

        let totals = compute_order_totals(&items, &payments);
        assert_eq!(totals.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(totals.balance.cents(), 10_000);
    }

    #[test]
    fn test_empty_order_is_unpaid() {
        let totals = compute_order_totals(&[], &[]);
        assert_eq!(totals.total, Money::zero());
        assert_eq!(totals.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_zero_total_with_payment_is_unpaid() {
        // A payment against an empty order does not flip the status
        let payments = vec![order_payment(5_000)];
        let totals = compute_order_totals(&[], &payments);
        assert_eq!(totals.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_overpaid_order_is_paid_with_negative_balance() {
        let items = vec![order_item(10_000)];
        let payments = vec![order_payment(12_000)];

        let totals = compute_order_totals(&items, &payments);
        assert_eq!(totals.payment_status, PaymentStatus::Paid);
        assert_eq!(totals.balance.cents(), -2_000);
    }

    #[test]
    fn test_idempotence() {
        let items = vec![order_item(7_331), order_item(99)];
        let payments = vec![order_payment(5_000), order_payment(100)];

        let first = compute_order_totals(&items, &payments);
        let second = compute_order_totals(&items, &payments);
        assert_eq!(first, second);
    }

    #[test]
    fn test_purchase_paid_status() {
        let payment = MaterialPayment {
            id: "mp1".to_string(),
            purchase_id: "m1".to_string(),
            amount_cents: 2_500,
            payment_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            method: PaymentMethod::BankTransfer,
            created_at: Utc::now(),
        };

        let (paid, status) = compute_purchase_paid(Money::from_cents(10_000), &[payment]);
        assert_eq!(paid.cents(), 2_500);
        assert_eq!(status, PaymentStatus::PartiallyPaid);

        let (paid, status) = compute_purchase_paid(Money::from_cents(10_000), &[]);
        assert_eq!(paid, Money::zero());
        assert_eq!(status, PaymentStatus::Unpaid);
    }
}

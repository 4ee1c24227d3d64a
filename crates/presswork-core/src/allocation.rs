//! # Allocation Engine
//!
//! Splits an incoming amount of money across ledger accounts according to
//! the configured [`AllocationRule`] set for a source type.
//!
//! ## How Allocation Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Allocation Flow                                     │
//! │                                                                         │
//! │  Order profit of 120.00 arrives (source_type = profit)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Active rules for `profit`:                                            │
//! │    owner draw     50.00%  ──►  60.00                                   │
//! │    reinvestment   30.00%  ──►  36.00                                   │
//! │    tax reserve    15.00%  ──►  18.00                                   │
//! │  (5% intentionally unallocated stays put)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One AccountTransaction per share                                      │
//! │    profit/labor/order_payment ──► credit                               │
//! │    expense                    ──► debit                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant Ownership
//! The ≤100% cap on active rule percentages is enforced when rules are
//! created or updated (see [`check_cap`]), NOT here. Planning blindly
//! trusts whatever rule set it is handed; an inconsistent set produces an
//! over-allocated plan rather than an error.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AccountTransaction, AllocationRule, SourceType, TransactionType};
use crate::ALLOCATION_CAP_BPS;

// =============================================================================
// Allocation Planning
// =============================================================================

/// One computed share of an allocation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationShare {
    pub account_id: String,
    pub rule_id: String,
    pub amount: Money,
}

/// Computes the allocation plan for `amount` over `rules`.
///
/// - Only active rules with a positive percentage participate.
/// - Shares are ordered by percentage descending; ties break on rule id
///   ascending so the ordering is stable across runs.
/// - Each share amount is the rule's percentage of `amount`, rounded
///   half-up to the cent (see [`crate::money::Percent::of`]).
/// - An empty or all-inactive rule set yields an empty plan: allocation
///   with nothing configured is a successful no-op, not an error.
pub fn plan_allocations(amount: Money, rules: &[AllocationRule]) -> Vec<AllocationShare> {
    let mut active: Vec<&AllocationRule> = rules
        .iter()
        .filter(|rule| rule.is_active && rule.percent_bps > 0)
        .collect();

    active.sort_by(|a, b| {
        b.percent_bps
            .cmp(&a.percent_bps)
            .then_with(|| a.id.cmp(&b.id))
    });

    active
        .into_iter()
        .map(|rule| AllocationShare {
            account_id: rule.account_id.clone(),
            rule_id: rule.id.clone(),
            amount: rule.percent().of(amount),
        })
        .collect()
}

/// Sums the active percentage (in bps) configured for a rule set.
pub fn active_percent_total(rules: &[AllocationRule]) -> u32 {
    rules
        .iter()
        .filter(|rule| rule.is_active)
        .map(|rule| rule.percent_bps.max(0) as u32)
        .sum()
}

/// Checks that adding `additional_bps` to the active rules for a source
/// stays within the 100% cap.
///
/// `existing` must already exclude the rule being updated (pass the other
/// rules only); this function has no idea which rule an update targets.
pub fn check_cap(
    source: SourceType,
    existing: &[AllocationRule],
    additional_bps: u32,
) -> CoreResult<()> {
    let attempted = active_percent_total(existing) + additional_bps;
    if attempted > ALLOCATION_CAP_BPS {
        return Err(CoreError::AllocationCapExceeded {
            source_label: source_label(source).to_string(),
            attempted_bps: attempted,
            cap_bps: ALLOCATION_CAP_BPS,
        });
    }
    Ok(())
}

// =============================================================================
// Transaction Building
// =============================================================================

/// Ledger direction for money arriving from a source.
///
/// Incoming profit, labor and order payments credit their destination
/// accounts; expense allocations debit them.
pub fn transaction_kind(source: SourceType) -> TransactionType {
    match source {
        SourceType::Profit | SourceType::Labor | SourceType::OrderPayment => {
            TransactionType::Credit
        }
        SourceType::Expense => TransactionType::Debit,
    }
}

/// Builds the ledger transactions for a computed plan.
///
/// `ids` supplies one pre-generated UUID per share (the core crate does
/// not generate randomness); panics in debug builds if the lengths differ.
pub fn build_transactions(
    shares: &[AllocationShare],
    ids: &[String],
    source: SourceType,
    source_id: Option<&str>,
    description: Option<&str>,
    created_at: DateTime<Utc>,
) -> Vec<AccountTransaction> {
    debug_assert_eq!(shares.len(), ids.len());

    let kind = transaction_kind(source);
    shares
        .iter()
        .zip(ids.iter())
        .map(|(share, id)| AccountTransaction {
            id: id.clone(),
            account_id: share.account_id.clone(),
            amount_cents: share.amount.cents(),
            transaction_type: kind,
            source_type: source,
            source_id: source_id.map(str::to_string),
            description: description.map(str::to_string),
            created_at,
        })
        .collect()
}

fn source_label(source: SourceType) -> &'static str {
    match source {
        SourceType::Profit => "profit",
        SourceType::Labor => "labor",
        SourceType::OrderPayment => "order_payment",
        SourceType::Expense => "expense",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

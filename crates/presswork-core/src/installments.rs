//! # Installment Plan Generator
//!
//! Turns a purchase's outstanding balance into a schedule of equal
//! installments, absorbing rounding drift into the final installment so the
//! plan sums to the balance EXACTLY.
//!
//! ## Residual Absorption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Balance 100.00, 3 monthly installments from 2024-01-01                │
//! │                                                                         │
//! │  per = round(100.00 / 3) = 33.33                                       │
//! │                                                                         │
//! │  #1  2024-01-01   33.33                                                │
//! │  #2  2024-02-01   33.33                                                │
//! │  #3  2024-03-01   33.34   ←  100.00 - 33.33 × 2                        │
//! │                                                                         │
//! │  Σ = 100.00 exactly, regardless of rounding drift                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::{validate_installment_count, validate_positive_amount};

// =============================================================================
// Frequency
// =============================================================================

/// Spacing between consecutive installment due dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InstallmentFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

impl InstallmentFrequency {
    /// Parses a frequency keyword; anything unrecognized falls back to
    /// monthly, matching the tolerant behavior callers rely on for
    /// free-text input.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => InstallmentFrequency::Weekly,
            "biweekly" => InstallmentFrequency::Biweekly,
            "quarterly" => InstallmentFrequency::Quarterly,
            _ => InstallmentFrequency::Monthly,
        }
    }

    /// Returns the due date following `date` at this frequency.
    ///
    /// Month-based steps use calendar months with end-of-month clamping
    /// (Jan 31 + 1 month = Feb 29/28).
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            InstallmentFrequency::Weekly => date + Days::new(7),
            InstallmentFrequency::Biweekly => date + Days::new(14),
            InstallmentFrequency::Monthly => date + Months::new(1),
            InstallmentFrequency::Quarterly => date + Months::new(3),
        }
    }
}

impl Default for InstallmentFrequency {
    fn default() -> Self {
        InstallmentFrequency::Monthly
    }
}

// =============================================================================
// Plan Generation
// =============================================================================

/// One scheduled installment of a generated plan, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstallment {
    /// 1-based, sequential.
    pub installment_number: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// Generates an installment plan for an outstanding balance.
///
/// - Installments 1..N-1 each get the balance divided by N, rounded
///   half-up to the cent.
/// - Installment N gets the remainder, guaranteeing `Σ amounts ==
///   outstanding` exactly.
/// - Due dates start at `first_due` and step by `frequency`.
///
/// ## Errors
/// VALIDATION if `count` is zero or above the plan cap, or if
/// `outstanding` is not positive. Nothing is computed on failure.
pub fn generate_plan(
    outstanding: Money,
    count: u32,
    frequency: InstallmentFrequency,
    first_due: NaiveDate,
) -> CoreResult<Vec<PlannedInstallment>> {
    validate_installment_count(count)?;
    validate_positive_amount("outstanding_balance", outstanding.cents())?;

    let per_installment = outstanding.divide_round(count as i64);

    let mut plan = Vec::with_capacity(count as usize);
    let mut due_date = first_due;

    for number in 1..=count {
        let amount = if number == count {
            // Final installment absorbs the rounding residual.
            outstanding - per_installment * (count as i64 - 1)
        } else {
            per_installment
        };

        plan.push(PlannedInstallment {
            installment_number: number,
            amount,
            due_date,
        });

        due_date = frequency.advance(due_date);
    }

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================

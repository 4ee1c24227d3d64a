//! # Profit/Labor Calculator
//!
//! Computes the profit and labor amounts for an order line item from the
//! shop's profit settings, with per-item and per-category overrides.
//!
//! ## Override Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Percentage resolution for a line item                                  │
//! │                                                                         │
//! │  1. item override matched by item id                                   │
//! │  2. item override matched by item name                                 │
//! │  3. category override matched by category id                           │
//! │  4. category override matched by category name                         │
//! │  5. global default percentages                                         │
//! │                                                                         │
//! │  The first strategy that matches wins. The order is a fixed list of    │
//! │  tagged strategies (LOOKUP_ORDER), not nested conditionals, so each    │
//! │  rung is testable in isolation.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Settings are loaded once per operation and passed in explicitly; there
//! is no ambient global configuration.

use serde::{Deserialize, Serialize};

use crate::money::{Money, Percent};
use crate::types::OrderItem;

// =============================================================================
// Settings
// =============================================================================

/// Which base amount the percentages apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CalculationBasis {
    /// Percentages apply to the per-unit price; results are per-unit.
    UnitPrice,
    /// Percentages apply to the line total; results are line amounts.
    TotalCost,
}

impl Default for CalculationBasis {
    fn default() -> Self {
        CalculationBasis::UnitPrice
    }
}

/// What an override targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OverrideTarget {
    Item,
    Category,
}

/// A per-item or per-category percentage override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProfitOverride {
    pub id: String,
    pub target: OverrideTarget,
    /// Catalog id of the item/category, when the override was created from
    /// the catalog. Name matching is the fallback for free-text lines.
    pub target_id: Option<String>,
    pub name: String,
    pub profit_bps: i64,
    /// None inherits the global labor percentage.
    pub labor_bps: Option<i64>,
}

/// Shop-wide profit configuration with overrides, assembled by the caller
/// for each operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitSettings {
    pub enabled: bool,
    pub calculation_basis: CalculationBasis,
    pub default_profit_bps: i64,
    pub include_labor: bool,
    pub labor_bps: i64,
    pub overrides: Vec<ProfitOverride>,
}

impl Default for ProfitSettings {
    fn default() -> Self {
        ProfitSettings {
            enabled: true,
            calculation_basis: CalculationBasis::UnitPrice,
            default_profit_bps: 3000,
            include_labor: false,
            labor_bps: 0,
            overrides: Vec::new(),
        }
    }
}

// =============================================================================
// Override Lookup
// =============================================================================

/// One rung of the override resolution ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    ItemById,
    ItemByName,
    CategoryById,
    CategoryByName,
}

/// Resolution order; the first matching strategy wins.
pub const LOOKUP_ORDER: [LookupStrategy; 4] = [
    LookupStrategy::ItemById,
    LookupStrategy::ItemByName,
    LookupStrategy::CategoryById,
    LookupStrategy::CategoryByName,
];

impl LookupStrategy {
    /// Whether `candidate` matches `item` under this strategy.
    fn matches(&self, candidate: &ProfitOverride, item: &OrderItem) -> bool {
        match self {
            LookupStrategy::ItemById => {
                candidate.target == OverrideTarget::Item
                    && candidate.target_id.is_some()
                    && candidate.target_id == item.item_id
            }
            LookupStrategy::ItemByName => {
                candidate.target == OverrideTarget::Item
                    && candidate.name.eq_ignore_ascii_case(&item.item_name)
            }
            LookupStrategy::CategoryById => {
                candidate.target == OverrideTarget::Category
                    && candidate.target_id.is_some()
                    && candidate.target_id == item.category_id
            }
            LookupStrategy::CategoryByName => {
                candidate.target == OverrideTarget::Category
                    && item
                        .category_name
                        .as_deref()
                        .is_some_and(|name| candidate.name.eq_ignore_ascii_case(name))
            }
        }
    }
}

/// Finds the override applying to `item`, walking [`LOOKUP_ORDER`].
pub fn resolve_override<'a>(
    item: &OrderItem,
    overrides: &'a [ProfitOverride],
) -> Option<&'a ProfitOverride> {
    LOOKUP_ORDER
        .iter()
        .find_map(|strategy| overrides.iter().find(|o| strategy.matches(o, item)))
}

// =============================================================================
// Calculation
// =============================================================================

/// Computed profit and labor for a line item.
///
/// Under the `unit_price` basis both values are PER-UNIT; under
/// `total_cost` they cover the whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfitBreakdown {
    pub profit: Money,
    pub labor: Money,
}

impl ProfitBreakdown {
    /// Amounts to hand to the allocation engine for this line.
    ///
    /// Per-unit amounts (unit_price basis) scale by quantity; total_cost
    /// amounts already cover the line.
    pub fn allocation_amounts(&self, quantity: i64, basis: CalculationBasis) -> (Money, Money) {
        match basis {
            CalculationBasis::UnitPrice => (
                self.profit.multiply_quantity(quantity),
                self.labor.multiply_quantity(quantity),
            ),
            CalculationBasis::TotalCost => (self.profit, self.labor),
        }
    }
}

/// Computes profit and labor for an order line item.
///
/// - Disabled settings short-circuit to zero/zero.
/// - Profit is the resolved percentage of the base amount (unit price or
///   line total per `calculation_basis`).
/// - Labor is the labor percentage of the REMAINDER after profit (the
///   production-cost share), zeroed when `include_labor` is off.
///
/// ## Example
/// ```rust
/// use presswork_core::profit::{compute_profit_and_labor, ProfitSettings};
/// # use presswork_core::types::OrderItem;
/// # use chrono::Utc;
/// let settings = ProfitSettings {
///     default_profit_bps: 3000,
///     ..ProfitSettings::default()
/// };
/// # let item = OrderItem {
/// #     id: "i1".into(), order_id: "o1".into(), item_id: None,
/// #     item_name: "Flyers".into(), category_id: None, category_name: None,
/// #     quantity: 1, unit_price_cents: 10_000, total_cents: 10_000,
/// #     profit_cents: 0, labor_cents: 0, created_at: Utc::now(),
/// # };
/// // 30% of a 100.00 unit price
/// assert_eq!(compute_profit_and_labor(&item, &settings).profit.cents(), 3000);
/// ```
pub fn compute_profit_and_labor(item: &OrderItem, settings: &ProfitSettings) -> ProfitBreakdown {
    if !settings.enabled {
        return ProfitBreakdown::default();
    }

    let matched = resolve_override(item, &settings.overrides);
    let profit_bps = matched.map_or(settings.default_profit_bps, |o| o.profit_bps);
    let labor_bps = matched
        .and_then(|o| o.labor_bps)
        .unwrap_or(settings.labor_bps);

    let profit_pct = Percent::from_bps(profit_bps.max(0) as u32);
    let labor_pct = Percent::from_bps(labor_bps.max(0) as u32);

    let base = match settings.calculation_basis {
        CalculationBasis::UnitPrice => item.unit_price(),
        CalculationBasis::TotalCost => item.total(),
    };

    let profit = profit_pct.of(base);
    let labor = if settings.include_labor {
        labor_pct.of(base - profit)
    } else {
        Money::zero()
    };

    ProfitBreakdown { profit, labor }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Order Service
//!
//! Orchestrates orders, line items and payments: every item or payment
//! mutation recomputes the order's derived money fields, and the optional
//! allocation follow-ups hand profit, labor and payment amounts to the
//! allocation engine.
//!
//! ## Totals Recompute Is Best-Effort
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_payment ──► INSERT payment ──► recompute_totals                   │
//! │                       │                   │                             │
//! │                       │                   ├── Done(totals)              │
//! │                       │                   └── Failed(msg)  ← logged,    │
//! │                       │                        payment KEPT             │
//! │                       ▼                                                 │
//! │  The mutation never rolls back because the recompute failed.           │
//! │  Callers receive the BestEffort value and may inspect or ignore it;    │
//! │  a later mutation (or a reconcile pass) heals the stale totals.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The read-then-write recompute is not wrapped in a store transaction;
//! two concurrent payment writers can race to a stale total. The reconcile
//! pass exists to settle such drift.

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::allocation_service::AllocationService;
use presswork_core::profit::{compute_profit_and_labor, ProfitBreakdown};
use presswork_core::totals::{compute_order_totals, OrderTotals};
use presswork_core::validation::{
    validate_name, validate_non_negative_amount, validate_positive_amount, validate_quantity,
};
use presswork_core::{
    BestEffort, Order, OrderItem, OrderPayment, OrderStatus, PaymentMethod, PaymentStatus,
    SourceType,
};
use presswork_db::Database;

/// A new line item, before pricing and profit computation.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub item_id: Option<String>,
    pub item_name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Service for order orchestration.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    allocation: AllocationService,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        let allocation = AllocationService::new(db.clone());
        OrderService { db, allocation }
    }

    /// Creates an order with zero totals.
    pub async fn create_order(
        &self,
        client_id: &str,
        order_date: NaiveDate,
        notes: Option<String>,
    ) -> Result<Order, ApiError> {
        self.db
            .clients()
            .get_by_id(client_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Client", client_id))?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            order_date,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            total_cents: 0,
            paid_cents: 0,
            balance_cents: 0,
            notes,
            created_at: now,
            updated_at: now,
        };

        self.db.orders().insert_order(&order).await?;
        info!(order_id = %order.id, client_id = %client_id, "Order created");

        Ok(order)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Adds a line item: prices the line, computes and stores profit/labor
    /// from the current settings, then recomputes the order totals.
    ///
    /// Profit and labor are computed ONCE here; later settings changes do
    /// not rewrite stored lines.
    pub async fn add_item(
        &self,
        order_id: &str,
        new_item: NewOrderItem,
    ) -> Result<(OrderItem, BestEffort<OrderTotals>), ApiError> {
        validate_name("item_name", &new_item.item_name)
            .map_err(presswork_core::CoreError::from)?;
        validate_quantity(new_item.quantity).map_err(presswork_core::CoreError::from)?;
        validate_non_negative_amount("unit_price", new_item.unit_price_cents)
            .map_err(presswork_core::CoreError::from)?;

        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        let settings = self.db.profit_settings().load().await?;

        let mut item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            item_id: new_item.item_id,
            item_name: new_item.item_name.trim().to_string(),
            category_id: new_item.category_id,
            category_name: new_item.category_name,
            quantity: new_item.quantity,
            unit_price_cents: new_item.unit_price_cents,
            total_cents: new_item.unit_price_cents * new_item.quantity,
            profit_cents: 0,
            labor_cents: 0,
            created_at: Utc::now(),
        };

        let breakdown = compute_profit_and_labor(&item, &settings);
        item.profit_cents = breakdown.profit.cents();
        item.labor_cents = breakdown.labor.cents();

        self.db.orders().add_item(&item).await?;
        let totals = self.recompute_totals(order_id).await;

        info!(
            order_id = %order_id,
            item = %item.item_name,
            total = item.total_cents,
            profit = item.profit_cents,
            "Order item added"
        );

        Ok((item, totals))
    }

    /// Updates a line item's quantity and unit price; profit/labor and the
    /// line total are recomputed from the current settings.
    pub async fn update_item(
        &self,
        item_id: &str,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Result<(OrderItem, BestEffort<OrderTotals>), ApiError> {
        validate_quantity(quantity).map_err(presswork_core::CoreError::from)?;
        validate_non_negative_amount("unit_price", unit_price_cents)
            .map_err(presswork_core::CoreError::from)?;

        let mut item = self
            .db
            .orders()
            .get_item(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found("OrderItem", item_id))?;

        item.quantity = quantity;
        item.unit_price_cents = unit_price_cents;
        item.total_cents = unit_price_cents * quantity;

        let settings = self.db.profit_settings().load().await?;
        let breakdown = compute_profit_and_labor(&item, &settings);
        item.profit_cents = breakdown.profit.cents();
        item.labor_cents = breakdown.labor.cents();

        self.db.orders().update_item(&item).await?;
        let totals = self.recompute_totals(&item.order_id).await;

        Ok((item, totals))
    }

    /// Deletes a line item and recomputes the order totals.
    pub async fn delete_item(&self, item_id: &str) -> Result<BestEffort<OrderTotals>, ApiError> {
        let item = self
            .db
            .orders()
            .get_item(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found("OrderItem", item_id))?;

        self.db.orders().delete_item(item_id).await?;
        Ok(self.recompute_totals(&item.order_id).await)
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a payment and recomputes the order totals.
    pub async fn add_payment(
        &self,
        order_id: &str,
        amount_cents: i64,
        payment_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<(OrderPayment, BestEffort<OrderTotals>), ApiError> {
        validate_positive_amount("amount", amount_cents)
            .map_err(presswork_core::CoreError::from)?;

        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        let payment = OrderPayment {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            amount_cents,
            payment_date,
            method,
            created_at: Utc::now(),
        };

        self.db.orders().add_payment(&payment).await?;
        let totals = self.recompute_totals(order_id).await;

        info!(order_id = %order_id, amount = amount_cents, "Order payment recorded");

        Ok((payment, totals))
    }

    /// Deletes a payment and recomputes the order totals.
    pub async fn delete_payment(
        &self,
        payment_id: &str,
    ) -> Result<BestEffort<OrderTotals>, ApiError> {
        let payment = self
            .db
            .orders()
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| ApiError::not_found("OrderPayment", payment_id))?;

        self.db.orders().delete_payment(payment_id).await?;
        Ok(self.recompute_totals(&payment.order_id).await)
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Recomputes and persists an order's derived money fields.
    ///
    /// Never fails its caller: any read or write error is logged and
    /// reported through the returned [`BestEffort`]. `balance_cents` is a
    /// generated column and is not written.
    pub async fn recompute_totals(&self, order_id: &str) -> BestEffort<OrderTotals> {
        let orders = self.db.orders();
        let (items, payments) =
            tokio::join!(orders.get_items(order_id), orders.get_payments(order_id));

        let items = match items {
            Ok(items) => items,
            Err(e) => {
                error!(order_id = %order_id, error = %e, "Totals recompute failed reading items");
                return BestEffort::Failed(e.to_string());
            }
        };
        let payments = match payments {
            Ok(payments) => payments,
            Err(e) => {
                error!(order_id = %order_id, error = %e, "Totals recompute failed reading payments");
                return BestEffort::Failed(e.to_string());
            }
        };

        let totals = compute_order_totals(&items, &payments);
        debug!(
            order_id = %order_id,
            total = totals.total.cents(),
            paid = totals.paid.cents(),
            status = ?totals.payment_status,
            "Order totals recomputed"
        );

        match orders
            .update_totals(
                order_id,
                totals.total.cents(),
                totals.paid.cents(),
                totals.payment_status,
            )
            .await
        {
            Ok(()) => BestEffort::Done(totals),
            Err(e) => {
                error!(order_id = %order_id, error = %e, "Totals recompute failed writing order");
                BestEffort::Failed(e.to_string())
            }
        }
    }

    // =========================================================================
    // Allocation Follow-Ups
    // =========================================================================

    /// Allocates a line item's profit and labor to the configured accounts.
    ///
    /// Stored per-unit amounts (unit_price basis) are scaled by quantity
    /// before allocation; total_cost amounts already cover the line. Zero
    /// amounts are skipped, so a shop without labor tracking records no
    /// empty labor entries.
    pub async fn allocate_item_profit(&self, item_id: &str) -> Result<(), ApiError> {
        let item = self
            .db
            .orders()
            .get_item(item_id)
            .await?
            .ok_or_else(|| ApiError::not_found("OrderItem", item_id))?;

        let settings = self.db.profit_settings().load().await?;
        let breakdown = ProfitBreakdown {
            profit: item.profit(),
            labor: item.labor(),
        };
        let (profit, labor) =
            breakdown.allocation_amounts(item.quantity, settings.calculation_basis);

        if profit.is_positive() {
            self.allocation
                .allocate(
                    profit,
                    SourceType::Profit,
                    Some(&item.order_id),
                    Some(&format!("Profit on {}", item.item_name)),
                )
                .await?;
        }
        if labor.is_positive() {
            self.allocation
                .allocate(
                    labor,
                    SourceType::Labor,
                    Some(&item.order_id),
                    Some(&format!("Labor on {}", item.item_name)),
                )
                .await?;
        }

        Ok(())
    }

    /// Allocates an order payment to the configured accounts.
    pub async fn allocate_payment(&self, payment_id: &str) -> Result<(), ApiError> {
        let payment = self
            .db
            .orders()
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| ApiError::not_found("OrderPayment", payment_id))?;

        self.allocation
            .allocate(
                payment.amount(),
                SourceType::OrderPayment,
                Some(&payment.order_id),
                Some("Order payment"),
            )
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use presswork_core::profit::ProfitSettings;
    use presswork_core::{AccountType, Client};
    use presswork_db::DbConfig;

    async fn setup() -> (OrderService, Order) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: "Mehran Traders".to_string(),
            phone: None,
            email: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await.unwrap();

        let svc = OrderService::new(db);
        let order = svc
            .create_order(&client.id, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), None)
            .await
            .unwrap();
        (svc, order)
    }

    fn flyers(quantity: i64, unit_price_cents: i64) -> NewOrderItem {
        NewOrderItem {
            item_id: None,
            item_name: "Flyers A5".to_string(),
            category_id: None,
            category_name: None,
            quantity,
            unit_price_cents,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_payment_status_walks_the_tri_state() {
        let (svc, order) = setup().await;

        // Items totaling 150.00
        svc.add_item(&order.id, flyers(1, 10_000)).await.unwrap();
        svc.add_item(&order.id, flyers(1, 5_000)).await.unwrap();

        let loaded = svc.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_cents, 15_000);
        assert_eq!(loaded.payment_status, PaymentStatus::Unpaid);

        // Pay 50.00 → partially paid
        svc.add_payment(&order.id, 5_000, date(2024, 5, 2), PaymentMethod::Cash)
            .await
            .unwrap();
        let loaded = svc.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(loaded.balance_cents, 10_000);

        // Pay the rest → paid, zero balance
        let (_, totals) = svc
            .add_payment(&order.id, 10_000, date(2024, 5, 3), PaymentMethod::BankTransfer)
            .await
            .unwrap();
        assert!(totals.is_done());
        let loaded = svc.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_status, PaymentStatus::Paid);
        assert_eq!(loaded.balance_cents, 0);

        // Deleting a payment walks back to partially paid
        let payments = svc.db.orders().get_payments(&order.id).await.unwrap();
        svc.delete_payment(&payments[0].id).await.unwrap();
        let loaded = svc.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_status, PaymentStatus::PartiallyPaid);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let (svc, order) = setup().await;
        svc.add_item(&order.id, flyers(3, 2_500)).await.unwrap();

        let first = svc.recompute_totals(&order.id).await.ok().unwrap();
        let second = svc.recompute_totals(&order.id).await.ok().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_recompute_on_missing_order_is_best_effort() {
        let (svc, _) = setup().await;

        // No panic, no Err: the failure is carried in the variant
        let outcome = svc.recompute_totals("no-such-order").await;
        assert!(!outcome.is_done());
        assert!(outcome.failure().is_some());
    }

    #[tokio::test]
    async fn test_item_profit_computed_at_creation() {
        let (svc, order) = setup().await;

        // 30% default on unit price: 25.00 → 7.50 per unit
        let (item, _) = svc.add_item(&order.id, flyers(4, 2_500)).await.unwrap();
        assert_eq!(item.profit_cents, 750);
        assert_eq!(item.labor_cents, 0);
        assert_eq!(item.total_cents, 10_000);

        // Flipping settings off afterwards does not rewrite the stored line
        svc.db
            .profit_settings()
            .save(&ProfitSettings {
                enabled: false,
                ..ProfitSettings::default()
            })
            .await
            .unwrap();
        let loaded = svc.db.orders().get_item(&item.id).await.unwrap().unwrap();
        assert_eq!(loaded.profit_cents, 750);

        // But an update recomputes against the now-disabled settings
        let (updated, _) = svc.update_item(&item.id, 4, 2_500).await.unwrap();
        assert_eq!(updated.profit_cents, 0);
    }

    #[tokio::test]
    async fn test_allocate_item_profit_scales_by_quantity() {
        let (svc, order) = setup().await;

        let account = svc
            .allocation
            .create_account("Owner Draw", AccountType::Profit)
            .await
            .unwrap();
        svc.allocation
            .create_rule(SourceType::Profit, &account.id, 10_000, true)
            .await
            .unwrap();

        // 5 units at 20.00, 30% profit → 6.00/unit, 30.00 allocated
        let (item, _) = svc.add_item(&order.id, flyers(5, 2_000)).await.unwrap();
        svc.allocate_item_profit(&item.id).await.unwrap();

        assert_eq!(
            svc.db.accounts().account_balance(&account.id).await.unwrap(),
            3_000
        );
    }

    #[tokio::test]
    async fn test_allocate_payment() {
        let (svc, order) = setup().await;

        let account = svc
            .allocation
            .create_account("Operating", AccountType::Revenue)
            .await
            .unwrap();
        svc.allocation
            .create_rule(SourceType::OrderPayment, &account.id, 2_000, true)
            .await
            .unwrap();

        svc.add_item(&order.id, flyers(1, 50_000)).await.unwrap();
        let (payment, _) = svc
            .add_payment(&order.id, 50_000, date(2024, 5, 2), PaymentMethod::Cash)
            .await
            .unwrap();

        // 20% of the 500.00 payment
        svc.allocate_payment(&payment.id).await.unwrap();
        assert_eq!(
            svc.db.accounts().account_balance(&account.id).await.unwrap(),
            10_000
        );
    }

    #[tokio::test]
    async fn test_add_item_rejects_bad_input() {
        let (svc, order) = setup().await;

        let err = svc.add_item(&order.id, flyers(0, 1_000)).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let err = svc.add_item(&order.id, flyers(1, -5)).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);

        let err = svc
            .add_item("no-such-order", flyers(1, 1_000))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }
}

//! # Order Repository
//!
//! Database operations for orders, line items and payments.
//!
//! ## Order Money Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE                                                              │
//! │     └── insert_order() → Order { total: 0, paid: 0, unpaid }           │
//! │                                                                         │
//! │  2. ITEMS / PAYMENTS                                                    │
//! │     └── add_item() / delete_item() / add_payment() / delete_payment()  │
//! │         Every one of these is followed by a totals recompute           │
//! │         (OrderService::recompute_totals → update_totals()).            │
//! │                                                                         │
//! │  3. TOTALS                                                              │
//! │     └── update_totals() writes total/paid/status.                      │
//! │         balance_cents is a generated column: NEVER written.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use presswork_core::{Order, OrderItem, OrderPayment, PaymentStatus};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order. Totals start at zero; `balance_cents` is generated
    /// by the store and excluded from the column list.
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, client_id = %order.client_id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, client_id, order_date, status, payment_status,
                total_cents, paid_cents, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order.id)
        .bind(&order.client_id)
        .bind(order.order_date)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.total_cents)
        .bind(order.paid_cents)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, client_id, order_date, status, payment_status,
                   total_cents, paid_cents, balance_cents, notes,
                   created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Adds a line item to an order.
    pub async fn add_item(&self, item: &OrderItem) -> DbResult<()> {
        debug!(order_id = %item.order_id, item = %item.item_name, "Adding order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, item_id, item_name, category_id, category_name,
                quantity, unit_price_cents, total_cents,
                profit_cents, labor_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(&item.category_id)
        .bind(&item.category_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.total_cents)
        .bind(item.profit_cents)
        .bind(item.labor_cents)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a line item's quantity, pricing and computed amounts.
    pub async fn update_item(&self, item: &OrderItem) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE order_items SET
                quantity = ?2,
                unit_price_cents = ?3,
                total_cents = ?4,
                profit_cents = ?5,
                labor_cents = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.total_cents)
        .bind(item.profit_cents)
        .bind(item.labor_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OrderItem", &item.id));
        }

        Ok(())
    }

    /// Deletes a line item.
    pub async fn delete_item(&self, item_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = ?1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OrderItem", item_id));
        }

        Ok(())
    }

    /// Gets a line item by ID.
    pub async fn get_item(&self, item_id: &str) -> DbResult<Option<OrderItem>> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, item_id, item_name, category_id, category_name,
                   quantity, unit_price_cents, total_cents,
                   profit_cents, labor_cents, created_at
            FROM order_items
            WHERE id = ?1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets all line items for an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, item_id, item_name, category_id, category_name,
                   quantity, unit_price_cents, total_cents,
                   profit_cents, labor_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Records a payment for an order.
    pub async fn add_payment(&self, payment: &OrderPayment) -> DbResult<()> {
        debug!(order_id = %payment.order_id, amount = payment.amount_cents, "Recording order payment");

        sqlx::query(
            r#"
            INSERT INTO order_payments (
                id, order_id, amount_cents, payment_date, method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.amount_cents)
        .bind(payment.payment_date)
        .bind(payment.method)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, payment_id: &str) -> DbResult<Option<OrderPayment>> {
        let payment = sqlx::query_as::<_, OrderPayment>(
            r#"
            SELECT id, order_id, amount_cents, payment_date, method, created_at
            FROM order_payments
            WHERE id = ?1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Deletes a payment.
    pub async fn delete_payment(&self, payment_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM order_payments WHERE id = ?1")
            .bind(payment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OrderPayment", payment_id));
        }

        Ok(())
    }

    /// Gets all payments for an order.
    pub async fn get_payments(&self, order_id: &str) -> DbResult<Vec<OrderPayment>> {
        let payments = sqlx::query_as::<_, OrderPayment>(
            r#"
            SELECT id, order_id, amount_cents, payment_date, method, created_at
            FROM order_payments
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lists every order id, oldest first. Used by the reconcile pass.
    pub async fn list_ids(&self) -> DbResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM orders ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Writes recomputed totals. `balance_cents` is generated from these
    /// two columns and deliberately omitted.
    pub async fn update_totals(
        &self,
        order_id: &str,
        total_cents: i64,
        paid_cents: i64,
        payment_status: PaymentStatus,
    ) -> DbResult<()> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                total_cents = ?2,
                paid_cents = ?3,
                payment_status = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(total_cents)
        .bind(paid_cents)
        .bind(payment_status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{NaiveDate, Utc};
    use presswork_core::{Client, OrderStatus, PaymentMethod};

    async fn seed_order(db: &Database) -> Order {
        let now = Utc::now();
        let client = Client {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Mehran Traders".to_string(),
            phone: None,
            email: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await.unwrap();

        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client.id,
            order_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: OrderStatus::Pending,
            payment_status: presswork_core::PaymentStatus::Unpaid,
            total_cents: 0,
            paid_cents: 0,
            balance_cents: 0,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        db.orders().insert_order(&order).await.unwrap();
        order
    }

    fn item(order_id: &str, total_cents: i64) -> OrderItem {
        OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            item_id: None,
            item_name: "Flyers A5".to_string(),
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

    #[tokio::test]
    async fn test_balance_is_generated_from_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;
        let repo = db.orders();

        repo.update_totals(&order.id, 15_000, 5_000, presswork_core::PaymentStatus::PartiallyPaid)
            .await
            .unwrap();

        let loaded = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_cents, 15_000);
        assert_eq!(loaded.paid_cents, 5_000);
        // Never written directly; the store derives it
        assert_eq!(loaded.balance_cents, 10_000);
    }

    #[tokio::test]
    async fn test_item_and_payment_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;
        let repo = db.orders();

        repo.add_item(&item(&order.id, 10_000)).await.unwrap();
        repo.add_item(&item(&order.id, 5_000)).await.unwrap();

        let payment = OrderPayment {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            amount_cents: 7_500,
            payment_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            method: PaymentMethod::Cash,
            created_at: Utc::now(),
        };
        repo.add_payment(&payment).await.unwrap();

        assert_eq!(repo.get_items(&order.id).await.unwrap().len(), 2);
        assert_eq!(repo.get_payments(&order.id).await.unwrap().len(), 1);

        repo.delete_payment(&payment.id).await.unwrap();
        assert!(repo.get_payments(&order.id).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete_payment(&payment.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}

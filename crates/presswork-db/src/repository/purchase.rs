//! # Purchase Repository
//!
//! Database operations for material purchases, payments, installment plans
//! and notes. Children cascade when the purchase is deleted.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use presswork_core::{
    MaterialInstallment, MaterialNote, MaterialPayment, MaterialPurchase, PaymentStatus,
};

/// Repository for material purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Inserts a purchase.
    pub async fn insert(&self, purchase: &MaterialPurchase) -> DbResult<()> {
        debug!(id = %purchase.id, supplier = %purchase.supplier_name, "Inserting purchase");

        sqlx::query(
            r#"
            INSERT INTO material_purchases (
                id, supplier_name, material_name, purchase_date,
                quantity, unit_price_cents, total_cents, paid_cents,
                payment_status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_name)
        .bind(&purchase.material_name)
        .bind(purchase.purchase_date)
        .bind(purchase.quantity)
        .bind(purchase.unit_price_cents)
        .bind(purchase.total_cents)
        .bind(purchase.paid_cents)
        .bind(purchase.payment_status)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MaterialPurchase>> {
        let purchase = sqlx::query_as::<_, MaterialPurchase>(
            r#"
            SELECT id, supplier_name, material_name, purchase_date,
                   quantity, unit_price_cents, total_cents, paid_cents,
                   payment_status, created_at, updated_at
            FROM material_purchases
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Deletes a purchase; payments, installments and notes cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM material_purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MaterialPurchase", id));
        }

        Ok(())
    }

    /// Records a payment towards a purchase.
    pub async fn add_payment(&self, payment: &MaterialPayment) -> DbResult<()> {
        debug!(purchase_id = %payment.purchase_id, amount = payment.amount_cents, "Recording purchase payment");

        sqlx::query(
            r#"
            INSERT INTO material_payments (
                id, purchase_id, amount_cents, payment_date, method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.purchase_id)
        .bind(payment.amount_cents)
        .bind(payment.payment_date)
        .bind(payment.method)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, payment_id: &str) -> DbResult<Option<MaterialPayment>> {
        let payment = sqlx::query_as::<_, MaterialPayment>(
            r#"
            SELECT id, purchase_id, amount_cents, payment_date, method, created_at
            FROM material_payments
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
        let result = sqlx::query("DELETE FROM material_payments WHERE id = ?1")
            .bind(payment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MaterialPayment", payment_id));
        }

        Ok(())
    }

    /// Gets all payments for a purchase.
    pub async fn get_payments(&self, purchase_id: &str) -> DbResult<Vec<MaterialPayment>> {
        let payments = sqlx::query_as::<_, MaterialPayment>(
            r#"
            SELECT id, purchase_id, amount_cents, payment_date, method, created_at
            FROM material_payments
            WHERE purchase_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Writes a recomputed paid amount and status.
    pub async fn update_paid(
        &self,
        purchase_id: &str,
        paid_cents: i64,
        payment_status: PaymentStatus,
    ) -> DbResult<()> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE material_purchases SET
                paid_cents = ?2,
                payment_status = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(purchase_id)
        .bind(paid_cents)
        .bind(payment_status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MaterialPurchase", purchase_id));
        }

        Ok(())
    }

    /// Replaces the purchase's installment plan with a new batch, in one
    /// SQL transaction: the old plan is cleared and the new one inserted,
    /// or neither happens.
    pub async fn replace_installments(
        &self,
        purchase_id: &str,
        installments: &[MaterialInstallment],
    ) -> DbResult<()> {
        debug!(purchase_id = %purchase_id, count = installments.len(), "Replacing installment plan");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM material_installments WHERE purchase_id = ?1")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        for installment in installments {
            sqlx::query(
                r#"
                INSERT INTO material_installments (
                    id, purchase_id, installment_number, amount_cents,
                    due_date, status, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&installment.id)
            .bind(&installment.purchase_id)
            .bind(installment.installment_number)
            .bind(installment.amount_cents)
            .bind(installment.due_date)
            .bind(installment.status)
            .bind(installment.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets the installment plan for a purchase, in plan order.
    pub async fn get_installments(&self, purchase_id: &str) -> DbResult<Vec<MaterialInstallment>> {
        let installments = sqlx::query_as::<_, MaterialInstallment>(
            r#"
            SELECT id, purchase_id, installment_number, amount_cents,
                   due_date, status, created_at
            FROM material_installments
            WHERE purchase_id = ?1
            ORDER BY installment_number
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    /// Attaches a note to a purchase.
    pub async fn add_note(&self, note: &MaterialNote) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO material_notes (id, purchase_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&note.id)
        .bind(&note.purchase_id)
        .bind(&note.body)
        .bind(note.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets all notes for a purchase, newest first.
    pub async fn get_notes(&self, purchase_id: &str) -> DbResult<Vec<MaterialNote>> {
        let notes = sqlx::query_as::<_, MaterialNote>(
            r#"
            SELECT id, purchase_id, body, created_at
            FROM material_notes
            WHERE purchase_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
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
    use presswork_core::InstallmentStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn purchase() -> MaterialPurchase {
        let now = Utc::now();
        MaterialPurchase {
            id: uuid::Uuid::new_v4().to_string(),
            supplier_name: "Karachi Paper Mart".to_string(),
            material_name: "80gsm offset".to_string(),
            purchase_date: date(2024, 3, 1),
            quantity: 100,
            unit_price_cents: 1_000,
            total_cents: 100_000,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    fn installment(purchase_id: &str, number: i64, cents: i64, due: NaiveDate) -> MaterialInstallment {
        MaterialInstallment {
            id: uuid::Uuid::new_v4().to_string(),
            purchase_id: purchase_id.to_string(),
            installment_number: number,
            amount_cents: cents,
            due_date: due,
            status: InstallmentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_replace_installments_swaps_plan() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.purchases();

        let p = purchase();
        repo.insert(&p).await.unwrap();

        repo.replace_installments(
            &p.id,
            &[
                installment(&p.id, 1, 50_000, date(2024, 4, 1)),
                installment(&p.id, 2, 50_000, date(2024, 5, 1)),
            ],
        )
        .await
        .unwrap();

        // Regenerating with a different shape replaces, not appends
        repo.replace_installments(
            &p.id,
            &[
                installment(&p.id, 1, 33_330, date(2024, 4, 1)),
                installment(&p.id, 2, 33_330, date(2024, 5, 1)),
                installment(&p.id, 3, 33_340, date(2024, 6, 1)),
            ],
        )
        .await
        .unwrap();

        let plan = repo.get_installments(&p.id).await.unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.iter().map(|i| i.installment_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        let total: i64 = plan.iter().map(|i| i.amount_cents).sum();
        assert_eq!(total, 100_000);
    }

    #[tokio::test]
    async fn test_delete_purchase_cascades_children() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.purchases();

        let p = purchase();
        repo.insert(&p).await.unwrap();

        repo.add_payment(&MaterialPayment {
            id: uuid::Uuid::new_v4().to_string(),
            purchase_id: p.id.clone(),
            amount_cents: 10_000,
            payment_date: date(2024, 3, 5),
            method: presswork_core::PaymentMethod::Cash,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
        repo.replace_installments(&p.id, &[installment(&p.id, 1, 90_000, date(2024, 4, 1))])
            .await
            .unwrap();
        repo.add_note(&MaterialNote {
            id: uuid::Uuid::new_v4().to_string(),
            purchase_id: p.id.clone(),
            body: "Deliver before Eid".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        repo.delete(&p.id).await.unwrap();

        assert!(repo.get_by_id(&p.id).await.unwrap().is_none());
        assert!(repo.get_payments(&p.id).await.unwrap().is_empty());
        assert!(repo.get_installments(&p.id).await.unwrap().is_empty());
        assert!(repo.get_notes(&p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_paid_and_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.purchases();

        let p = purchase();
        repo.insert(&p).await.unwrap();

        repo.update_paid(&p.id, 40_000, PaymentStatus::PartiallyPaid)
            .await
            .unwrap();

        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.paid_cents, 40_000);
        assert_eq!(loaded.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(loaded.outstanding().cents(), 60_000);
    }
}

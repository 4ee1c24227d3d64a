//! # Purchase Service
//!
//! Material purchase orchestration: supplier payments with payment-status
//! recompute, installment plan generation over the outstanding balance,
//! and purchase notes.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use presswork_core::installments::{generate_plan, InstallmentFrequency};
use presswork_core::totals::compute_purchase_paid;
use presswork_core::validation::{validate_name, validate_positive_amount, validate_quantity};
use presswork_core::{
    InstallmentStatus, MaterialInstallment, MaterialNote, MaterialPayment, MaterialPurchase,
    PaymentMethod, PaymentStatus,
};
use presswork_db::Database;

/// Service for material purchase orchestration.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    db: Database,
}

impl PurchaseService {
    pub fn new(db: Database) -> Self {
        PurchaseService { db }
    }

    /// Records a material purchase. The total is priced from quantity and
    /// unit price; payment status starts unpaid.
    pub async fn create_purchase(
        &self,
        supplier_name: &str,
        material_name: &str,
        purchase_date: NaiveDate,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Result<MaterialPurchase, ApiError> {
        validate_name("supplier_name", supplier_name)
            .map_err(presswork_core::CoreError::from)?;
        validate_name("material_name", material_name)
            .map_err(presswork_core::CoreError::from)?;
        validate_quantity(quantity).map_err(presswork_core::CoreError::from)?;
        validate_positive_amount("unit_price", unit_price_cents)
            .map_err(presswork_core::CoreError::from)?;

        let now = Utc::now();
        let purchase = MaterialPurchase {
            id: Uuid::new_v4().to_string(),
            supplier_name: supplier_name.trim().to_string(),
            material_name: material_name.trim().to_string(),
            purchase_date,
            quantity,
            unit_price_cents,
            total_cents: unit_price_cents * quantity,
            paid_cents: 0,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        };

        self.db.purchases().insert(&purchase).await?;
        info!(purchase_id = %purchase.id, supplier = %purchase.supplier_name, "Purchase recorded");

        Ok(purchase)
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Records a payment towards a purchase and recomputes its paid amount
    /// and tri-state status.
    pub async fn add_payment(
        &self,
        purchase_id: &str,
        amount_cents: i64,
        payment_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<MaterialPayment, ApiError> {
        validate_positive_amount("amount", amount_cents)
            .map_err(presswork_core::CoreError::from)?;

        self.db
            .purchases()
            .get_by_id(purchase_id)
            .await?
            .ok_or_else(|| ApiError::not_found("MaterialPurchase", purchase_id))?;

        let payment = MaterialPayment {
            id: Uuid::new_v4().to_string(),
            purchase_id: purchase_id.to_string(),
            amount_cents,
            payment_date,
            method,
            created_at: Utc::now(),
        };

        self.db.purchases().add_payment(&payment).await?;
        self.recompute_paid(purchase_id).await?;

        info!(purchase_id = %purchase_id, amount = amount_cents, "Purchase payment recorded");

        Ok(payment)
    }

    /// Deletes a payment and recomputes the purchase's paid amount.
    pub async fn delete_payment(&self, payment_id: &str) -> Result<(), ApiError> {
        let payment = self
            .db
            .purchases()
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| ApiError::not_found("MaterialPayment", payment_id))?;

        self.db.purchases().delete_payment(payment_id).await?;
        self.recompute_paid(&payment.purchase_id).await?;

        Ok(())
    }

    /// Recomputes a purchase's paid amount and status from its payments.
    pub async fn recompute_paid(&self, purchase_id: &str) -> Result<PaymentStatus, ApiError> {
        let purchase = self
            .db
            .purchases()
            .get_by_id(purchase_id)
            .await?
            .ok_or_else(|| ApiError::not_found("MaterialPurchase", purchase_id))?;

        let payments = self.db.purchases().get_payments(purchase_id).await?;
        let (paid, status) = compute_purchase_paid(purchase.total(), &payments);

        debug!(
            purchase_id = %purchase_id,
            paid = paid.cents(),
            status = ?status,
            "Purchase paid recomputed"
        );

        self.db
            .purchases()
            .update_paid(purchase_id, paid.cents(), status)
            .await?;

        Ok(status)
    }

    // =========================================================================
    // Installment Plans
    // =========================================================================

    /// Generates an installment plan over the purchase's outstanding
    /// balance, replacing any existing plan in one batch write.
    ///
    /// The plan sums to the outstanding balance exactly; a fully paid
    /// purchase has nothing to schedule and fails validation.
    pub async fn generate_installment_plan(
        &self,
        purchase_id: &str,
        count: u32,
        frequency: InstallmentFrequency,
        first_due: NaiveDate,
    ) -> Result<Vec<MaterialInstallment>, ApiError> {
        let purchase = self
            .db
            .purchases()
            .get_by_id(purchase_id)
            .await?
            .ok_or_else(|| ApiError::not_found("MaterialPurchase", purchase_id))?;

        let plan = generate_plan(purchase.outstanding(), count, frequency, first_due)?;

        let now = Utc::now();
        let installments: Vec<MaterialInstallment> = plan
            .into_iter()
            .map(|planned| MaterialInstallment {
                id: Uuid::new_v4().to_string(),
                purchase_id: purchase_id.to_string(),
                installment_number: planned.installment_number as i64,
                amount_cents: planned.amount.cents(),
                due_date: planned.due_date,
                status: InstallmentStatus::Pending,
                created_at: now,
            })
            .collect();

        self.db
            .purchases()
            .replace_installments(purchase_id, &installments)
            .await?;

        info!(
            purchase_id = %purchase_id,
            count = installments.len(),
            outstanding = purchase.outstanding().cents(),
            "Installment plan generated"
        );

        Ok(installments)
    }

    // =========================================================================
    // Notes
    // =========================================================================

    /// Attaches a free-form note to a purchase.
    pub async fn add_note(&self, purchase_id: &str, body: &str) -> Result<MaterialNote, ApiError> {
        if body.trim().is_empty() {
            return Err(ApiError::validation("note body is required"));
        }

        self.db
            .purchases()
            .get_by_id(purchase_id)
            .await?
            .ok_or_else(|| ApiError::not_found("MaterialPurchase", purchase_id))?;

        let note = MaterialNote {
            id: Uuid::new_v4().to_string(),
            purchase_id: purchase_id.to_string(),
            body: body.trim().to_string(),
            created_at: Utc::now(),
        };

        self.db.purchases().add_note(&note).await?;
        Ok(note)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use presswork_db::DbConfig;

    async fn service() -> PurchaseService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        PurchaseService::new(db)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_payment_recomputes_status() {
        let svc = service().await;
        let purchase = svc
            .create_purchase("Karachi Paper Mart", "80gsm offset", date(2024, 3, 1), 100, 1_000)
            .await
            .unwrap();
        assert_eq!(purchase.total_cents, 100_000);

        svc.add_payment(&purchase.id, 40_000, date(2024, 3, 5), PaymentMethod::Cash)
            .await
            .unwrap();
        let loaded = svc.db.purchases().get_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(loaded.paid_cents, 40_000);
        assert_eq!(loaded.payment_status, PaymentStatus::PartiallyPaid);

        let second = svc
            .add_payment(&purchase.id, 60_000, date(2024, 3, 20), PaymentMethod::BankTransfer)
            .await
            .unwrap();
        let loaded = svc.db.purchases().get_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_status, PaymentStatus::Paid);

        // Removing the settling payment walks the status back
        svc.delete_payment(&second.id).await.unwrap();
        let loaded = svc.db.purchases().get_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(loaded.outstanding().cents(), 60_000);
    }

    #[tokio::test]
    async fn test_plan_covers_outstanding_balance() {
        let svc = service().await;
        let purchase = svc
            .create_purchase("Karachi Paper Mart", "CMYK ink set", date(2024, 3, 1), 4, 25_000)
            .await
            .unwrap();

        // 40.00 already paid, 60.00 outstanding over 3 months
        svc.add_payment(&purchase.id, 40_000, date(2024, 3, 2), PaymentMethod::Cash)
            .await
            .unwrap();
        let plan = svc
            .generate_installment_plan(&purchase.id, 3, InstallmentFrequency::Monthly, date(2024, 4, 1))
            .await
            .unwrap();

        assert_eq!(plan.len(), 3);
        let total: i64 = plan.iter().map(|i| i.amount_cents).sum();
        assert_eq!(total, 60_000);
        assert_eq!(plan[0].due_date, date(2024, 4, 1));
        assert_eq!(plan[2].due_date, date(2024, 6, 1));

        // Regenerating replaces the plan instead of appending
        let plan = svc
            .generate_installment_plan(&purchase.id, 2, InstallmentFrequency::Weekly, date(2024, 4, 1))
            .await
            .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(
            svc.db.purchases().get_installments(&purchase.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_plan_rejects_settled_purchase() {
        let svc = service().await;
        let purchase = svc
            .create_purchase("Madina Traders", "Binding glue", date(2024, 3, 1), 10, 500)
            .await
            .unwrap();
        svc.add_payment(&purchase.id, 5_000, date(2024, 3, 1), PaymentMethod::Cash)
            .await
            .unwrap();

        // Nothing outstanding: validation error, nothing written
        let err = svc
            .generate_installment_plan(&purchase.id, 3, InstallmentFrequency::Monthly, date(2024, 4, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(svc.db.purchases().get_installments(&purchase.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plan_requires_existing_purchase() {
        let svc = service().await;
        let err = svc
            .generate_installment_plan("no-such-id", 3, InstallmentFrequency::Monthly, date(2024, 4, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_note_round_trip() {
        let svc = service().await;
        let purchase = svc
            .create_purchase("Karachi Paper Mart", "Art card", date(2024, 3, 1), 50, 2_000)
            .await
            .unwrap();

        svc.add_note(&purchase.id, "Deliver before Eid").await.unwrap();
        assert!(svc.add_note(&purchase.id, "   ").await.is_err());

        let notes = svc.db.purchases().get_notes(&purchase.id).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body, "Deliver before Eid");
    }
}

//! # Allocation Service
//!
//! Wires the allocation engine to the store: rule and account management
//! with the ≤100% cap enforced at write time, and the allocate step that
//! turns a plan into ledger transactions.
//!
//! ## Invariant Ownership
//! The cap check lives HERE, not in the repository and not in the planner:
//! rules are validated against the other active rules for the same source
//! before any write, and allocation itself trusts whatever is currently
//! active (an over-allocated set that slipped in produces an over-allocated
//! plan, never an error at allocation time).

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use presswork_core::allocation::{
    build_transactions, check_cap, plan_allocations, AllocationShare,
};
use presswork_core::validation::{validate_name, validate_percent_bps, validate_positive_amount};
use presswork_core::{Account, AccountType, AllocationRule, Money, SourceType};
use presswork_db::Database;

/// Service for ledger accounts, allocation rules and the allocate step.
#[derive(Debug, Clone)]
pub struct AllocationService {
    db: Database,
}

impl AllocationService {
    pub fn new(db: Database) -> Self {
        AllocationService { db }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Creates a ledger account.
    pub async fn create_account(
        &self,
        name: &str,
        account_type: AccountType,
    ) -> Result<Account, ApiError> {
        validate_name("account_name", name).map_err(presswork_core::CoreError::from)?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            account_type,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.db.accounts().insert(&account).await?;
        info!(account_id = %account.id, name = %account.name, "Account created");

        Ok(account)
    }

    /// Activates or deactivates an account.
    pub async fn set_account_active(&self, account_id: &str, active: bool) -> Result<(), ApiError> {
        self.db.accounts().set_active(account_id, active).await?;
        Ok(())
    }

    /// Deletes an account. Hard delete; fails with a constraint error while
    /// ledger transactions still reference it.
    pub async fn delete_account(&self, account_id: &str) -> Result<(), ApiError> {
        self.db.accounts().delete(account_id).await?;
        info!(account_id = %account_id, "Account deleted");
        Ok(())
    }

    // =========================================================================
    // Rules
    // =========================================================================

    /// Creates an allocation rule for a source type.
    ///
    /// An active rule is checked against the other active rules for the
    /// same source: the combined percentage may not exceed 100%.
    pub async fn create_rule(
        &self,
        source: SourceType,
        account_id: &str,
        percent_bps: i64,
        is_active: bool,
    ) -> Result<AllocationRule, ApiError> {
        validate_percent_bps("percent_bps", percent_bps)
            .map_err(presswork_core::CoreError::from)?;

        self.db
            .accounts()
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Account", account_id))?;

        if is_active {
            let existing = self.db.allocation_rules().list_for_source(source).await?;
            check_cap(source, &existing, percent_bps as u32)?;
        }

        let now = Utc::now();
        let rule = AllocationRule {
            id: Uuid::new_v4().to_string(),
            source_type: source,
            account_id: account_id.to_string(),
            percent_bps,
            is_active,
            created_at: now,
            updated_at: now,
        };

        self.db.allocation_rules().insert(&rule).await?;
        info!(rule_id = %rule.id, ?source, bps = percent_bps, "Allocation rule created");

        Ok(rule)
    }

    /// Updates a rule's percentage and active flag, re-checking the cap
    /// against the OTHER active rules for the same source.
    pub async fn update_rule(
        &self,
        rule_id: &str,
        percent_bps: i64,
        is_active: bool,
    ) -> Result<(), ApiError> {
        validate_percent_bps("percent_bps", percent_bps)
            .map_err(presswork_core::CoreError::from)?;

        let rule = self
            .db
            .allocation_rules()
            .get_by_id(rule_id)
            .await?
            .ok_or_else(|| ApiError::not_found("AllocationRule", rule_id))?;

        if is_active {
            let others: Vec<AllocationRule> = self
                .db
                .allocation_rules()
                .list_for_source(rule.source_type)
                .await?
                .into_iter()
                .filter(|r| r.id != rule_id)
                .collect();
            check_cap(rule.source_type, &others, percent_bps as u32)?;
        }

        self.db
            .allocation_rules()
            .update(rule_id, percent_bps, is_active)
            .await?;

        Ok(())
    }

    /// Deletes a rule. Hard delete.
    pub async fn delete_rule(&self, rule_id: &str) -> Result<(), ApiError> {
        self.db.allocation_rules().delete(rule_id).await?;
        Ok(())
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocates an amount across the active rules for a source type and
    /// records one ledger transaction per share.
    ///
    /// No active rules is a successful no-op: nothing is written and an
    /// empty plan is returned. Store errors propagate; there is no retry.
    pub async fn allocate(
        &self,
        amount: Money,
        source: SourceType,
        source_id: Option<&str>,
        description: Option<&str>,
    ) -> Result<Vec<AllocationShare>, ApiError> {
        validate_positive_amount("amount", amount.cents())
            .map_err(presswork_core::CoreError::from)?;

        let rules = self
            .db
            .allocation_rules()
            .list_active_for_source(source)
            .await?;

        let plan = plan_allocations(amount, &rules);
        if plan.is_empty() {
            debug!(?source, amount = amount.cents(), "No active rules, allocation is a no-op");
            return Ok(plan);
        }

        let ids: Vec<String> = plan.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let transactions =
            build_transactions(&plan, &ids, source, source_id, description, Utc::now());

        self.db.accounts().insert_transactions(&transactions).await?;

        info!(
            ?source,
            amount = amount.cents(),
            shares = plan.len(),
            "Allocation recorded"
        );

        Ok(plan)
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

    async fn service() -> AllocationService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AllocationService::new(db)
    }

    #[tokio::test]
    async fn test_rule_cap_enforced_at_create() {
        let svc = service().await;
        let account = svc
            .create_account("Owner Draw", AccountType::Profit)
            .await
            .unwrap();

        svc.create_rule(SourceType::Profit, &account.id, 6000, true)
            .await
            .unwrap();
        svc.create_rule(SourceType::Profit, &account.id, 4000, true)
            .await
            .unwrap();

        // Third active rule would push the total past 100%
        let err = svc
            .create_rule(SourceType::Profit, &account.id, 100, true)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Constraint);

        // Inactive rules don't count against the cap
        svc.create_rule(SourceType::Profit, &account.id, 100, false)
            .await
            .unwrap();

        // A different source type has its own budget
        svc.create_rule(SourceType::Expense, &account.id, 10_000, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_rule_excludes_itself_from_cap() {
        let svc = service().await;
        let account = svc
            .create_account("Reinvestment", AccountType::Profit)
            .await
            .unwrap();

        let rule = svc
            .create_rule(SourceType::Profit, &account.id, 6000, true)
            .await
            .unwrap();

        // Raising the only rule to 100% is fine: its old 60% is not counted
        svc.update_rule(&rule.id, 10_000, true).await.unwrap();

        let second = svc
            .create_rule(SourceType::Profit, &account.id, 500, false)
            .await
            .unwrap();
        // Activating the second rule now breaks the cap
        let err = svc.update_rule(&second.id, 500, true).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Constraint);
    }

    #[tokio::test]
    async fn test_allocate_writes_ledger_transactions() {
        let svc = service().await;
        let owner = svc
            .create_account("Owner Draw", AccountType::Profit)
            .await
            .unwrap();
        let tax = svc
            .create_account("Tax Reserve", AccountType::Custom)
            .await
            .unwrap();

        svc.create_rule(SourceType::Profit, &owner.id, 5000, true)
            .await
            .unwrap();
        svc.create_rule(SourceType::Profit, &tax.id, 1500, true)
            .await
            .unwrap();

        let plan = svc
            .allocate(
                Money::from_cents(12_000),
                SourceType::Profit,
                Some("order-1"),
                Some("profit allocation"),
            )
            .await
            .unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(svc.db.accounts().account_balance(&owner.id).await.unwrap(), 6_000);
        assert_eq!(svc.db.accounts().account_balance(&tax.id).await.unwrap(), 1_800);
    }

    #[tokio::test]
    async fn test_allocate_with_no_rules_is_noop() {
        let svc = service().await;
        let plan = svc
            .allocate(Money::from_cents(5_000), SourceType::Labor, None, None)
            .await
            .unwrap();
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_expense_allocation_debits() {
        let svc = service().await;
        let account = svc
            .create_account("Operating", AccountType::Expense)
            .await
            .unwrap();
        svc.create_rule(SourceType::Expense, &account.id, 10_000, true)
            .await
            .unwrap();

        svc.allocate(Money::from_cents(2_000), SourceType::Expense, None, None)
            .await
            .unwrap();

        // Expense allocations debit the account
        assert_eq!(
            svc.db.accounts().account_balance(&account.id).await.unwrap(),
            -2_000
        );
    }

    #[tokio::test]
    async fn test_delete_account_blocked_while_referenced() {
        let svc = service().await;
        let account = svc
            .create_account("Wages Pool", AccountType::Labor)
            .await
            .unwrap();
        svc.create_rule(SourceType::Labor, &account.id, 10_000, true)
            .await
            .unwrap();
        svc.allocate(Money::from_cents(1_000), SourceType::Labor, None, None)
            .await
            .unwrap();

        let err = svc.delete_account(&account.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Constraint);

        svc.set_account_active(&account.id, false).await.unwrap();
    }
}

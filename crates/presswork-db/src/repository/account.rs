//! # Account Repository
//!
//! Database operations for ledger accounts and their transactions.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  account_transactions is APPEND-ONLY                                    │
//! │                                                                         │
//! │  insert_transactions()  ──► one batch, one SQL transaction             │
//! │  (no update method)                                                     │
//! │  (no delete method)                                                     │
//! │                                                                         │
//! │  delete_account() fails with a FOREIGN KEY violation while any         │
//! │  transaction still references the account (RESTRICT reference).        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use presswork_core::{Account, AccountTransaction};

/// Repository for account and ledger operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account.
    pub async fn insert(&self, account: &Account) -> DbResult<()> {
        debug!(id = %account.id, name = %account.name, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, account_type, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(account.account_type)
        .bind(account.is_active)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, account_type, is_active, created_at, updated_at
            FROM accounts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Lists all accounts, active first, then by name.
    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, account_type, is_active, created_at, updated_at
            FROM accounts
            ORDER BY is_active DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Activates or deactivates an account.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE accounts SET is_active = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Deletes an account. Hard delete; fails with a foreign key violation
    /// while ledger transactions still reference the account.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Inserts a batch of ledger transactions in one SQL transaction.
    ///
    /// Either every entry lands or none do; a failed batch leaves the
    /// ledger untouched.
    pub async fn insert_transactions(&self, entries: &[AccountTransaction]) -> DbResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        debug!(count = entries.len(), "Inserting ledger transactions");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO account_transactions (
                    id, account_id, amount_cents, transaction_type,
                    source_type, source_id, description, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&entry.id)
            .bind(&entry.account_id)
            .bind(entry.amount_cents)
            .bind(entry.transaction_type)
            .bind(entry.source_type)
            .bind(&entry.source_id)
            .bind(&entry.description)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lists ledger transactions for an account, newest first.
    pub async fn transactions_for_account(
        &self,
        account_id: &str,
    ) -> DbResult<Vec<AccountTransaction>> {
        let entries = sqlx::query_as::<_, AccountTransaction>(
            r#"
            SELECT id, account_id, amount_cents, transaction_type,
                   source_type, source_id, description, created_at
            FROM account_transactions
            WHERE account_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Net balance of an account: credits minus debits, in cents.
    pub async fn account_balance(&self, account_id: &str) -> DbResult<i64> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(CASE transaction_type
                         WHEN 'credit' THEN amount_cents
                         ELSE -amount_cents
                       END)
            FROM account_transactions
            WHERE account_id = ?1
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

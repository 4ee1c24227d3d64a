//! # Allocation Rule Repository
//!
//! Persistence for allocation rules. The ≤100% active-percentage invariant
//! is checked by the service layer BEFORE calling the write methods here
//! (see `AllocationService`); this repository only moves rows.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use presswork_core::{AllocationRule, SourceType};

/// Repository for allocation rule persistence.
#[derive(Debug, Clone)]
pub struct AllocationRuleRepository {
    pool: SqlitePool,
}

impl AllocationRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AllocationRuleRepository { pool }
    }

    /// Inserts a rule.
    pub async fn insert(&self, rule: &AllocationRule) -> DbResult<()> {
        debug!(id = %rule.id, account_id = %rule.account_id, bps = rule.percent_bps, "Inserting allocation rule");

        sqlx::query(
            r#"
            INSERT INTO allocation_rules (
                id, source_type, account_id, percent_bps, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&rule.id)
        .bind(rule.source_type)
        .bind(&rule.account_id)
        .bind(rule.percent_bps)
        .bind(rule.is_active)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a rule by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<AllocationRule>> {
        let rule = sqlx::query_as::<_, AllocationRule>(
            r#"
            SELECT id, source_type, account_id, percent_bps, is_active,
                   created_at, updated_at
            FROM allocation_rules
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rule)
    }

    /// Updates a rule's percentage and active flag.
    pub async fn update(&self, id: &str, percent_bps: i64, is_active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE allocation_rules SET
                percent_bps = ?2,
                is_active = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(percent_bps)
        .bind(is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("AllocationRule", id));
        }

        Ok(())
    }

    /// Deletes a rule. Hard delete.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM allocation_rules WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("AllocationRule", id));
        }

        Ok(())
    }

    /// Lists every rule for a source type (active and inactive).
    pub async fn list_for_source(&self, source: SourceType) -> DbResult<Vec<AllocationRule>> {
        let rules = sqlx::query_as::<_, AllocationRule>(
            r#"
            SELECT id, source_type, account_id, percent_bps, is_active,
                   created_at, updated_at
            FROM allocation_rules
            WHERE source_type = ?1
            ORDER BY percent_bps DESC, id
            "#,
        )
        .bind(source)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    /// Lists the active rules for a source type, ordered by percentage
    /// descending (id breaks ties).
    pub async fn list_active_for_source(
        &self,
        source: SourceType,
    ) -> DbResult<Vec<AllocationRule>> {
        let rules = sqlx::query_as::<_, AllocationRule>(
            r#"
            SELECT id, source_type, account_id, percent_bps, is_active,
                   created_at, updated_at
            FROM allocation_rules
            WHERE source_type = ?1 AND is_active = 1
            ORDER BY percent_bps DESC, id
            "#,
        )
        .bind(source)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }
}

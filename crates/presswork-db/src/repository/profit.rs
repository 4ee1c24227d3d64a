//! # Profit Settings Repository
//!
//! Persistence for the singleton profit settings row and its overrides.
//! `load()` assembles the full [`ProfitSettings`] object the calculator
//! takes; callers load once per operation and pass it down rather than
//! holding it as ambient state.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::error::{DbError, DbResult};
use presswork_core::profit::{CalculationBasis, ProfitOverride, ProfitSettings};

/// The singleton settings row as stored (overrides live in their own
/// table and are joined in by `load`).
#[derive(Debug, FromRow)]
struct SettingsRow {
    enabled: bool,
    calculation_basis: CalculationBasis,
    default_profit_bps: i64,
    include_labor: bool,
    labor_bps: i64,
}

/// Repository for profit settings and overrides.
#[derive(Debug, Clone)]
pub struct ProfitSettingsRepository {
    pool: SqlitePool,
}

impl ProfitSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfitSettingsRepository { pool }
    }

    /// Loads the settings with all overrides attached. A missing singleton
    /// row yields the defaults (profit on, 30%, labor off).
    pub async fn load(&self) -> DbResult<ProfitSettings> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT enabled, calculation_basis, default_profit_bps,
                   include_labor, labor_bps
            FROM profit_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let overrides = self.list_overrides().await?;

        let settings = match row {
            Some(row) => ProfitSettings {
                enabled: row.enabled,
                calculation_basis: row.calculation_basis,
                default_profit_bps: row.default_profit_bps,
                include_labor: row.include_labor,
                labor_bps: row.labor_bps,
                overrides,
            },
            None => ProfitSettings {
                overrides,
                ..ProfitSettings::default()
            },
        };

        Ok(settings)
    }

    /// Writes the singleton row (upsert).
    pub async fn save(&self, settings: &ProfitSettings) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profit_settings (
                id, enabled, calculation_basis, default_profit_bps,
                include_labor, labor_bps, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                enabled = excluded.enabled,
                calculation_basis = excluded.calculation_basis,
                default_profit_bps = excluded.default_profit_bps,
                include_labor = excluded.include_labor,
                labor_bps = excluded.labor_bps,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(settings.enabled)
        .bind(settings.calculation_basis)
        .bind(settings.default_profit_bps)
        .bind(settings.include_labor)
        .bind(settings.labor_bps)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts an override.
    pub async fn insert_override(&self, entry: &ProfitOverride) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profit_overrides (
                id, target, target_id, name, profit_bps, labor_bps
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.target)
        .bind(&entry.target_id)
        .bind(&entry.name)
        .bind(entry.profit_bps)
        .bind(entry.labor_bps)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes an override.
    pub async fn delete_override(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM profit_overrides WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProfitOverride", id));
        }

        Ok(())
    }

    /// Lists all overrides.
    pub async fn list_overrides(&self) -> DbResult<Vec<ProfitOverride>> {
        let overrides = sqlx::query_as::<_, ProfitOverride>(
            r#"
            SELECT id, target, target_id, name, profit_bps, labor_bps
            FROM profit_overrides
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(overrides)
    }
}

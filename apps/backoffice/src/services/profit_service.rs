//! # Profit Settings Service
//!
//! Manages the singleton profit configuration and its per-item/per-category
//! overrides. Settings are loaded once per operation by the callers that
//! need them (see `OrderService`); this service only owns persistence and
//! validation.

use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use presswork_core::profit::{
    CalculationBasis, OverrideTarget, ProfitOverride, ProfitSettings,
};
use presswork_core::validation::{validate_name, validate_percent_bps};
use presswork_core::CoreError;
use presswork_db::Database;

/// Service for profit settings and overrides.
#[derive(Debug, Clone)]
pub struct ProfitService {
    db: Database,
}

impl ProfitService {
    pub fn new(db: Database) -> Self {
        ProfitService { db }
    }

    /// Loads the settings with all overrides attached.
    pub async fn load_settings(&self) -> Result<ProfitSettings, ApiError> {
        Ok(self.db.profit_settings().load().await?)
    }

    /// Updates the singleton settings row.
    ///
    /// The labor percentage is only validated when labor is included; a
    /// shop with labor off keeps whatever (possibly zero) value is stored.
    pub async fn update_settings(
        &self,
        enabled: bool,
        calculation_basis: CalculationBasis,
        default_profit_bps: i64,
        include_labor: bool,
        labor_bps: i64,
    ) -> Result<ProfitSettings, ApiError> {
        validate_percent_bps("default_profit_bps", default_profit_bps)
            .map_err(CoreError::from)?;
        if include_labor {
            validate_percent_bps("labor_bps", labor_bps).map_err(CoreError::from)?;
        }

        let settings = ProfitSettings {
            enabled,
            calculation_basis,
            default_profit_bps,
            include_labor,
            labor_bps,
            overrides: Vec::new(),
        };
        self.db.profit_settings().save(&settings).await?;

        info!(
            enabled,
            ?calculation_basis,
            profit_bps = default_profit_bps,
            include_labor,
            "Profit settings updated"
        );

        self.load_settings().await
    }

    /// Adds a per-item or per-category override.
    pub async fn add_override(
        &self,
        target: OverrideTarget,
        target_id: Option<String>,
        name: &str,
        profit_bps: i64,
        labor_bps: Option<i64>,
    ) -> Result<ProfitOverride, ApiError> {
        validate_name("override_name", name).map_err(CoreError::from)?;
        validate_percent_bps("profit_bps", profit_bps).map_err(CoreError::from)?;
        if let Some(bps) = labor_bps {
            validate_percent_bps("labor_bps", bps).map_err(CoreError::from)?;
        }

        let entry = ProfitOverride {
            id: Uuid::new_v4().to_string(),
            target,
            target_id,
            name: name.trim().to_string(),
            profit_bps,
            labor_bps,
        };
        self.db.profit_settings().insert_override(&entry).await?;

        Ok(entry)
    }

    /// Removes an override.
    pub async fn remove_override(&self, id: &str) -> Result<(), ApiError> {
        self.db.profit_settings().delete_override(id).await?;
        Ok(())
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

    async fn service() -> ProfitService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ProfitService::new(db)
    }

    #[tokio::test]
    async fn test_settings_round_trip_with_overrides() {
        let svc = service().await;

        svc.update_settings(true, CalculationBasis::TotalCost, 2_500, true, 1_000)
            .await
            .unwrap();
        svc.add_override(
            OverrideTarget::Category,
            None,
            "Cards",
            4_000,
            Some(1_500),
        )
        .await
        .unwrap();

        let settings = svc.load_settings().await.unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.calculation_basis, CalculationBasis::TotalCost);
        assert_eq!(settings.default_profit_bps, 2_500);
        assert_eq!(settings.overrides.len(), 1);
        assert_eq!(settings.overrides[0].name, "Cards");
    }

    #[tokio::test]
    async fn test_missing_singleton_yields_defaults() {
        let svc = service().await;
        let settings = svc.load_settings().await.unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.default_profit_bps, 3_000);
        assert!(!settings.include_labor);
    }

    #[tokio::test]
    async fn test_bps_ranges_are_validated() {
        let svc = service().await;

        let err = svc
            .update_settings(true, CalculationBasis::UnitPrice, 10_500, false, 0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Labor bps only checked when labor is included
        svc.update_settings(true, CalculationBasis::UnitPrice, 3_000, false, 0)
            .await
            .unwrap();
        let err = svc
            .update_settings(true, CalculationBasis::UnitPrice, 3_000, true, 0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = svc
            .add_override(OverrideTarget::Item, None, "Flyers", 0, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}

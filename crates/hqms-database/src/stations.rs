//! 站点登记表操作

use crate::connection::DatabasePool;
use crate::models::DbStation;
use hqms_core::{HqmsError, Result, Station};

/// 站点登记表
pub struct StationRegistry<'a> {
    pool: &'a DatabasePool,
}

impl<'a> StationRegistry<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 按ID查找站点
    pub async fn get(&self, station_id: i64) -> Result<Option<Station>> {
        let result = sqlx::query_as::<_, DbStation>(
            "SELECT * FROM stations WHERE station_id = $1"
        )
        .bind(station_id)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(result.map(Station::from))
    }

    /// 站点列表，启用的排前
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Station>> {
        let results = sqlx::query_as::<_, DbStation>(r#"
            SELECT * FROM stations
            WHERE is_active OR $1
            ORDER BY is_active DESC, station_type, station_name, station_number
        "#)
        .bind(include_inactive)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(results.into_iter().map(Station::from).collect())
    }

    /// 操作员开闭站点
    pub async fn set_open(&self, station_id: i64, is_open: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE stations SET is_open = $1, updated_at = NOW() WHERE station_id = $2"
        )
        .bind(is_open)
        .bind(station_id)
        .execute(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(HqmsError::NotFound(format!("Station {} not found", station_id)));
        }

        tracing::info!("Station {} is_open set to {}", station_id, is_open);
        Ok(())
    }

    /// 启用或停用站点
    pub async fn set_active(&self, station_id: i64, is_active: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE stations SET is_active = $1, updated_at = NOW() WHERE station_id = $2"
        )
        .bind(is_active)
        .bind(station_id)
        .execute(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(HqmsError::NotFound(format!("Station {} not found", station_id)));
        }

        tracing::info!("Station {} is_active set to {}", station_id, is_active);
        Ok(())
    }
}

//! 队列统计汇总
//!
//! 只读报表查询；查询失败时记录日志并退化为零值结构，
//! 保证看板展示不中断。

use crate::connection::DatabasePool;
use chrono::NaiveDate;
use hqms_core::{HqmsError, QueueStatistics, QueueType, QueueTypeStatistics, Result};
use sqlx::Row;

/// 统计汇总器
pub struct StatisticsAggregator<'a> {
    pool: &'a DatabasePool,
}

impl<'a> StatisticsAggregator<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 单站点单日统计
    pub async fn station_statistics(&self, station_id: i64, date: NaiveDate) -> QueueStatistics {
        match self.query_station_statistics(station_id, date).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(
                    "Failed to compute statistics for station {} on {}: {}",
                    station_id,
                    date,
                    e
                );
                QueueStatistics::default()
            }
        }
    }

    /// 日期范围内按队列类型汇总
    pub async fn range_statistics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<QueueTypeStatistics> {
        match self.query_range_statistics(start_date, end_date).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(
                    "Failed to compute statistics for {} .. {}: {}",
                    start_date,
                    end_date,
                    e
                );
                Vec::new()
            }
        }
    }

    async fn query_station_statistics(
        &self,
        station_id: i64,
        date: NaiveDate,
    ) -> Result<QueueStatistics> {
        let row = sqlx::query(r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status IN ('done', 'completed')) AS completed,
                   COUNT(*) FILTER (WHERE status = 'skipped') AS skipped,
                   COUNT(*) FILTER (WHERE status = 'waiting') AS waiting,
                   COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                   COALESCE(AVG(EXTRACT(EPOCH FROM (time_started - time_in)) / 60.0), 0)::DOUBLE PRECISION
                       AS average_wait_minutes,
                   COALESCE(AVG(EXTRACT(EPOCH FROM (time_completed - time_in)) / 60.0), 0)::DOUBLE PRECISION
                       AS average_turnaround_minutes
            FROM queue_entries
            WHERE station_id = $1 AND time_in::date = $2
        "#)
        .bind(station_id)
        .bind(date)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(Self::stats_from_row(&row))
    }

    async fn query_range_statistics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<QueueTypeStatistics>> {
        let rows = sqlx::query(r#"
            SELECT queue_type,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status IN ('done', 'completed')) AS completed,
                   COUNT(*) FILTER (WHERE status = 'skipped') AS skipped,
                   COUNT(*) FILTER (WHERE status = 'waiting') AS waiting,
                   COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                   COALESCE(AVG(EXTRACT(EPOCH FROM (time_started - time_in)) / 60.0), 0)::DOUBLE PRECISION
                       AS average_wait_minutes,
                   COALESCE(AVG(EXTRACT(EPOCH FROM (time_completed - time_in)) / 60.0), 0)::DOUBLE PRECISION
                       AS average_turnaround_minutes
            FROM queue_entries
            WHERE time_in::date BETWEEN $1 AND $2
            GROUP BY queue_type
            ORDER BY queue_type
        "#)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| QueueTypeStatistics {
                queue_type: QueueType::from_str(row.get("queue_type")),
                stats: Self::stats_from_row(&row),
            })
            .collect())
    }

    fn stats_from_row(row: &sqlx::postgres::PgRow) -> QueueStatistics {
        QueueStatistics {
            total: row.get("total"),
            completed: row.get("completed"),
            skipped: row.get("skipped"),
            waiting: row.get("waiting"),
            in_progress: row.get("in_progress"),
            average_wait_minutes: row.get("average_wait_minutes"),
            average_turnaround_minutes: row.get("average_turnaround_minutes"),
        }
    }
}

//! 数据库建表与索引
//!
//! `employees`/`roles`/`patients` 属于院内其他子系统维护的协作表，
//! 这里只做只读联查，不负责建表。

use crate::connection::DatabasePool;
use hqms_core::{HqmsError, Result};

/// 数据库结构管理
pub struct SchemaManager<'a> {
    pool: &'a DatabasePool,
}

impl<'a> SchemaManager<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 站点表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS stations (
                station_id BIGSERIAL PRIMARY KEY,
                station_name VARCHAR(255) NOT NULL,
                station_type VARCHAR(20) NOT NULL,
                station_number INTEGER NOT NULL DEFAULT 0,
                service_id BIGINT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                is_open BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| HqmsError::Database(e.to_string()))?;

        // 排班表，每站点一行，就地更新
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS assignment_schedules (
                schedule_id BIGSERIAL PRIMARY KEY,
                employee_id BIGINT,
                station_id BIGINT NOT NULL REFERENCES stations(station_id),
                start_date DATE NOT NULL,
                end_date DATE,
                assignment_type VARCHAR(16) NOT NULL DEFAULT 'permanent',
                shift_start_time TIME NOT NULL,
                shift_end_time TIME NOT NULL,
                assigned_by BIGINT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                assigned_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| HqmsError::Database(e.to_string()))?;

        // 排班日志表，只追加
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS assignment_logs (
                log_id BIGSERIAL PRIMARY KEY,
                schedule_id BIGINT NOT NULL REFERENCES assignment_schedules(schedule_id),
                employee_id BIGINT,
                station_id BIGINT NOT NULL,
                action_type VARCHAR(16) NOT NULL,
                action_date DATE NOT NULL,
                performed_by BIGINT NOT NULL,
                notes TEXT,
                logged_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| HqmsError::Database(e.to_string()))?;

        // 队列条目表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS queue_entries (
                queue_entry_id BIGSERIAL PRIMARY KEY,
                visit_id BIGINT NOT NULL,
                appointment_id BIGINT,
                patient_id BIGINT NOT NULL,
                service_id BIGINT,
                queue_type VARCHAR(20) NOT NULL,
                station_id BIGINT REFERENCES stations(station_id),
                queue_number INTEGER NOT NULL,
                queue_code VARCHAR(8) NOT NULL,
                priority_level VARCHAR(16) NOT NULL DEFAULT 'normal',
                status VARCHAR(16) NOT NULL DEFAULT 'waiting',
                time_in TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                time_started TIMESTAMP WITH TIME ZONE,
                time_completed TIMESTAMP WITH TIME ZONE,
                remarks TEXT,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| HqmsError::Database(e.to_string()))?;

        // 队列日志表，只追加
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS queue_logs (
                log_id BIGSERIAL PRIMARY KEY,
                queue_entry_id BIGINT NOT NULL REFERENCES queue_entries(queue_entry_id),
                action VARCHAR(20) NOT NULL,
                employee_id BIGINT,
                details TEXT,
                timestamp TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| HqmsError::Database(e.to_string()))?;

        // 创建索引以优化查询性能
        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    ///
    /// 两个部分唯一索引在存储层兜底“每站点/每员工至多一行有效排班”。
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = vec![
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_assignment_active_station ON assignment_schedules(station_id) WHERE is_active",
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_assignment_active_employee ON assignment_schedules(employee_id) WHERE is_active AND employee_id IS NOT NULL",
            "CREATE INDEX IF NOT EXISTS idx_assignment_schedules_station_id ON assignment_schedules(station_id)",
            "CREATE INDEX IF NOT EXISTS idx_assignment_schedules_employee_id ON assignment_schedules(employee_id)",
            "CREATE INDEX IF NOT EXISTS idx_assignment_logs_schedule_id ON assignment_logs(schedule_id)",
            "CREATE INDEX IF NOT EXISTS idx_queue_entries_station_id ON queue_entries(station_id)",
            "CREATE INDEX IF NOT EXISTS idx_queue_entries_patient_id ON queue_entries(patient_id)",
            "CREATE INDEX IF NOT EXISTS idx_queue_entries_status ON queue_entries(status)",
            "CREATE INDEX IF NOT EXISTS idx_queue_entries_queue_type ON queue_entries(queue_type)",
            "CREATE INDEX IF NOT EXISTS idx_queue_entries_time_in ON queue_entries(time_in)",
            "CREATE INDEX IF NOT EXISTS idx_queue_logs_queue_entry_id ON queue_logs(queue_entry_id)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql)
                .execute(pool)
                .await
                .map_err(|e| HqmsError::Database(e.to_string()))?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }
}

//! 队列条目存储
//!
//! 管理患者入队、叫号状态流转与当日队列读取。
//! 当日序号按队列类型（指定站点时再按站点）独立递增，次日重置。

use crate::connection::DatabasePool;
use crate::models::{DbQueueEntry, DbQueueEntryRow, NewQueueLog};
use hqms_core::utils::format_queue_code;
use hqms_core::{
    HqmsError, NewQueueEntry, QueueAction, QueueEntry, QueueEntryView, QueueStatus, QueueTicket,
    Result,
};
use sqlx::Row;

/// 队列条目存储
pub struct QueueStore<'a> {
    pool: &'a DatabasePool,
}

impl<'a> QueueStore<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 患者入队，生成当日递增序号与叫号票据
    pub async fn create_entry(&self, entry: &NewQueueEntry) -> Result<QueueTicket> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let row = sqlx::query(r#"
            SELECT COALESCE(MAX(queue_number), 0) + 1 AS next_number
            FROM queue_entries
            WHERE queue_type = $1
              AND time_in::date = CURRENT_DATE
              AND ($2::BIGINT IS NULL OR station_id = $2)
        "#)
        .bind(entry.queue_type.as_str())
        .bind(entry.station_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        let queue_number: i32 = row.get("next_number");
        let queue_code = format_queue_code(entry.queue_type, queue_number);

        let inserted = sqlx::query(r#"
            INSERT INTO queue_entries
                (visit_id, appointment_id, patient_id, service_id, queue_type, station_id,
                 queue_number, queue_code, priority_level, status, time_in)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'waiting', NOW())
            RETURNING queue_entry_id
        "#)
        .bind(entry.visit_id)
        .bind(entry.appointment_id)
        .bind(entry.patient_id)
        .bind(entry.service_id)
        .bind(entry.queue_type.as_str())
        .bind(entry.station_id)
        .bind(queue_number)
        .bind(&queue_code)
        .bind(entry.priority_level.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        let queue_entry_id: i64 = inserted.get("queue_entry_id");

        tx.commit()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        tracing::info!(
            "Queue entry {} created with code {} for patient {}",
            queue_entry_id,
            queue_code,
            entry.patient_id
        );

        self.append_log(&NewQueueLog {
            queue_entry_id,
            action: QueueAction::Created,
            employee_id: None,
            details: Some(
                serde_json::json!({
                    "queue_code": queue_code,
                    "queue_type": entry.queue_type.as_str(),
                    "priority_level": entry.priority_level.as_str(),
                })
                .to_string(),
            ),
        })
        .await;

        Ok(QueueTicket {
            queue_entry_id,
            queue_number,
            queue_code,
        })
    }

    /// 按ID查找队列条目
    pub async fn get_entry(&self, queue_entry_id: i64) -> Result<Option<QueueEntry>> {
        let result = sqlx::query_as::<_, DbQueueEntry>(
            "SELECT * FROM queue_entries WHERE queue_entry_id = $1"
        )
        .bind(queue_entry_id)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(result.map(QueueEntry::from))
    }

    /// 推进队列条目状态
    ///
    /// 进入办理中盖开始时间，办结盖完成时间，过号不盖时间戳；
    /// 终止状态的条目不再接受任何转换。
    pub async fn update_status(
        &self,
        queue_entry_id: i64,
        new_status: QueueStatus,
        employee_id: Option<i64>,
        remarks: Option<&str>,
    ) -> Result<QueueEntry> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let current = sqlx::query_as::<_, DbQueueEntry>(
            "SELECT * FROM queue_entries WHERE queue_entry_id = $1 FOR UPDATE"
        )
        .bind(queue_entry_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        let current = current.ok_or_else(|| {
            HqmsError::NotFound(format!("Queue entry {} not found", queue_entry_id))
        })?;
        let from = QueueStatus::from_str(&current.status);

        if from.is_terminal() {
            return Err(HqmsError::InvalidStateTransition {
                from: from.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        let updated = match new_status {
            QueueStatus::InProgress => {
                sqlx::query_as::<_, DbQueueEntry>(r#"
                    UPDATE queue_entries
                    SET status = $2, time_started = NOW(),
                        remarks = COALESCE($3, remarks), updated_at = NOW()
                    WHERE queue_entry_id = $1
                    RETURNING *
                "#)
                .bind(queue_entry_id)
                .bind(new_status.as_str())
                .bind(remarks)
                .fetch_one(&mut *tx)
                .await
            }
            QueueStatus::Done | QueueStatus::Completed => {
                sqlx::query_as::<_, DbQueueEntry>(r#"
                    UPDATE queue_entries
                    SET status = $2, time_completed = NOW(),
                        remarks = COALESCE($3, remarks), updated_at = NOW()
                    WHERE queue_entry_id = $1
                    RETURNING *
                "#)
                .bind(queue_entry_id)
                .bind(new_status.as_str())
                .bind(remarks)
                .fetch_one(&mut *tx)
                .await
            }
            _ => {
                sqlx::query_as::<_, DbQueueEntry>(r#"
                    UPDATE queue_entries
                    SET status = $2, remarks = COALESCE($3, remarks), updated_at = NOW()
                    WHERE queue_entry_id = $1
                    RETURNING *
                "#)
                .bind(queue_entry_id)
                .bind(new_status.as_str())
                .bind(remarks)
                .fetch_one(&mut *tx)
                .await
            }
        }
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let result = QueueEntry::from(updated);
        tracing::info!(
            "Queue entry {} status {} -> {}",
            queue_entry_id,
            from.as_str(),
            new_status.as_str()
        );

        self.append_log(&NewQueueLog {
            queue_entry_id,
            action: QueueAction::StatusChanged,
            employee_id,
            details: Some(
                serde_json::json!({
                    "from": from.as_str(),
                    "to": new_status.as_str(),
                })
                .to_string(),
            ),
        })
        .await;

        Ok(result)
    }

    /// 站点当日在队条目，先按优先级后按入队时间
    pub async fn get_station_queue(&self, station_id: i64) -> Result<Vec<QueueEntryView>> {
        let results = sqlx::query_as::<_, DbQueueEntryRow>(r#"
            SELECT q.*, p.full_name AS patient_name
            FROM queue_entries q
            LEFT JOIN patients p ON p.patient_id = q.patient_id
            WHERE q.station_id = $1
              AND q.status IN ('waiting', 'in_progress')
              AND q.time_in::date = CURRENT_DATE
            ORDER BY CASE q.priority_level
                         WHEN 'emergency' THEN 1
                         WHEN 'urgent' THEN 2
                         WHEN 'normal' THEN 3
                         ELSE 4
                     END,
                     q.time_in
        "#)
        .bind(station_id)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(results.into_iter().map(QueueEntryView::from).collect())
    }

    /// 患者当日最近的在队条目
    pub async fn get_patient_status(&self, patient_id: i64) -> Result<Option<QueueEntryView>> {
        let result = sqlx::query_as::<_, DbQueueEntryRow>(r#"
            SELECT q.*, p.full_name AS patient_name
            FROM queue_entries q
            LEFT JOIN patients p ON p.patient_id = q.patient_id
            WHERE q.patient_id = $1
              AND q.status IN ('waiting', 'in_progress')
              AND q.time_in::date = CURRENT_DATE
            ORDER BY q.time_in DESC
            LIMIT 1
        "#)
        .bind(patient_id)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(result.map(QueueEntryView::from))
    }

    /// 追加队列日志，失败只记录告警，不影响已提交的主操作
    async fn append_log(&self, log: &NewQueueLog) {
        let result = sqlx::query(r#"
            INSERT INTO queue_logs (queue_entry_id, action, employee_id, details)
            VALUES ($1, $2, $3, $4)
        "#)
        .bind(log.queue_entry_id)
        .bind(log.action.as_str())
        .bind(log.employee_id)
        .bind(&log.details)
        .execute(self.pool.pool())
        .await;

        if let Err(e) = result {
            tracing::warn!(
                "Failed to append queue log for entry {}: {}",
                log.queue_entry_id,
                e
            );
        }
    }
}

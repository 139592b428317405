//! 排班存储
//!
//! 每个站点只保留一行排班记录，指派、改派、撤销均就地更新；
//! 历史变更写入排班日志。冲突检查在事务内对行加锁，
//! 部分唯一索引在存储层兜底唯一性。

use crate::connection::DatabasePool;
use crate::models::{DbAssignmentSchedule, DbStationAssignmentRow, NewAssignmentLog};
use chrono::{NaiveDate, Utc};
use hqms_core::{
    AssignmentAction, AssignmentRequest, AssignmentSchedule, HqmsError, RemovalType, Result,
    StationAssignmentView,
};
use sqlx::Row;

/// 排班存储
pub struct AssignmentStore<'a> {
    pool: &'a DatabasePool,
}

impl<'a> AssignmentStore<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 将员工指派到站点
    ///
    /// 站点已有排班行时就地更新该行；员工在其他站点持有有效排班时拒绝。
    pub async fn assign(&self, request: &AssignmentRequest) -> Result<AssignmentSchedule> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        // 1. 校验站点存在且已启用
        let station = sqlx::query("SELECT station_name, is_active FROM stations WHERE station_id = $1")
            .bind(request.station_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let station = station.ok_or_else(|| {
            HqmsError::NotFound(format!("Station {} not found", request.station_id))
        })?;
        if !station.get::<bool, _>("is_active") {
            return Err(HqmsError::Validation(format!(
                "Station {} is not active",
                request.station_id
            )));
        }

        // 2. 校验员工存在
        let employee = sqlx::query("SELECT employee_id FROM employees WHERE employee_id = $1")
            .bind(request.employee_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;
        if employee.is_none() {
            return Err(HqmsError::NotFound(format!(
                "Employee {} not found",
                request.employee_id
            )));
        }

        // 3. 员工在其他站点持有有效排班则拒绝
        self.check_employee_conflict(&mut tx, request.employee_id, request.station_id)
            .await?;

        // 4. 站点已有排班行则就地更新，否则插入首行
        let existing = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
            SELECT * FROM assignment_schedules
            WHERE station_id = $1
            ORDER BY schedule_id DESC
            LIMIT 1
            FOR UPDATE
        "#)
        .bind(request.station_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        let (row, action, notes) = match existing {
            Some(current) => {
                let action = if current.employee_id.is_none() {
                    AssignmentAction::Created
                } else {
                    AssignmentAction::Reassigned
                };
                let notes = match current.employee_id {
                    Some(previous) => format!("employee {} -> {}", previous, request.employee_id),
                    None => format!("employee {} assigned", request.employee_id),
                };

                let updated = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
                    UPDATE assignment_schedules
                    SET employee_id = $2, start_date = $3, end_date = $4, assignment_type = $5,
                        shift_start_time = $6, shift_end_time = $7, assigned_by = $8,
                        is_active = TRUE, assigned_at = NOW()
                    WHERE schedule_id = $1
                    RETURNING *
                "#)
                .bind(current.schedule_id)
                .bind(request.employee_id)
                .bind(request.start_date)
                .bind(request.end_date)
                .bind(request.assignment_type.as_str())
                .bind(request.shift_start_time)
                .bind(request.shift_end_time)
                .bind(request.assigned_by)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| HqmsError::Database(e.to_string()))?;

                (updated, action, notes)
            }
            None => {
                let inserted = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
                    INSERT INTO assignment_schedules
                        (employee_id, station_id, start_date, end_date, assignment_type,
                         shift_start_time, shift_end_time, assigned_by, is_active)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
                    RETURNING *
                "#)
                .bind(request.employee_id)
                .bind(request.station_id)
                .bind(request.start_date)
                .bind(request.end_date)
                .bind(request.assignment_type.as_str())
                .bind(request.shift_start_time)
                .bind(request.shift_end_time)
                .bind(request.assigned_by)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| HqmsError::Database(e.to_string()))?;

                let notes = format!("employee {} assigned", request.employee_id);
                (inserted, AssignmentAction::Created, notes)
            }
        };

        tx.commit()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let schedule = AssignmentSchedule::from(row);
        tracing::info!(
            "Station {} assigned to employee {} ({})",
            schedule.station_id,
            request.employee_id,
            action.as_str()
        );

        self.append_log(&NewAssignmentLog {
            schedule_id: schedule.schedule_id,
            employee_id: schedule.employee_id,
            station_id: schedule.station_id,
            action_type: action,
            action_date: request.start_date,
            performed_by: request.assigned_by,
            notes: Some(notes),
        })
        .await;

        Ok(schedule)
    }

    /// 撤销站点当前排班
    pub async fn remove(
        &self,
        station_id: i64,
        removal_date: NaiveDate,
        removal_type: RemovalType,
        performed_by: i64,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let active = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
            SELECT * FROM assignment_schedules
            WHERE station_id = $1 AND is_active
            FOR UPDATE
        "#)
        .bind(station_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        let current = active.ok_or(HqmsError::NoActiveAssignment(station_id))?;

        let action = match removal_type {
            RemovalType::EndAssignment => {
                sqlx::query(
                    "UPDATE assignment_schedules SET end_date = $2, is_active = FALSE WHERE schedule_id = $1"
                )
                .bind(current.schedule_id)
                .bind(removal_date)
                .execute(&mut *tx)
                .await
                .map_err(|e| HqmsError::Database(e.to_string()))?;
                AssignmentAction::Ended
            }
            RemovalType::Deactivate => {
                // 保留日期窗口以便复用
                sqlx::query(
                    "UPDATE assignment_schedules SET is_active = FALSE WHERE schedule_id = $1"
                )
                .bind(current.schedule_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| HqmsError::Database(e.to_string()))?;
                AssignmentAction::Deactivated
            }
        };

        tx.commit()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        tracing::info!(
            "Station {} assignment {} removed ({})",
            station_id,
            current.schedule_id,
            action.as_str()
        );

        self.append_log(&NewAssignmentLog {
            schedule_id: current.schedule_id,
            employee_id: current.employee_id,
            station_id,
            action_type: action,
            action_date: removal_date,
            performed_by,
            notes: None,
        })
        .await;

        Ok(())
    }

    /// 将站点当前排班改派给新员工，就地更新同一行
    pub async fn reassign(
        &self,
        station_id: i64,
        new_employee_id: i64,
        reassign_date: NaiveDate,
        assigned_by: i64,
    ) -> Result<AssignmentSchedule> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let active = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
            SELECT * FROM assignment_schedules
            WHERE station_id = $1 AND is_active
            FOR UPDATE
        "#)
        .bind(station_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        let current = active.ok_or(HqmsError::NoActiveAssignment(station_id))?;

        self.check_employee_conflict(&mut tx, new_employee_id, station_id)
            .await?;

        let updated = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
            UPDATE assignment_schedules
            SET employee_id = $2, start_date = $3, assigned_by = $4, assigned_at = NOW()
            WHERE schedule_id = $1
            RETURNING *
        "#)
        .bind(current.schedule_id)
        .bind(new_employee_id)
        .bind(reassign_date)
        .bind(assigned_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| HqmsError::Database(e.to_string()))?;

        let schedule = AssignmentSchedule::from(updated);
        let notes = match current.employee_id {
            Some(previous) => format!("employee {} -> {}", previous, new_employee_id),
            None => format!("employee {} assigned", new_employee_id),
        };
        tracing::info!("Station {} reassigned to employee {}", station_id, new_employee_id);

        self.append_log(&NewAssignmentLog {
            schedule_id: schedule.schedule_id,
            employee_id: Some(new_employee_id),
            station_id,
            action_type: AssignmentAction::Reassigned,
            action_date: reassign_date,
            performed_by: assigned_by,
            notes: Some(notes),
        })
        .await;

        Ok(schedule)
    }

    /// 全部站点及其当日有效排班，含停用站点
    pub async fn list_all_with_assignments(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<StationAssignmentView>> {
        let results = sqlx::query_as::<_, DbStationAssignmentRow>(r#"
            SELECT s.station_id, s.station_name, s.station_type, s.station_number,
                   s.service_id, s.is_active, s.is_open, s.created_at, s.updated_at,
                   a.schedule_id, a.employee_id, a.start_date, a.end_date, a.assignment_type,
                   a.shift_start_time, a.shift_end_time, a.assigned_by,
                   a.is_active AS schedule_active, a.assigned_at,
                   e.full_name AS employee_name, r.role_name
            FROM stations s
            LEFT JOIN assignment_schedules a
                   ON a.station_id = s.station_id AND a.is_active
                  AND a.start_date <= $1 AND (a.end_date IS NULL OR a.end_date >= $1)
            LEFT JOIN employees e ON e.employee_id = a.employee_id
            LEFT JOIN roles r ON r.role_id = e.role_id
            ORDER BY s.is_active DESC, s.station_type, s.station_name, s.station_number
        "#)
        .bind(as_of)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(results.into_iter().map(StationAssignmentView::from).collect())
    }

    /// 员工某日的有效排班
    pub async fn get_for_employee(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> Result<Option<AssignmentSchedule>> {
        let result = sqlx::query_as::<_, DbAssignmentSchedule>(r#"
            SELECT * FROM assignment_schedules
            WHERE employee_id = $1 AND is_active
              AND start_date <= $2 AND (end_date IS NULL OR end_date >= $2)
        "#)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(result.map(AssignmentSchedule::from))
    }

    /// 单个站点的当前排班视图，按当日有效窗口过滤
    pub async fn get_for_station(&self, station_id: i64) -> Result<Option<StationAssignmentView>> {
        let today = Utc::now().date_naive();

        let result = sqlx::query_as::<_, DbStationAssignmentRow>(r#"
            SELECT s.station_id, s.station_name, s.station_type, s.station_number,
                   s.service_id, s.is_active, s.is_open, s.created_at, s.updated_at,
                   a.schedule_id, a.employee_id, a.start_date, a.end_date, a.assignment_type,
                   a.shift_start_time, a.shift_end_time, a.assigned_by,
                   a.is_active AS schedule_active, a.assigned_at,
                   e.full_name AS employee_name, r.role_name
            FROM stations s
            LEFT JOIN assignment_schedules a
                   ON a.station_id = s.station_id AND a.is_active
                  AND a.start_date <= $2 AND (a.end_date IS NULL OR a.end_date >= $2)
            LEFT JOIN employees e ON e.employee_id = a.employee_id
            LEFT JOIN roles r ON r.role_id = e.role_id
            WHERE s.station_id = $1
        "#)
        .bind(station_id)
        .bind(today)
        .fetch_optional(self.pool.pool())
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        Ok(result.map(StationAssignmentView::from))
    }

    /// 员工跨站点唯一性检查，锁定其当前有效排班行
    async fn check_employee_conflict(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        employee_id: i64,
        target_station_id: i64,
    ) -> Result<()> {
        let conflict = sqlx::query(r#"
            SELECT a.station_id, s.station_name
            FROM assignment_schedules a
            JOIN stations s ON s.station_id = a.station_id
            WHERE a.employee_id = $1 AND a.is_active
            FOR UPDATE OF a
        "#)
        .bind(employee_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| HqmsError::Database(e.to_string()))?;

        if let Some(row) = conflict {
            let station_id: i64 = row.get("station_id");
            if station_id != target_station_id {
                return Err(HqmsError::EmployeeAlreadyAssigned {
                    employee_id,
                    station: row.get::<String, _>("station_name"),
                });
            }
        }

        Ok(())
    }

    /// 追加排班日志，失败只记录告警，不影响已提交的主操作
    async fn append_log(&self, log: &NewAssignmentLog) {
        let result = sqlx::query(r#"
            INSERT INTO assignment_logs
                (schedule_id, employee_id, station_id, action_type, action_date, performed_by, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#)
        .bind(log.schedule_id)
        .bind(log.employee_id)
        .bind(log.station_id)
        .bind(log.action_type.as_str())
        .bind(log.action_date)
        .bind(log.performed_by)
        .bind(&log.notes)
        .execute(self.pool.pool())
        .await;

        if let Err(e) = result {
            tracing::warn!(
                "Failed to append assignment log for schedule {}: {}",
                log.schedule_id,
                e
            );
        }
    }
}

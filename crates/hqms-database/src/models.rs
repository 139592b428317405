//! 数据库模型

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use hqms_core::models::*;
use sqlx::FromRow;

// 数据库表模型 - 使用FromRow trait用于SQL查询

/// 站点表行
#[derive(Debug, FromRow)]
pub struct DbStation {
    pub station_id: i64,
    pub station_name: String,
    pub station_type: String, // 存储为字符串，转换为StationType枚举
    pub station_number: i32,
    pub service_id: Option<i64>,
    pub is_active: bool,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbStation> for Station {
    fn from(db_station: DbStation) -> Self {
        Station {
            station_id: db_station.station_id,
            station_name: db_station.station_name,
            station_type: StationType::from_str(&db_station.station_type),
            station_number: db_station.station_number,
            service_id: db_station.service_id,
            is_active: db_station.is_active,
            is_open: db_station.is_open,
            created_at: db_station.created_at,
            updated_at: db_station.updated_at,
        }
    }
}

/// 排班表行
#[derive(Debug, FromRow)]
pub struct DbAssignmentSchedule {
    pub schedule_id: i64,
    pub employee_id: Option<i64>,
    pub station_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub assignment_type: String, // 存储为字符串，转换为AssignmentType枚举
    pub shift_start_time: NaiveTime,
    pub shift_end_time: NaiveTime,
    pub assigned_by: i64,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
}

impl From<DbAssignmentSchedule> for AssignmentSchedule {
    fn from(db_schedule: DbAssignmentSchedule) -> Self {
        AssignmentSchedule {
            schedule_id: db_schedule.schedule_id,
            station_id: db_schedule.station_id,
            employee_id: db_schedule.employee_id,
            start_date: db_schedule.start_date,
            end_date: db_schedule.end_date,
            assignment_type: AssignmentType::from_str(&db_schedule.assignment_type),
            shift_start_time: db_schedule.shift_start_time,
            shift_end_time: db_schedule.shift_end_time,
            assigned_by: db_schedule.assigned_by,
            is_active: db_schedule.is_active,
            assigned_at: db_schedule.assigned_at,
        }
    }
}

/// 队列条目表行
#[derive(Debug, FromRow)]
pub struct DbQueueEntry {
    pub queue_entry_id: i64,
    pub visit_id: i64,
    pub appointment_id: Option<i64>,
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub queue_type: String,
    pub station_id: Option<i64>,
    pub queue_number: i32,
    pub queue_code: String,
    pub priority_level: String,
    pub status: String, // 存储为字符串，转换为QueueStatus枚举
    pub time_in: DateTime<Utc>,
    pub time_started: Option<DateTime<Utc>>,
    pub time_completed: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbQueueEntry> for QueueEntry {
    fn from(db_entry: DbQueueEntry) -> Self {
        QueueEntry {
            queue_entry_id: db_entry.queue_entry_id,
            visit_id: db_entry.visit_id,
            appointment_id: db_entry.appointment_id,
            patient_id: db_entry.patient_id,
            service_id: db_entry.service_id,
            queue_type: QueueType::from_str(&db_entry.queue_type),
            station_id: db_entry.station_id,
            queue_number: db_entry.queue_number,
            queue_code: db_entry.queue_code,
            priority_level: PriorityLevel::from_str(&db_entry.priority_level),
            status: QueueStatus::from_str(&db_entry.status),
            time_in: db_entry.time_in,
            time_started: db_entry.time_started,
            time_completed: db_entry.time_completed,
            remarks: db_entry.remarks,
            updated_at: db_entry.updated_at,
        }
    }
}

// 联查行模型 - 用于视图查询

/// 站点排班联查行，排班侧来自左联可能为空
#[derive(Debug, FromRow)]
pub struct DbStationAssignmentRow {
    pub station_id: i64,
    pub station_name: String,
    pub station_type: String,
    pub station_number: i32,
    pub service_id: Option<i64>,
    pub is_active: bool,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schedule_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub assignment_type: Option<String>,
    pub shift_start_time: Option<NaiveTime>,
    pub shift_end_time: Option<NaiveTime>,
    pub assigned_by: Option<i64>,
    pub schedule_active: Option<bool>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub employee_name: Option<String>,
    pub role_name: Option<String>,
}

impl From<DbStationAssignmentRow> for StationAssignmentView {
    fn from(row: DbStationAssignmentRow) -> Self {
        let schedule = match (
            row.schedule_id,
            row.start_date,
            row.assignment_type.as_deref(),
            row.shift_start_time,
            row.shift_end_time,
            row.assigned_by,
            row.assigned_at,
        ) {
            (
                Some(schedule_id),
                Some(start_date),
                Some(assignment_type),
                Some(shift_start_time),
                Some(shift_end_time),
                Some(assigned_by),
                Some(assigned_at),
            ) => Some(AssignmentSchedule {
                schedule_id,
                station_id: row.station_id,
                employee_id: row.employee_id,
                start_date,
                end_date: row.end_date,
                assignment_type: AssignmentType::from_str(assignment_type),
                shift_start_time,
                shift_end_time,
                assigned_by,
                is_active: row.schedule_active.unwrap_or(false),
                assigned_at,
            }),
            _ => None,
        };

        StationAssignmentView {
            station: Station {
                station_id: row.station_id,
                station_name: row.station_name,
                station_type: StationType::from_str(&row.station_type),
                station_number: row.station_number,
                service_id: row.service_id,
                is_active: row.is_active,
                is_open: row.is_open,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            schedule,
            employee_name: row.employee_name,
            role_name: row.role_name,
        }
    }
}

/// 队列条目联查行，附带患者姓名
#[derive(Debug, FromRow)]
pub struct DbQueueEntryRow {
    pub queue_entry_id: i64,
    pub visit_id: i64,
    pub appointment_id: Option<i64>,
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub queue_type: String,
    pub station_id: Option<i64>,
    pub queue_number: i32,
    pub queue_code: String,
    pub priority_level: String,
    pub status: String,
    pub time_in: DateTime<Utc>,
    pub time_started: Option<DateTime<Utc>>,
    pub time_completed: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub patient_name: Option<String>,
}

impl From<DbQueueEntryRow> for QueueEntryView {
    fn from(row: DbQueueEntryRow) -> Self {
        QueueEntryView {
            entry: QueueEntry {
                queue_entry_id: row.queue_entry_id,
                visit_id: row.visit_id,
                appointment_id: row.appointment_id,
                patient_id: row.patient_id,
                service_id: row.service_id,
                queue_type: QueueType::from_str(&row.queue_type),
                station_id: row.station_id,
                queue_number: row.queue_number,
                queue_code: row.queue_code,
                priority_level: PriorityLevel::from_str(&row.priority_level),
                status: QueueStatus::from_str(&row.status),
                time_in: row.time_in,
                time_started: row.time_started,
                time_completed: row.time_completed,
                remarks: row.remarks,
                updated_at: row.updated_at,
            },
            patient_name: row.patient_name,
        }
    }
}

// 插入模型 - 用于创建新记录

/// 排班日志插入模型
#[derive(Debug)]
pub struct NewAssignmentLog {
    pub schedule_id: i64,
    pub employee_id: Option<i64>,
    pub station_id: i64,
    pub action_type: AssignmentAction,
    pub action_date: NaiveDate,
    pub performed_by: i64,
    pub notes: Option<String>,
}

/// 队列日志插入模型
#[derive(Debug)]
pub struct NewQueueLog {
    pub queue_entry_id: i64,
    pub action: QueueAction,
    pub employee_id: Option<i64>,
    pub details: Option<String>,
}

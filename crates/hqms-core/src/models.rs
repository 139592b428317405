//! 核心数据模型定义

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// 服务站点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub station_id: i64,
    pub station_name: String,
    pub station_type: StationType,
    pub station_number: i32,     // 叫号屏展示编号
    pub service_id: Option<i64>, // 关联的服务项目
    pub is_active: bool,         // 管理上是否启用
    pub is_open: bool,           // 当前是否有人值守
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 站点类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StationType {
    Triage,       // 预检分诊
    Consultation, // 诊室
    Lab,          // 检验
    Prescription, // 取药
    Billing,      // 收费
    Document,     // 证明文书
    Other,        // 其他
}

impl StationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StationType::Triage => "triage",
            StationType::Consultation => "consultation",
            StationType::Lab => "lab",
            StationType::Prescription => "prescription",
            StationType::Billing => "billing",
            StationType::Document => "document",
            StationType::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "triage" => StationType::Triage,
            "consultation" => StationType::Consultation,
            "lab" => StationType::Lab,
            "prescription" => StationType::Prescription,
            "billing" => StationType::Billing,
            "document" => StationType::Document,
            _ => StationType::Other, // 默认类型
        }
    }
}

/// 排班记录
///
/// 每个站点只保留一行，表示其当前人员配置；撤销通过
/// `end_date`/`is_active` 标记，不删除行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSchedule {
    pub schedule_id: i64,
    pub station_id: i64,
    pub employee_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub assignment_type: AssignmentType,
    pub shift_start_time: NaiveTime,
    pub shift_end_time: NaiveTime,
    pub assigned_by: i64,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
}

/// 排班类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentType {
    Permanent,  // 固定
    Temporary,  // 临时
    Substitute, // 顶班
}

impl AssignmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentType::Permanent => "permanent",
            AssignmentType::Temporary => "temporary",
            AssignmentType::Substitute => "substitute",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "temporary" => AssignmentType::Temporary,
            "substitute" => AssignmentType::Substitute,
            _ => AssignmentType::Permanent, // 默认类型
        }
    }
}

/// 排班日志动作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentAction {
    Created,
    Reassigned,
    Ended,
    Deactivated,
}

impl AssignmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentAction::Created => "created",
            AssignmentAction::Reassigned => "reassigned",
            AssignmentAction::Ended => "ended",
            AssignmentAction::Deactivated => "deactivated",
        }
    }
}

/// 排班撤销方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemovalType {
    EndAssignment, // 结束排班，落下结束日期
    Deactivate,    // 仅停用，保留日期以便复用
}

/// 队列条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub queue_entry_id: i64,
    pub visit_id: i64,
    pub appointment_id: Option<i64>,
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub queue_type: QueueType,
    pub station_id: Option<i64>,
    pub queue_number: i32,  // 当日同类型内递增序号
    pub queue_code: String, // 叫号票据编码，如 T001
    pub priority_level: PriorityLevel,
    pub status: QueueStatus,
    pub time_in: DateTime<Utc>,
    pub time_started: Option<DateTime<Utc>>,
    pub time_completed: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// 队列类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QueueType {
    Triage,
    Consultation,
    Lab,
    Prescription,
    Billing,
    Document,
    Other,
}

impl QueueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::Triage => "triage",
            QueueType::Consultation => "consultation",
            QueueType::Lab => "lab",
            QueueType::Prescription => "prescription",
            QueueType::Billing => "billing",
            QueueType::Document => "document",
            QueueType::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "triage" => QueueType::Triage,
            "consultation" => QueueType::Consultation,
            "lab" => QueueType::Lab,
            "prescription" => QueueType::Prescription,
            "billing" => QueueType::Billing,
            "document" => QueueType::Document,
            _ => QueueType::Other, // 默认类型
        }
    }

    /// 叫号票据的前缀字母，未识别的类型统一用 Q
    pub fn prefix(&self) -> char {
        match self {
            QueueType::Triage => 'T',
            QueueType::Consultation => 'C',
            QueueType::Lab => 'L',
            QueueType::Prescription => 'P',
            QueueType::Billing => 'B',
            QueueType::Document => 'D',
            QueueType::Other => 'Q',
        }
    }
}

/// 优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PriorityLevel {
    Emergency, // 急救
    Urgent,    // 急
    Normal,    // 普通
    Other,     // 其他
}

impl PriorityLevel {
    /// 叫号排序权重，数值越小越先叫
    pub fn rank(&self) -> i16 {
        match self {
            PriorityLevel::Emergency => 1,
            PriorityLevel::Urgent => 2,
            PriorityLevel::Normal => 3,
            PriorityLevel::Other => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Emergency => "emergency",
            PriorityLevel::Urgent => "urgent",
            PriorityLevel::Normal => "normal",
            PriorityLevel::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "emergency" => PriorityLevel::Emergency,
            "urgent" => PriorityLevel::Urgent,
            "normal" => PriorityLevel::Normal,
            _ => PriorityLevel::Other,
        }
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        PriorityLevel::Normal
    }
}

/// 队列条目状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QueueStatus {
    Waiting,    // 候诊
    InProgress, // 办理中
    Done,       // 已办结
    Completed,  // 已完成
    Skipped,    // 已过号
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::InProgress => "in_progress",
            QueueStatus::Done => "done",
            QueueStatus::Completed => "completed",
            QueueStatus::Skipped => "skipped",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "in_progress" => QueueStatus::InProgress,
            "done" => QueueStatus::Done,
            "completed" => QueueStatus::Completed,
            "skipped" => QueueStatus::Skipped,
            _ => QueueStatus::Waiting, // 默认状态
        }
    }

    /// 终止状态不再参与任何转换
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueueStatus::Done | QueueStatus::Completed | QueueStatus::Skipped
        )
    }
}

/// 队列日志动作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueueAction {
    Created,
    StatusChanged,
}

impl QueueAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueAction::Created => "created",
            QueueAction::StatusChanged => "status_changed",
        }
    }
}

/// 排班指派请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub employee_id: i64,
    pub station_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub assignment_type: AssignmentType,
    pub shift_start_time: NaiveTime,
    pub shift_end_time: NaiveTime,
    pub assigned_by: i64,
}

/// 患者入队请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQueueEntry {
    pub visit_id: i64,
    pub appointment_id: Option<i64>,
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub queue_type: QueueType,
    pub station_id: Option<i64>,
    pub priority_level: PriorityLevel,
}

/// 入队返回的叫号票据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTicket {
    pub queue_entry_id: i64,
    pub queue_number: i32,
    pub queue_code: String,
}

/// 站点及其当前排班视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationAssignmentView {
    pub station: Station,
    pub schedule: Option<AssignmentSchedule>,
    pub employee_name: Option<String>,
    pub role_name: Option<String>,
}

/// 队列条目视图，附带患者姓名
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntryView {
    pub entry: QueueEntry,
    pub patient_name: Option<String>,
}

/// 队列统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStatistics {
    pub total: i64,
    pub completed: i64,
    pub skipped: i64,
    pub waiting: i64,
    pub in_progress: i64,
    pub average_wait_minutes: f64,
    pub average_turnaround_minutes: f64,
}

/// 按队列类型汇总的统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTypeStatistics {
    pub queue_type: QueueType,
    pub stats: QueueStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(PriorityLevel::Emergency.rank() < PriorityLevel::Urgent.rank());
        assert!(PriorityLevel::Urgent.rank() < PriorityLevel::Normal.rank());
        assert!(PriorityLevel::Normal.rank() < PriorityLevel::Other.rank());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!QueueStatus::Waiting.is_terminal());
        assert!(!QueueStatus::InProgress.is_terminal());
        assert!(QueueStatus::Done.is_terminal());
        assert!(QueueStatus::Completed.is_terminal());
        assert!(QueueStatus::Skipped.is_terminal());
    }

    #[test]
    fn test_queue_type_prefix() {
        assert_eq!(QueueType::Triage.prefix(), 'T');
        assert_eq!(QueueType::Consultation.prefix(), 'C');
        assert_eq!(QueueType::Lab.prefix(), 'L');
        // 未识别的类型回落到通用前缀
        assert_eq!(QueueType::from_str("x-ray").prefix(), 'Q');
    }

    #[test]
    fn test_status_mapping_fallback() {
        assert_eq!(QueueStatus::from_str("in_progress"), QueueStatus::InProgress);
        assert_eq!(QueueStatus::from_str("garbage"), QueueStatus::Waiting);
    }
}

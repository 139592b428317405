//! 队列管理服务
//!
//! 面向页面控制器的统一入口，协调状态机与各存储

use crate::state_machine::QueueStateMachine;
use chrono::NaiveDate;
use hqms_core::{
    AssignmentRequest, AssignmentSchedule, HqmsError, NewQueueEntry, QueueEntry, QueueEntryView,
    QueueStatistics, QueueStatus, QueueTicket, QueueTypeStatistics, RemovalType, Result, Station,
    StationAssignmentView,
};
use hqms_database::{
    AssignmentStore, DatabasePool, QueueStore, StationRegistry, StatisticsAggregator,
};

/// 队列管理服务
#[derive(Debug)]
pub struct QueueManagementService {
    pool: DatabasePool,
    state_machine: QueueStateMachine,
}

impl QueueManagementService {
    /// 创建新的队列管理服务
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            state_machine: QueueStateMachine::new(),
        }
    }

    // ========== 站点 ==========

    /// 按ID查找站点
    pub async fn station(&self, station_id: i64) -> Result<Option<Station>> {
        StationRegistry::new(&self.pool).get(station_id).await
    }

    /// 站点列表
    pub async fn stations(&self, include_inactive: bool) -> Result<Vec<Station>> {
        StationRegistry::new(&self.pool).list(include_inactive).await
    }

    /// 操作员开闭站点
    pub async fn set_station_open(&self, station_id: i64, is_open: bool) -> Result<()> {
        StationRegistry::new(&self.pool)
            .set_open(station_id, is_open)
            .await
    }

    /// 启用或停用站点
    pub async fn set_station_active(&self, station_id: i64, is_active: bool) -> Result<()> {
        StationRegistry::new(&self.pool)
            .set_active(station_id, is_active)
            .await
    }

    // ========== 排班 ==========

    /// 指派员工到站点
    pub async fn assign_employee(&self, request: &AssignmentRequest) -> Result<AssignmentSchedule> {
        AssignmentStore::new(&self.pool).assign(request).await
    }

    /// 撤销站点当前排班
    pub async fn remove_assignment(
        &self,
        station_id: i64,
        removal_date: NaiveDate,
        removal_type: RemovalType,
        performed_by: i64,
    ) -> Result<()> {
        AssignmentStore::new(&self.pool)
            .remove(station_id, removal_date, removal_type, performed_by)
            .await
    }

    /// 将站点当前排班改派给新员工
    pub async fn reassign_station(
        &self,
        station_id: i64,
        new_employee_id: i64,
        reassign_date: NaiveDate,
        assigned_by: i64,
    ) -> Result<AssignmentSchedule> {
        AssignmentStore::new(&self.pool)
            .reassign(station_id, new_employee_id, reassign_date, assigned_by)
            .await
    }

    /// 全部站点及其当日排班，含停用站点
    pub async fn stations_with_assignments(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<StationAssignmentView>> {
        AssignmentStore::new(&self.pool)
            .list_all_with_assignments(as_of)
            .await
    }

    /// 员工某日的排班
    pub async fn employee_assignment(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> Result<Option<AssignmentSchedule>> {
        AssignmentStore::new(&self.pool)
            .get_for_employee(employee_id, date)
            .await
    }

    /// 站点当前排班视图
    pub async fn station_assignment(
        &self,
        station_id: i64,
    ) -> Result<Option<StationAssignmentView>> {
        AssignmentStore::new(&self.pool).get_for_station(station_id).await
    }

    // ========== 队列 ==========

    /// 患者入队
    pub async fn admit(&self, entry: &NewQueueEntry) -> Result<QueueTicket> {
        if let Some(station_id) = entry.station_id {
            // 指定站点入队时校验站点存在
            if self.station(station_id).await?.is_none() {
                return Err(HqmsError::NotFound(format!(
                    "Station {} not found",
                    station_id
                )));
            }
        }

        tracing::info!(
            "Admitting patient {} into {} queue",
            entry.patient_id,
            entry.queue_type.as_str()
        );
        QueueStore::new(&self.pool).create_entry(entry).await
    }

    /// 推进队列条目状态，非法转换在落库前拒绝
    pub async fn advance(
        &self,
        queue_entry_id: i64,
        new_status: QueueStatus,
        employee_id: Option<i64>,
        remarks: Option<&str>,
    ) -> Result<QueueEntry> {
        let store = QueueStore::new(&self.pool);

        let current = store.get_entry(queue_entry_id).await?.ok_or_else(|| {
            HqmsError::NotFound(format!("Queue entry {} not found", queue_entry_id))
        })?;

        self.state_machine.transition(current.status, new_status)?;
        store
            .update_status(queue_entry_id, new_status, employee_id, remarks)
            .await
    }

    /// 站点当日队列
    pub async fn station_queue(&self, station_id: i64) -> Result<Vec<QueueEntryView>> {
        QueueStore::new(&self.pool).get_station_queue(station_id).await
    }

    /// 患者当日在队状态
    pub async fn patient_status(&self, patient_id: i64) -> Result<Option<QueueEntryView>> {
        QueueStore::new(&self.pool).get_patient_status(patient_id).await
    }

    // ========== 统计 ==========

    /// 单站点单日统计
    pub async fn station_statistics(&self, station_id: i64, date: NaiveDate) -> QueueStatistics {
        StatisticsAggregator::new(&self.pool)
            .station_statistics(station_id, date)
            .await
    }

    /// 日期范围内按队列类型汇总
    pub async fn range_statistics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<QueueTypeStatistics> {
        StatisticsAggregator::new(&self.pool)
            .range_statistics(start_date, end_date)
            .await
    }

    /// 获取状态机实例
    pub fn state_machine(&self) -> &QueueStateMachine {
        &self.state_machine
    }
}

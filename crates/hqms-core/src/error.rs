//! 错误定义模块

use thiserror::Error;

/// 排队排班系统统一错误类型
#[derive(Error, Debug)]
pub enum HqmsError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("员工 {employee_id} 已在站点 {station} 持有有效排班")]
    EmployeeAlreadyAssigned { employee_id: i64, station: String },

    #[error("站点 {0} 当前没有有效排班")]
    NoActiveAssignment(i64),

    #[error("无效状态转换: 从 {from} 到 {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 排队排班系统统一结果类型
pub type Result<T> = std::result::Result<T, HqmsError>;

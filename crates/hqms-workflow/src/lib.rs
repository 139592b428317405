//! # HQMS工作流模块
//!
//! 提供排队业务的工作流管理功能，包括：
//! - 队列状态机：约束队列条目的生命周期转换
//! - 队列管理服务：页面控制器使用的统一入口

pub mod service;
pub mod state_machine;

// 重新导出主要类型
pub use service::QueueManagementService;
pub use state_machine::QueueStateMachine;

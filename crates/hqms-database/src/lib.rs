//! # HQMS数据库模块
//!
//! 负责站点、排班与队列数据的存储管理，提供PostgreSQL连接池和各存储的事务化操作。

pub mod assignment;
pub mod config;
pub mod connection;
pub mod models;
pub mod queue;
pub mod schema;
pub mod stations;
pub mod statistics;

// 重新导出主要类型
pub use assignment::AssignmentStore;
pub use config::DatabaseConfig;
pub use connection::DatabasePool;
pub use models::*;
pub use queue::QueueStore;
pub use schema::SchemaManager;
pub use stations::StationRegistry;
pub use statistics::StatisticsAggregator;

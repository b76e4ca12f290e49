//! Link Health Check - 网站链接健康检测工具
//!
//! 对一组固定的URL做一次性检测，支持：
//! - 带重试与超时的HTTP探测
//! - CSV / HTML 报告
//! - 按策略发送SMTP邮件（总是发送或仅在出错时发送）
//! - 追加式运行日志
//! - 结构化日志记录

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod notification;
pub mod report;
pub mod runlog;

// 重新导出主要类型
pub use app::{run_once, RunOutputs, RunStage, RunSummary, StageError};
pub use config::{Config, GlobalConfig, NotificationConfig};
pub use error::LinkCheckError;
pub use health::{CheckOutcome, CheckResult, LinkChecker};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

//! 健康检测模块
//!
//! 提供HTTP探测、链接检测与结果分类功能

pub mod checker;
pub mod prober;
pub mod result;

// 重新导出主要类型
pub use checker::LinkChecker;
pub use prober::{HttpProber, ProbeResponse, Prober};
pub use result::{CheckOutcome, CheckResult};

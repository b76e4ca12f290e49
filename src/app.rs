//! 检测流水线
//!
//! 检测 → 写CSV → 渲染报告 → 按策略通知 → 追加运行日志

use crate::error::LinkCheckError;
use crate::health::{CheckResult, LinkChecker, Prober};
use crate::notification::{MailSender, Notifier, NotifyOutcome};
use crate::report::{csv, Report, ReportRenderer};
use crate::runlog::{RunLog, RunLogEntry};
use chrono::Local;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// 加载配置、解析凭据、构建组件
    Config,
    /// 生成并写入报告
    Report,
    /// 发送通知
    Notify,
    /// 追加运行日志
    RunLog,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Config => write!(f, "config"),
            RunStage::Report => write!(f, "report"),
            RunStage::Notify => write!(f, "notify"),
            RunStage::RunLog => write!(f, "run-log"),
        }
    }
}

/// 带阶段信息的运行失败
#[derive(Error, Debug)]
#[error("{stage} 阶段失败: {source}")]
pub struct StageError {
    /// 失败的阶段
    pub stage: RunStage,
    /// 底层错误
    #[source]
    pub source: LinkCheckError,
}

impl StageError {
    fn new(stage: RunStage, source: impl Into<LinkCheckError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// 输出文件位置
#[derive(Debug, Clone)]
pub struct RunOutputs {
    /// CSV报告路径
    pub csv_path: PathBuf,
    /// 运行日志路径
    pub run_log_path: PathBuf,
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunSummary {
    /// 按输入顺序排列的检测结果
    pub results: Vec<CheckResult>,
    /// 生成的报告
    pub report: Report,
    /// 通知结果，未配置通知器时为 `None`
    pub notification: Option<NotifyOutcome>,
}

/// 执行一次完整的检测流水线
///
/// 单个URL的失败只体现在结果中；报告、通知、日志阶段的失败会终止运行，
/// 已写出的文件保留在磁盘上。
///
/// # 参数
/// * `targets` - 按顺序排列的检测目标
/// * `checker` - 链接检测器
/// * `renderer` - 报告渲染器
/// * `notifier` - 通知器，`None` 表示不发送邮件
/// * `outputs` - 输出文件位置
pub async fn run_once<P, S>(
    targets: &[String],
    checker: &LinkChecker<P>,
    renderer: &ReportRenderer,
    notifier: Option<&Notifier<S>>,
    outputs: &RunOutputs,
) -> Result<RunSummary, StageError>
where
    P: Prober,
    S: MailSender,
{
    info!("开始本轮链接检测，共 {} 个目标", targets.len());

    let results = checker.check_links(targets).await;

    let report = renderer
        .render(&results)
        .map_err(|e| StageError::new(RunStage::Report, e))?;
    csv::write_csv_file(&outputs.csv_path, &report.csv)
        .map_err(|e| StageError::new(RunStage::Report, e))?;

    info!(
        "检测完成: 健康 {} / 错误 {} / 平均响应时间 {}",
        report.summary.healthy_count,
        report.summary.error_count,
        report.summary.average_display()
    );

    let notification = match notifier {
        Some(notifier) => {
            let outcome = notifier.notify(&report).await.map_err(|e| {
                error!("通知发送失败: {}", e);
                StageError::new(RunStage::Notify, e)
            })?;
            Some(outcome)
        }
        None => {
            info!("未启用邮件通知");
            None
        }
    };

    RunLog::new(&outputs.run_log_path)
        .append(&RunLogEntry {
            timestamp: Local::now(),
            error_count: report.error_count(),
        })
        .map_err(|e| StageError::new(RunStage::RunLog, e))?;

    Ok(RunSummary {
        results,
        report,
        notification,
    })
}

//! 报告模块
//!
//! 把检测结果转换为汇总统计、CSV与HTML报告

pub mod csv;
pub mod html;
pub mod summary;

pub use html::HtmlRenderer;
pub use summary::ReportSummary;

use crate::error::ReportError;
use crate::health::CheckResult;
use chrono::{DateTime, Local};

/// 一次运行生成的报告
#[derive(Debug, Clone)]
pub struct Report {
    /// CSV内容
    pub csv: Vec<u8>,
    /// HTML内容
    pub html: String,
    /// 汇总统计
    pub summary: ReportSummary,
    /// 生成时间
    pub generated_at: DateTime<Local>,
}

impl Report {
    /// 错误数量，通知策略唯一依赖的信号
    pub fn error_count(&self) -> usize {
        self.summary.error_count
    }
}

/// 报告渲染器
pub struct ReportRenderer {
    site_name: String,
    html: HtmlRenderer,
}

impl ReportRenderer {
    /// 创建新的报告渲染器
    pub fn new(site_name: impl Into<String>) -> Result<Self, ReportError> {
        Ok(Self {
            site_name: site_name.into(),
            html: HtmlRenderer::new()?,
        })
    }

    /// 以当前时间渲染报告
    pub fn render(&self, results: &[CheckResult]) -> Result<Report, ReportError> {
        self.render_at(results, Local::now())
    }

    /// 以指定时间渲染报告
    pub fn render_at(
        &self,
        results: &[CheckResult],
        generated_at: DateTime<Local>,
    ) -> Result<Report, ReportError> {
        let summary = ReportSummary::from_results(results);
        let csv = csv::csv_bytes(results)?;
        let html = self
            .html
            .render(&self.site_name, results, &summary, generated_at)?;

        Ok(Report {
            csv,
            html,
            summary,
            generated_at,
        })
    }
}

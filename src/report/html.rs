//! HTML报告渲染
//!
//! 使用Handlebars模板生成带汇总信息和状态着色表格的HTML报告

use crate::error::ReportError;
use crate::health::CheckResult;
use crate::report::summary::ReportSummary;
use chrono::{DateTime, Local};
use handlebars::Handlebars;
use serde::Serialize;

/// 健康状态颜色
pub const OK_COLOR: &str = "#28a745";
/// 错误状态颜色
pub const ERROR_COLOR: &str = "#dc3545";

const TEMPLATE_NAME: &str = "report";

const REPORT_TEMPLATE: &str = r#"<html>
<body>
<p><strong>📊 {{site_name}} - Daily Link Check Report</strong><br>
🕒 Date: {{date}}<br>
✅ Healthy Links: {{healthy_count}}<br>
❌ Errors: {{error_count}}<br>
⏱️ Avg Response Time: {{average}}{{#if has_average}}s{{/if}}</p>
<table border="1" cellpadding="5" cellspacing="0">
    <tr><th>URL</th><th>Status</th><th>Response Time</th></tr>
{{#each rows}}
    <tr><td>{{url}}</td><td style="color:{{color}}">{{status}}</td><td>{{response_time}}</td></tr>
{{/each}}
</table>
</body>
</html>
"#;

#[derive(Serialize)]
struct HtmlRow {
    url: String,
    status: String,
    color: &'static str,
    response_time: String,
}

#[derive(Serialize)]
struct HtmlContext<'a> {
    site_name: &'a str,
    date: String,
    healthy_count: usize,
    error_count: usize,
    average: String,
    has_average: bool,
    rows: Vec<HtmlRow>,
}

/// HTML报告渲染器
pub struct HtmlRenderer {
    registry: Handlebars<'static>,
}

impl HtmlRenderer {
    /// 创建渲染器并注册报告模板
    pub fn new() -> Result<Self, ReportError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string(TEMPLATE_NAME, REPORT_TEMPLATE)
            .map_err(|e| ReportError::Template(e.to_string()))?;

        Ok(Self { registry })
    }

    /// 渲染HTML报告
    ///
    /// # 参数
    /// * `site_name` - 站点名称
    /// * `results` - 按顺序排列的检测结果
    /// * `summary` - 汇总统计
    /// * `generated_at` - 报告时间
    pub fn render(
        &self,
        site_name: &str,
        results: &[CheckResult],
        summary: &ReportSummary,
        generated_at: DateTime<Local>,
    ) -> Result<String, ReportError> {
        let rows = results
            .iter()
            .map(|result| HtmlRow {
                url: result.url.clone(),
                status: result.status_label(),
                color: if result.is_error() {
                    ERROR_COLOR
                } else {
                    OK_COLOR
                },
                response_time: result
                    .response_time_secs()
                    .map(|secs| format!("{secs}s"))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        let context = HtmlContext {
            site_name,
            date: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            healthy_count: summary.healthy_count,
            error_count: summary.error_count,
            average: summary.average_display(),
            has_average: summary.average_response_time.is_some(),
            rows,
        };

        self.registry
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| ReportError::Template(e.to_string()))
    }
}

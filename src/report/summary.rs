//! 报告汇总统计

use crate::health::CheckResult;
use serde::Serialize;

/// 一次运行的汇总统计，由检测结果实时计算
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// 检测总数
    pub total_checked: usize,
    /// 健康数量
    pub healthy_count: usize,
    /// 错误数量（HTTP错误与网络错误）
    pub error_count: usize,
    /// 平均响应时间（秒），只统计有响应时间的结果
    pub average_response_time: Option<f64>,
}

impl ReportSummary {
    /// 从检测结果计算汇总
    pub fn from_results(results: &[CheckResult]) -> Self {
        let error_count = results.iter().filter(|r| r.is_error()).count();

        let times: Vec<f64> = results
            .iter()
            .filter_map(CheckResult::response_time_secs)
            .collect();
        let average_response_time = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<f64>() / times.len() as f64)
        };

        Self {
            total_checked: results.len(),
            healthy_count: results.len() - error_count,
            error_count,
            average_response_time,
        }
    }

    /// 是否存在失败
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// 平均响应时间的展示文本，保留三位小数，无数据时为 `-`
    pub fn average_display(&self) -> String {
        match self.average_response_time {
            Some(avg) => format!("{}", (avg * 1000.0).round() / 1000.0),
            None => "-".to_string(),
        }
    }
}

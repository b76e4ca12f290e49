//! 通知策略
//!
//! 决定一次运行是否发送邮件、邮件主题以及是否附带CSV

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 邮件发送策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// 每次运行都发送，主题前缀标识成功/失败，可附带CSV
    #[default]
    Always,
    /// 仅在存在失败时发送固定主题的告警，不带附件
    OnError,
}

impl std::fmt::Display for NotifyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyPolicy::Always => write!(f, "always"),
            NotifyPolicy::OnError => write!(f, "on_error"),
        }
    }
}

impl NotifyPolicy {
    /// 根据错误数判断是否需要发送
    pub fn should_notify(&self, error_count: usize) -> bool {
        match self {
            NotifyPolicy::Always => true,
            NotifyPolicy::OnError => error_count > 0,
        }
    }

    /// 生成邮件主题
    pub fn subject(&self, site_name: &str, error_count: usize) -> String {
        match self {
            NotifyPolicy::Always => {
                let prefix = if error_count > 0 { "❗" } else { "✅" };
                format!("{prefix} {site_name} - Link Health Check")
            }
            NotifyPolicy::OnError => format!("❗ {site_name} - Broken Links Detected"),
        }
    }

    /// 该策略是否允许附带CSV
    pub fn allows_attachment(&self) -> bool {
        matches!(self, NotifyPolicy::Always)
    }
}

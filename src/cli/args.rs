//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::notification::NotifyPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Link Health Check - 网站链接健康检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "link-health-check",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "LINK_CHECK_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别，未指定时使用配置文件中的 `log_level`
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别（覆盖配置文件）",
        env = "LINK_CHECK_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 是否输出JSON格式日志
    #[arg(long, help = "以JSON格式输出日志")]
    pub json_logs: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 执行一次完整检测：写报告、按策略发送邮件、追加运行日志
    Run {
        /// 不发送邮件
        #[arg(long, help = "不发送邮件")]
        no_notify: bool,

        /// 覆盖配置中的通知策略
        #[arg(long, value_enum, help = "通知策略")]
        policy: Option<NotifyPolicy>,
    },

    /// 只检测并打印结果，不写文件、不发邮件
    Check {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "table", help = "输出格式")]
        format: OutputFormat,
    },

    /// 生成示例配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "link-check.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
    /// 表格格式
    Table,
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }

    /// 计算生效的日志级别
    ///
    /// 命令行参数优先，其次是配置文件中的级别，都没有时为 info。
    ///
    /// # 参数
    /// * `config_level` - 配置文件中的 `log_level`（如果能读取到配置）
    pub fn resolve_log_level(&self, config_level: Option<&str>) -> log::LevelFilter {
        if let Some(level) = &self.log_level {
            return level.clone().into();
        }

        config_level
            .and_then(|level| LogLevel::from_str(level, true).ok())
            .map(log::LevelFilter::from)
            .unwrap_or(log::LevelFilter::Info)
    }
}

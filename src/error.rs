//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Link Health Check 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum LinkCheckError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测相关错误
    #[error("探测错误: {0}")]
    Probe(#[from] ProbeError),

    /// 报告生成错误
    #[error("报告错误: {0}")]
    Report(#[from] ReportError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// 流水线阶段失败
    #[error("{0}")]
    Stage(Box<crate::app::StageError>),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<crate::app::StageError> for LinkCheckError {
    fn from(error: crate::app::StageError) -> Self {
        LinkCheckError::Stage(Box::new(error))
    }
}

impl LinkCheckError {
    /// 错误所属的运行阶段
    ///
    /// 流水线内的失败带有明确的阶段；流水线之外的配置、报告、通知错误
    /// 按错误类别归入对应阶段。
    pub fn stage(&self) -> Option<crate::app::RunStage> {
        use crate::app::RunStage;

        match self {
            LinkCheckError::Stage(stage_error) => Some(stage_error.stage),
            LinkCheckError::Config(_) | LinkCheckError::Probe(_) => Some(RunStage::Config),
            LinkCheckError::Report(_) => Some(RunStage::Report),
            LinkCheckError::Notification(_) => Some(RunStage::Notify),
            _ => None,
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 必需的环境变量缺失
    #[error("缺少必需的环境变量: {var}")]
    MissingEnvVar { var: String },

    /// 邮箱地址格式错误
    #[error("无效的邮箱地址 {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// 网络层失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeErrorKind {
    /// 请求超时
    Timeout,
    /// 连接失败（DNS、拒绝连接、TLS握手等）
    Connect,
    /// 重定向过多或重定向无效
    Redirect,
    /// 响应解码失败
    Decode,
    /// 响应体读取失败
    Body,
    /// 其他请求错误
    Request,
}

impl std::fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeErrorKind::Timeout => write!(f, "Timeout"),
            ProbeErrorKind::Connect => write!(f, "ConnectionError"),
            ProbeErrorKind::Redirect => write!(f, "RedirectError"),
            ProbeErrorKind::Decode => write!(f, "DecodeError"),
            ProbeErrorKind::Body => write!(f, "BodyError"),
            ProbeErrorKind::Request => write!(f, "RequestError"),
        }
    }
}

/// 单次探测的网络层错误
///
/// 非预期的HTTP状态码不属于此类错误，它们作为正常响应返回。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} - {message}")]
pub struct ProbeError {
    /// 错误类别
    pub kind: ProbeErrorKind,
    /// 底层错误信息
    pub message: String,
}

impl ProbeError {
    /// 创建新的探测错误
    pub fn new(kind: ProbeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            ProbeErrorKind::Timeout
        } else if error.is_connect() {
            ProbeErrorKind::Connect
        } else if error.is_redirect() {
            ProbeErrorKind::Redirect
        } else if error.is_decode() {
            ProbeErrorKind::Decode
        } else if error.is_body() {
            ProbeErrorKind::Body
        } else {
            ProbeErrorKind::Request
        };

        Self::new(kind, error.to_string())
    }
}

/// 报告生成错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    /// CSV写入失败
    #[error("CSV写入失败: {0}")]
    Csv(#[from] csv::Error),

    /// 模板渲染失败
    #[error("HTML模板渲染失败: {0}")]
    Template(String),

    /// 报告文件写入失败
    #[error("写入文件 {path} 失败: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 邮件构建失败
    #[error("邮件构建失败: {0}")]
    BuildError(String),

    /// SMTP传输或认证失败
    #[error("邮件发送失败: {0}")]
    Transport(String),

    /// 配置错误
    #[error("通知配置错误: {0}")]
    ConfigError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LinkCheckError>;

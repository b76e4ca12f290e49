//! 链接检测结果数据结构
//!
//! 定义单个URL的检测结果与分类

use crate::error::ProbeErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 单个URL的分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// 状态码属于健康集合
    Healthy {
        code: u16,
        #[serde(with = "duration_secs")]
        elapsed: Duration,
    },
    /// 收到响应，但状态码不在健康集合中
    HttpError {
        code: u16,
        #[serde(with = "duration_secs")]
        elapsed: Duration,
    },
    /// 重试耗尽后仍然失败的网络层错误
    NetworkError { kind: ProbeErrorKind, message: String },
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::Healthy { code, .. } => write!(f, "{code} OK"),
            CheckOutcome::HttpError { code, .. } => write!(f, "{code} ERROR"),
            CheckOutcome::NetworkError { kind, message } => {
                write!(f, "RequestError: {kind} - {message}")
            }
        }
    }
}

impl CheckOutcome {
    /// 判断结果是否为健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, CheckOutcome::Healthy { .. })
    }

    /// 请求耗时，网络错误时不存在
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            CheckOutcome::Healthy { elapsed, .. } | CheckOutcome::HttpError { elapsed, .. } => {
                Some(*elapsed)
            }
            CheckOutcome::NetworkError { .. } => None,
        }
    }

    /// HTTP状态码（如果收到响应）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CheckOutcome::Healthy { code, .. } | CheckOutcome::HttpError { code, .. } => {
                Some(*code)
            }
            CheckOutcome::NetworkError { .. } => None,
        }
    }
}

/// 单个检测目标的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// 检测的URL
    pub url: String,
    /// 分类结果
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckResult {
    /// 创建新的检测结果
    pub fn new(url: impl Into<String>, outcome: CheckOutcome) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }

    /// 状态标签，例如 `200 OK`、`404 ERROR`
    pub fn status_label(&self) -> String {
        self.outcome.to_string()
    }

    /// 响应时间（秒），网络错误时为 `None`
    pub fn response_time_secs(&self) -> Option<f64> {
        self.outcome.elapsed().map(|d| d.as_secs_f64())
    }

    /// 是否计入错误数
    pub fn is_error(&self) -> bool {
        !self.outcome.is_healthy()
    }
}

/// 以秒（浮点数）序列化Duration
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

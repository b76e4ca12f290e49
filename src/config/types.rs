//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use crate::error::ConfigError;
use crate::notification::NotifyPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 主配置结构，包含全局配置、通知配置和检测目标列表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 通知配置
    #[serde(default)]
    pub notification: NotificationConfig,
    /// 按顺序检测的URL列表
    pub targets: Vec<String>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 站点名称（用于报告标题与邮件主题）
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// 单次请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// 网络失败后的额外重试次数
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// 请求使用的User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// 视为健康的状态码
    #[serde(default = "default_healthy_status_codes")]
    pub healthy_status_codes: Vec<u16>,
    /// CSV报告路径（每次运行覆盖）
    #[serde(default = "default_report_csv_path")]
    pub report_csv_path: PathBuf,
    /// 运行日志路径（追加写入）
    #[serde(default = "default_run_log_path")]
    pub run_log_path: PathBuf,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// 邮件通知配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// 是否启用邮件通知
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 发送策略
    #[serde(default)]
    pub policy: NotifyPolicy,
    /// 是否附带CSV报告（仅 always 策略生效）
    #[serde(default = "default_enabled")]
    pub attach_csv: bool,
    /// SMTP中继主机
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP端口（隐式TLS）
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            request_timeout_seconds: default_timeout(),
            retry_attempts: default_retry_attempts(),
            user_agent: default_user_agent(),
            healthy_status_codes: default_healthy_status_codes(),
            report_csv_path: default_report_csv_path(),
            run_log_path: default_run_log_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            policy: NotifyPolicy::default(),
            attach_csv: default_enabled(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

// 默认值函数
fn default_site_name() -> String {
    "Website".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_retry_attempts() -> u32 {
    2
}
/// 默认的User-Agent
pub fn default_user_agent() -> String {
    "Mozilla/5.0 (LinkCheckerBot/1.0)".to_string()
}
fn default_healthy_status_codes() -> Vec<u16> {
    vec![200, 301, 302]
}
fn default_report_csv_path() -> PathBuf {
    PathBuf::from("report.csv")
}
fn default_run_log_path() -> PathBuf {
    PathBuf::from("link_check_log.txt")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_enabled() -> bool {
    true
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    465
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.site_name.trim().is_empty() {
        return Err("站点名称不能为空".to_string());
    }

    if config.global.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    if config.global.healthy_status_codes.is_empty() {
        return Err("至少需要一个健康状态码".to_string());
    }

    for code in &config.global.healthy_status_codes {
        if !(100..=599).contains(code) {
            return Err(format!("无效的HTTP状态码: {code}"));
        }
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    if config.notification.enabled {
        if config.notification.smtp_host.trim().is_empty() {
            return Err("SMTP主机不能为空".to_string());
        }
        if config.notification.smtp_port == 0 {
            return Err("SMTP端口不能为0".to_string());
        }
    }

    if config.targets.is_empty() {
        return Err("至少需要配置一个检测目标".to_string());
    }

    for target in &config.targets {
        if !target.starts_with("http://") && !target.starts_with("https://") {
            return Err(format!("检测目标 {target} 的URL格式无效"));
        }
    }

    Ok(())
}

/// SMTP登录凭据与收件人，进程启动时从环境变量解析一次
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    /// 登录用户，同时作为发件人
    pub user: String,
    /// 登录密码
    pub pass: String,
    /// 收件人
    pub to: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .field("to", &self.to)
            .finish()
    }
}

impl SmtpCredentials {
    /// 发件账号环境变量
    pub const USER_VAR: &'static str = "SMTP_USER";
    /// 密码环境变量
    pub const PASS_VAR: &'static str = "SMTP_PASS";
    /// 收件人环境变量
    pub const TO_VAR: &'static str = "EMAIL_TO";

    /// 从进程环境变量读取凭据
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过自定义查找函数读取凭据，缺失或为空的变量视为配置错误
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar {
                    var: name.to_string(),
                })
        };

        Ok(Self {
            user: require(Self::USER_VAR)?,
            pass: require(Self::PASS_VAR)?,
            to: require(Self::TO_VAR)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_config() -> Config {
        Config {
            global: GlobalConfig::default(),
            notification: NotificationConfig::default(),
            targets: vec![
                "https://a.test/ok".to_string(),
                "https://a.test/missing".to_string(),
            ],
        }
    }

    #[test]
    fn test_defaults() {
        let global = GlobalConfig::default();
        assert_eq!(global.request_timeout_seconds, 10);
        assert_eq!(global.retry_attempts, 2);
        assert_eq!(global.healthy_status_codes, vec![200, 301, 302]);
        assert_eq!(global.report_csv_path, PathBuf::from("report.csv"));
        assert_eq!(global.run_log_path, PathBuf::from("link_check_log.txt"));

        let notification = NotificationConfig::default();
        assert_eq!(notification.smtp_port, 465);
        assert_eq!(notification.policy, NotifyPolicy::Always);
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&create_test_config()).is_ok());
    }

    #[test]
    fn test_empty_targets_rejected() {
        let mut config = create_test_config();
        config.targets.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_target_url_rejected() {
        let mut config = create_test_config();
        config.targets.push("ftp://a.test/file".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(err.contains("ftp://a.test/file"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = create_test_config();
        config.global.request_timeout_seconds = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_smtp_settings_ignored_when_disabled() {
        let mut config = create_test_config();
        config.notification.enabled = false;
        config.notification.smtp_host = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_credentials_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("SMTP_USER", "bot@a.test"),
            ("SMTP_PASS", "secret"),
            ("EMAIL_TO", "ops@a.test"),
        ]
        .into_iter()
        .collect();

        let creds = SmtpCredentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.user, "bot@a.test");
        assert_eq!(creds.to, "ops@a.test");
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn test_missing_email_to_is_config_error() {
        let vars: HashMap<&str, &str> = [("SMTP_USER", "bot@a.test"), ("SMTP_PASS", "secret")]
            .into_iter()
            .collect();

        let err = SmtpCredentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        match err {
            ConfigError::MissingEnvVar { var } => assert_eq!(var, "EMAIL_TO"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let err = SmtpCredentials::from_lookup(|k| {
            Some(if k == "SMTP_PASS" { "  " } else { "x@a.test" }.to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("SMTP_PASS"));
    }
}

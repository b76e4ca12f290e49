//! 配置加载器实现
//!
//! 读取TOML配置文件，展开 `${VAR}` 形式的环境变量并校验结果

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载并通过校验的配置，文件缺失时返回 `FileNotFound`
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - TOML文本
    ///
    /// # 返回
    /// * `Result<Config>` - 加载并通过校验的配置
    async fn load_from_string(&self, content: &str) -> Result<Config>;

    /// 验证配置
    ///
    /// # 参数
    /// * `config` - 要验证的配置
    ///
    /// # 返回
    /// * `Result<()>` - 校验失败时返回 `ValidationError`
    fn validate(&self, config: &Config) -> Result<()>;
}

/// TOML配置加载器
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否展开 `${VAR}` 占位符
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否展开环境变量占位符
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 展开文本中的 `${VAR}` 占位符
    ///
    /// 任何一个变量未设置都会使整个加载失败，错误中带有第一个缺失的变量名。
    fn expand_placeholders(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let placeholder = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut missing: Option<String> = None;
        let expanded = placeholder.replace_all(content, |caps: &Captures| {
            let var = &caps[1];
            std::env::var(var).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var.to_string());
                String::new()
            })
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarError { var }.into()),
            None => Ok(expanded.into_owned()),
        }
    }

    /// 展开占位符、解析TOML并校验
    fn build_config(&self, content: &str) -> Result<Config> {
        let expanded = self.expand_placeholders(content)?;
        let config: Config = toml::from_str(&expanded)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?;

        self.validate(&config)?;
        Ok(config)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(ConfigError::ParseError(format!(
                    "读取 {} 失败: {e}",
                    path.display()
                ))
                .into());
            }
        };

        let config = self.build_config(&content)?;
        log::info!(
            "已加载配置 {}: {} 个检测目标",
            path.display(),
            config.targets.len()
        );

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<Config> {
        self.build_config(content)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 获取默认配置文件路径
///
/// 优先使用当前目录下的 `link-check.toml`，否则使用用户配置目录。
pub fn get_default_config_path() -> PathBuf {
    let local = PathBuf::from("link-check.toml");
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join("link-health-check").join("config.toml"))
        .unwrap_or(local)
}

/// `init` 命令生成的示例配置
pub fn sample_config() -> String {
    r#"targets = [
    "https://swimmersweb.com/",
    "https://swimmersweb.com/register",
    "https://swimmersweb.com/login",
    "https://swimmersweb.com/favorites",
    "https://swimmersweb.com/profile",
    "https://swimmersweb.com/privacy-policy",
    "https://swimmersweb.com/terms-conditions",
    "https://swimmersweb.com/contact",
    "https://swimmersweb.com/services",
    "https://swimmersweb.com/swimmer-search",
    "https://swimmersweb.com/swimmer-report",
    "https://swimmersweb.com/team-search",
    "https://swimmersweb.com/team-member-search",
    "https://swimmersweb.com/meet-search",
    "https://swimmersweb.com/meet-detail",
    "https://swimmersweb.com/motivational-time",
    "https://swimmersweb.com/swim-compare",
    "https://swimmersweb.com/tools",
    "https://swimmersweb.com/upcoming-meet",
    "https://swimmersweb.com/lap-timer",
]

[global]
site_name = "SwimmersWeb"
request_timeout_seconds = 10
retry_attempts = 2
user_agent = "Mozilla/5.0 (LinkCheckerBot/1.0)"
healthy_status_codes = [200, 301, 302]
report_csv_path = "report.csv"
run_log_path = "link_check_log.txt"
log_level = "info"

# SMTP_USER / SMTP_PASS / EMAIL_TO 从环境变量读取
[notification]
enabled = true
# always: 每次运行都发送并附带CSV; on_error: 仅在存在失败时发送
policy = "always"
attach_csv = true
smtp_host = "smtp.gmail.com"
smtp_port = 465
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotifyPolicy;
    use serial_test::serial;
    use std::env;

    const TEST_CONFIG_TOML: &str = r#"
targets = ["https://a.test/ok", "https://a.test/missing"]

[global]
site_name = "A Test"
request_timeout_seconds = 5

[notification]
policy = "on_error"
"#;

    #[tokio::test]
    async fn test_toml_parsing() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(TEST_CONFIG_TOML).await.unwrap();

        assert_eq!(config.global.site_name, "A Test");
        assert_eq!(config.global.request_timeout_seconds, 5);
        assert_eq!(config.global.retry_attempts, 2);
        assert_eq!(config.notification.policy, NotifyPolicy::OnError);
        assert_eq!(
            config.targets,
            vec!["https://a.test/ok", "https://a.test/missing"]
        );
    }

    #[tokio::test]
    async fn test_targets_only_config_uses_defaults() {
        let loader = TomlConfigLoader::new(false);
        let config = loader
            .load_from_string(r#"targets = ["https://a.test/"]"#)
            .await
            .unwrap();

        assert_eq!(config.global.healthy_status_codes, vec![200, 301, 302]);
        assert!(config.notification.enabled);
        assert_eq!(config.notification.smtp_host, "smtp.gmail.com");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution() {
        env::set_var("LINK_CHECK_TEST_HOST", "mail.a.test");

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(
                r#"
targets = ["https://a.test/"]

[notification]
smtp_host = "${LINK_CHECK_TEST_HOST}"
"#,
            )
            .await
            .unwrap();

        assert_eq!(config.notification.smtp_host, "mail.a.test");

        env::remove_var("LINK_CHECK_TEST_HOST");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution_repeated_placeholder() {
        env::set_var("LINK_CHECK_TEST_DOMAIN", "b.test");

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(
                r#"
targets = ["https://${LINK_CHECK_TEST_DOMAIN}/", "https://${LINK_CHECK_TEST_DOMAIN}/login"]
"#,
            )
            .await
            .unwrap();

        assert_eq!(
            config.targets,
            vec!["https://b.test/", "https://b.test/login"]
        );

        env::remove_var("LINK_CHECK_TEST_DOMAIN");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution_missing_var() {
        let loader = TomlConfigLoader::new(true);
        let result = loader
            .load_from_string(
                r#"
targets = ["https://a.test/"]

[global]
site_name = "${LINK_CHECK_MISSING_VAR}"
"#,
            )
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("LINK_CHECK_MISSING_VAR"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("targets = []").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_file("/nonexistent/link-check.toml").await;
        assert!(result.unwrap_err().to_string().contains("不存在"));
    }

    #[tokio::test]
    async fn test_sample_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, sample_config()).await.unwrap();

        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_file(&path).await.unwrap();

        assert_eq!(config.targets.len(), 20);
        assert_eq!(config.targets[0], "https://swimmersweb.com/");
        assert_eq!(config.global.site_name, "SwimmersWeb");
    }

    #[test]
    fn test_expand_placeholders_disabled() {
        let loader = TomlConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.expand_placeholders(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        let text = path.to_string_lossy();
        assert!(text.ends_with("link-check.toml") || text.ends_with("config.toml"));
    }
}

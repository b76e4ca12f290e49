//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::app::{run_once, RunOutputs};
use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{sample_config, Config, ConfigLoader, SmtpCredentials, TomlConfigLoader};
use crate::error::Result;
use crate::health::{CheckResult, HttpProber, LinkChecker};
use crate::logging::LoggingSystem;
use crate::notification::{Notifier, NotifyOutcome, NotifyPolicy, SmtpMailSender};
use crate::report::{ReportRenderer, ReportSummary};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 加载配置文件
async fn load_config(path: &Path) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);
    loader.load_from_file(path).await
}

/// 根据配置创建链接检测器
pub fn build_checker(config: &Config) -> Result<LinkChecker<HttpProber>> {
    let prober = HttpProber::new(
        Duration::from_secs(config.global.request_timeout_seconds),
        &config.global.user_agent,
    )?;

    Ok(LinkChecker::new(
        prober,
        config.global.retry_attempts,
        config.global.healthy_status_codes.clone(),
    ))
}

/// 根据配置与凭据创建邮件通知器
pub fn build_notifier(
    config: &Config,
    credentials: &SmtpCredentials,
) -> Result<Notifier<SmtpMailSender>> {
    let sender = SmtpMailSender::new(
        &config.notification.smtp_host,
        config.notification.smtp_port,
        credentials,
    )?;

    Ok(Notifier::new(
        sender,
        config.notification.policy,
        config.notification.attach_csv,
        config.global.site_name.clone(),
    ))
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                _ => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(config_path, sample_config()).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑 targets 列表，并设置 SMTP_USER / SMTP_PASS / EMAIL_TO 环境变量");

        Ok(())
    }
}

/// 验证配置命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { config_path } = &args.command {
            let path = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());
            println!("验证配置文件: {}", path.display());

            let config = load_config(&path).await?;

            println!("✓ 配置文件验证通过");
            println!("✓ 站点: {}", config.global.site_name);
            println!("✓ 找到 {} 个检测目标", config.targets.len());
            println!(
                "✓ 通知: {}",
                if config.notification.enabled {
                    config.notification.policy.to_string()
                } else {
                    "disabled".to_string()
                }
            );
        }
        Ok(())
    }
}

/// 检测命令：只打印结果
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { format } = &args.command {
            let config = load_config(&args.get_config_path()).await?;
            let checker = build_checker(&config)?;

            let results = checker.check_links(&config.targets).await;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
                OutputFormat::Table => print_table_results(&results),
                OutputFormat::Text => {
                    for result in &results {
                        println!("{} {}", result.url, result.status_label());
                    }
                }
            }

            let summary = ReportSummary::from_results(&results);
            println!(
                "\n健康: {}  错误: {}  平均响应时间: {}",
                summary.healthy_count,
                summary.error_count,
                summary.average_display()
            );
        }
        Ok(())
    }
}

/// 以表格形式打印检测结果
fn print_table_results(results: &[CheckResult]) {
    println!("{:<50} {:<40} {:<10}", "URL", "Status", "Response Time");
    println!("{}", "-".repeat(100));

    for result in results {
        let response_time = result
            .response_time_secs()
            .map(|secs| format!("{secs:.3}s"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<50} {:<40} {:<10}",
            result.url,
            result.status_label(),
            response_time
        );
    }
}

/// 运行命令：完整流水线
pub struct RunCommand<'a> {
    /// 日志系统句柄
    pub logging: &'a LoggingSystem,
}

#[async_trait]
impl Command for RunCommand<'_> {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Run { no_notify, policy } = &args.command {
            let mut config = load_config(&args.get_config_path()).await?;
            if let Some(policy) = policy {
                config.notification.policy = *policy;
            }

            // 凭据在探测之前解析，缺失时立即失败
            let notifier = if config.notification.enabled && !*no_notify {
                let credentials = SmtpCredentials::from_env()?;
                Some(build_notifier(&config, &credentials)?)
            } else {
                None
            };

            let checker = build_checker(&config)?;
            let renderer = ReportRenderer::new(config.global.site_name.clone())?;
            let outputs = RunOutputs {
                csv_path: config.global.report_csv_path.clone(),
                run_log_path: config.global.run_log_path.clone(),
            };

            let summary = run_once(
                &config.targets,
                &checker,
                &renderer,
                notifier.as_ref(),
                &outputs,
            )
            .await?;

            self.logging
                .run_summary_log(&summary.report.summary, summary.notification);

            println!(
                "检测完成: {} 个链接, 健康 {}, 错误 {}",
                summary.report.summary.total_checked,
                summary.report.summary.healthy_count,
                summary.report.summary.error_count
            );
            println!("CSV报告: {}", outputs.csv_path.display());
            match summary.notification {
                Some(NotifyOutcome::Sent) => println!("报告邮件已发送"),
                Some(NotifyOutcome::Skipped) => {
                    if config.notification.policy == NotifyPolicy::OnError {
                        println!("没有失败的链接，未发送邮件");
                    }
                }
                None => info!("邮件通知已关闭"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RunStage;
    use crate::logging::LogConfig;
    use clap::Parser;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("link-check.toml");
        let content = format!(
            r#"targets = ["http://127.0.0.1:9/"]

[global]
report_csv_path = '{}'
run_log_path = '{}'
"#,
            dir.path().join("report.csv").display(),
            dir.path().join("link_check_log.txt").display()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    #[serial]
    async fn test_run_fails_at_config_stage_without_credentials() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir);
        for var in [
            SmtpCredentials::USER_VAR,
            SmtpCredentials::PASS_VAR,
            SmtpCredentials::TO_VAR,
        ] {
            std::env::remove_var(var);
        }

        let args = Args::try_parse_from([
            "link-health-check",
            "--config",
            config_path.to_str().unwrap(),
            "run",
        ])
        .unwrap();
        let logging = LoggingSystem::setup_logging(LogConfig::default()).unwrap();

        let error = RunCommand { logging: &logging }
            .execute(&args)
            .await
            .unwrap_err();

        assert_eq!(error.stage(), Some(RunStage::Config));
        assert!(error.to_string().contains(SmtpCredentials::USER_VAR));
        // 凭据缺失时不应开始检测
        assert!(!dir.path().join("report.csv").exists());
        assert!(!dir.path().join("link_check_log.txt").exists());
    }

    #[tokio::test]
    #[serial]
    async fn test_init_does_not_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("link-check.toml");
        std::fs::write(&path, "targets = []").unwrap();

        let args = Args::try_parse_from([
            "link-health-check",
            "init",
            path.to_str().unwrap(),
        ])
        .unwrap();
        InitCommand.execute(&args).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "targets = []");

        let args = Args::try_parse_from([
            "link-health-check",
            "init",
            path.to_str().unwrap(),
            "--force",
        ])
        .unwrap();
        InitCommand.execute(&args).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), sample_config());
    }
}

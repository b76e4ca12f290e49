//! Link Health Check 主程序入口
//!
//! 网站链接健康检测工具

use anyhow::{Context, Result};
use clap::Parser;
use link_health_check::cli::args::{Args, Commands};
use link_health_check::cli::commands::{
    CheckCommand, Command, InitCommand, RunCommand, ValidateCommand, VersionCommand,
};
use link_health_check::config::{ConfigLoader, TomlConfigLoader};
use link_health_check::error::LinkCheckError;
use link_health_check::logging::{LogConfig, LoggingSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统，命令行未指定级别时使用配置文件中的级别
    let config_level = peek_config_log_level(&args).await;
    let log_config = LogConfig {
        level: args.resolve_log_level(config_level.as_deref()),
        json_format: args.json_logs,
    };

    let logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!("Link Health Check v{} 启动", link_health_check::VERSION);

    // 执行命令
    if let Err(e) = execute_command(&args, &logging_system).await {
        match (&e, e.stage()) {
            (LinkCheckError::Stage(stage_error), _) => {
                error!("运行在 {} 阶段失败: {}", stage_error.stage, stage_error.source);
            }
            (_, Some(stage)) => error!("运行在 {} 阶段失败: {}", stage, e),
            (_, None) => error!("命令执行失败: {}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

/// 读取配置文件中的日志级别
///
/// 此时日志系统尚未初始化，读取失败直接忽略，由具体命令再报告配置错误。
async fn peek_config_log_level(args: &Args) -> Option<String> {
    if args.log_level.is_some() || matches!(args.command, Commands::Init { .. }) {
        return None;
    }

    let path = match &args.command {
        Commands::Validate {
            config_path: Some(path),
        } => path.clone(),
        _ => args.get_config_path(),
    };

    TomlConfigLoader::new(true)
        .load_from_file(path)
        .await
        .ok()
        .map(|config| config.global.log_level)
}

/// 执行CLI命令
async fn execute_command(
    args: &Args,
    logging_system: &LoggingSystem,
) -> link_health_check::error::Result<()> {
    match &args.command {
        Commands::Run { .. } => {
            let command = RunCommand {
                logging: logging_system,
            };
            command.execute(args).await
        }
        Commands::Check { .. } => CheckCommand.execute(args).await,
        Commands::Init { .. } => InitCommand.execute(args).await,
        Commands::Validate { .. } => ValidateCommand.execute(args).await,
        Commands::Version { .. } => VersionCommand.execute(args).await,
    }
}

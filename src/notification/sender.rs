//! 邮件发送器模块
//!
//! 定义邮件发送的trait和SMTP实现

use crate::config::SmtpCredentials;
use crate::error::{NotificationError, Result};
use crate::notification::email::{parse_mailbox, parse_recipients, OutgoingEmail};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, error, info};

/// 邮件发送器trait
#[async_trait]
pub trait MailSender: Send + Sync {
    /// 发送一封邮件
    ///
    /// # 参数
    /// * `email` - 待发送的邮件
    ///
    /// # 返回
    /// * `Result<(), NotificationError>` - 发送结果，传输与认证失败不会被吞掉
    async fn send(&self, email: &OutgoingEmail) -> std::result::Result<(), NotificationError>;
}

/// 通过隐式TLS的SMTP中继发送邮件
///
/// 未启用连接池，每次发送都会建立连接、认证、发送一封邮件后关闭连接。
pub struct SmtpMailSender {
    /// SMTP传输
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// 发件人
    from: Mailbox,
    /// 收件人
    to: Vec<Mailbox>,
    /// 中继地址，仅用于日志
    relay: String,
}

impl SmtpMailSender {
    /// 创建新的SMTP发送器
    ///
    /// # 参数
    /// * `host` - SMTP中继主机
    /// * `port` - SMTP端口（隐式TLS）
    /// * `credentials` - 登录凭据与收件人
    pub fn new(host: &str, port: u16, credentials: &SmtpCredentials) -> Result<Self> {
        let from = parse_mailbox(&credentials.user)?;
        let to = parse_recipients(&credentials.to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| NotificationError::ConfigError(format!("无效的SMTP中继 {host}: {e}")))?
            .port(port)
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.pass.clone(),
            ))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            relay: format!("{host}:{port}"),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, email: &OutgoingEmail) -> std::result::Result<(), NotificationError> {
        let message = email.to_message(&self.from, &self.to)?;

        debug!("通过 {} 发送邮件: {}", self.relay, email.subject);

        match self.transport.send(message).await {
            Ok(response) => {
                info!("邮件发送成功: {:?}", response.code());
                Ok(())
            }
            Err(e) => {
                error!("邮件发送失败: {}", e);
                Err(NotificationError::Transport(e.to_string()))
            }
        }
    }
}

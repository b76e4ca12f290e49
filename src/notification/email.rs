//! 邮件内容构建
//!
//! 根据报告与策略生成待发送的邮件，并转换为MIME消息

use crate::error::{ConfigError, NotificationError};
use crate::notification::policy::NotifyPolicy;
use crate::report::Report;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;

/// 附件文件名
pub const ATTACHMENT_NAME: &str = "report.csv";

/// 邮件附件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    /// 文件名
    pub filename: String,
    /// MIME类型
    pub content_type: String,
    /// 原始字节
    pub content: Vec<u8>,
}

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// 主题
    pub subject: String,
    /// HTML正文
    pub html: String,
    /// 可选的CSV附件
    pub attachment: Option<EmailAttachment>,
}

impl OutgoingEmail {
    /// 按策略组装邮件
    ///
    /// # 参数
    /// * `policy` - 发送策略
    /// * `attach_csv` - 是否附带CSV（仅 always 策略生效）
    /// * `site_name` - 站点名称
    /// * `report` - 本次运行的报告
    pub fn compose(
        policy: NotifyPolicy,
        attach_csv: bool,
        site_name: &str,
        report: &Report,
    ) -> Self {
        let attachment = (attach_csv && policy.allows_attachment()).then(|| EmailAttachment {
            filename: ATTACHMENT_NAME.to_string(),
            content_type: "text/csv".to_string(),
            content: report.csv.clone(),
        });

        Self {
            subject: policy.subject(site_name, report.error_count()),
            html: report.html.clone(),
            attachment,
        }
    }

    /// 转换为multipart MIME消息
    pub fn to_message(&self, from: &Mailbox, to: &[Mailbox]) -> Result<Message, NotificationError> {
        let mut builder = Message::builder().from(from.clone()).subject(&self.subject);
        for recipient in to {
            builder = builder.to(recipient.clone());
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(self.html.clone()));
        if let Some(attachment) = &self.attachment {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| NotificationError::BuildError(e.to_string()))?;
            body = body.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }

        builder
            .multipart(body)
            .map_err(|e| NotificationError::BuildError(e.to_string()))
    }
}

/// 解析单个邮箱地址
pub fn parse_mailbox(address: &str) -> Result<Mailbox, ConfigError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| ConfigError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// 解析逗号分隔的收件人列表
pub fn parse_recipients(addresses: &str) -> Result<Vec<Mailbox>, ConfigError> {
    let recipients = addresses
        .split(',')
        .filter(|a| !a.trim().is_empty())
        .map(parse_mailbox)
        .collect::<Result<Vec<_>, _>>()?;

    if recipients.is_empty() {
        return Err(ConfigError::InvalidAddress {
            address: addresses.to_string(),
            reason: "收件人列表为空".to_string(),
        });
    }

    Ok(recipients)
}

//! 通知模块
//!
//! 根据策略决定是否发送报告邮件，并通过SMTP发送

pub mod email;
pub mod policy;
pub mod sender;

// 重新导出主要类型
pub use email::{EmailAttachment, OutgoingEmail};
pub use policy::NotifyPolicy;
pub use sender::{MailSender, SmtpMailSender};

use crate::error::NotificationError;
use crate::report::Report;
use tracing::info;

/// 一次通知的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// 已发送
    Sent,
    /// 策略判定无需发送
    Skipped,
}

/// 报告通知器
pub struct Notifier<S: MailSender> {
    /// 邮件发送器
    sender: S,
    /// 发送策略
    policy: NotifyPolicy,
    /// 是否附带CSV
    attach_csv: bool,
    /// 站点名称
    site_name: String,
}

impl<S: MailSender> Notifier<S> {
    /// 创建新的通知器
    pub fn new(
        sender: S,
        policy: NotifyPolicy,
        attach_csv: bool,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            policy,
            attach_csv,
            site_name: site_name.into(),
        }
    }

    /// 当前策略
    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// 底层邮件发送器
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// 按策略发送报告
    ///
    /// # 参数
    /// * `report` - 本次运行的报告
    ///
    /// # 返回
    /// * `Result<NotifyOutcome, NotificationError>` - 是否发送；发送失败时返回错误
    pub async fn notify(&self, report: &Report) -> Result<NotifyOutcome, NotificationError> {
        let error_count = report.error_count();

        if !self.policy.should_notify(error_count) {
            info!("策略 {} 下无需发送通知 (错误数: {})", self.policy, error_count);
            return Ok(NotifyOutcome::Skipped);
        }

        let email = OutgoingEmail::compose(self.policy, self.attach_csv, &self.site_name, report);
        self.sender.send(&email).await?;

        info!("报告邮件已发送: {}", email.subject);
        Ok(NotifyOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckOutcome, CheckResult};
    use crate::report::ReportRenderer;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl MailSender for RecordingSender {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Transport(
                    "535 authentication failed".to_string(),
                ));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn build_report(codes: &[u16]) -> Report {
        let results: Vec<CheckResult> = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                let elapsed = Duration::from_millis(100 * (i as u64 + 1));
                let outcome = if code == 200 {
                    CheckOutcome::Healthy { code, elapsed }
                } else {
                    CheckOutcome::HttpError { code, elapsed }
                };
                CheckResult::new(format!("https://{i}.test/"), outcome)
            })
            .collect();
        ReportRenderer::new("Site").unwrap().render(&results).unwrap()
    }

    #[tokio::test]
    async fn test_on_error_policy_fires_with_errors() {
        let notifier =
            Notifier::new(RecordingSender::default(), NotifyPolicy::OnError, true, "Site");
        let report = build_report(&[200, 500]);
        assert_eq!(report.error_count(), 1);

        let outcome = notifier.notify(&report).await.unwrap();
        assert_eq!(outcome, NotifyOutcome::Sent);

        let sent = notifier.sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].attachment.is_none());
    }

    #[tokio::test]
    async fn test_on_error_policy_skips_all_ok() {
        let notifier =
            Notifier::new(RecordingSender::default(), NotifyPolicy::OnError, true, "Site");
        let outcome = notifier.notify(&build_report(&[200, 200])).await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Skipped);
        assert!(notifier.sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_always_policy_sends_success_report() {
        let notifier =
            Notifier::new(RecordingSender::default(), NotifyPolicy::Always, true, "Site");
        let outcome = notifier.notify(&build_report(&[200])).await.unwrap();

        assert_eq!(outcome, NotifyOutcome::Sent);
        let sent = notifier.sender.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "✅ Site - Link Health Check");
        assert!(sent[0].attachment.is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let sender = RecordingSender {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(sender, NotifyPolicy::Always, false, "Site");

        let err = notifier.notify(&build_report(&[500])).await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
    }
}

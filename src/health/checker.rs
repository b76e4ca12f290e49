//! 链接检测器实现
//!
//! 依次探测所有目标并把结果分类，单个目标的失败不会中断整次运行

use crate::health::prober::Prober;
use crate::health::result::{CheckOutcome, CheckResult};
use tracing::{info, warn};

/// 链接检测器
pub struct LinkChecker<P: Prober> {
    /// 探测器
    prober: P,
    /// 网络失败后的额外重试次数
    max_retries: u32,
    /// 视为健康的状态码
    healthy_codes: Vec<u16>,
}

impl<P: Prober> LinkChecker<P> {
    /// 创建新的链接检测器
    ///
    /// # 参数
    /// * `prober` - 探测器
    /// * `max_retries` - 额外重试次数
    /// * `healthy_codes` - 健康状态码集合
    pub fn new(prober: P, max_retries: u32, healthy_codes: Vec<u16>) -> Self {
        Self {
            prober,
            max_retries,
            healthy_codes,
        }
    }

    /// 按状态码分类
    pub fn classify(&self, status_code: u16, elapsed: std::time::Duration) -> CheckOutcome {
        if self.healthy_codes.contains(&status_code) {
            CheckOutcome::Healthy {
                code: status_code,
                elapsed,
            }
        } else {
            CheckOutcome::HttpError {
                code: status_code,
                elapsed,
            }
        }
    }

    /// 检测单个目标
    pub async fn check_one(&self, url: &str) -> CheckResult {
        let outcome = match self.prober.probe(url, self.max_retries).await {
            Ok(response) => self.classify(response.status_code, response.elapsed),
            Err(e) => CheckOutcome::NetworkError {
                kind: e.kind,
                message: e.message,
            },
        };

        if outcome.is_healthy() {
            info!("{} -> {}", url, outcome);
        } else {
            warn!("{} -> {}", url, outcome);
        }

        CheckResult::new(url, outcome)
    }

    /// 按输入顺序依次检测所有目标，每个目标产生且只产生一个结果
    pub async fn check_links(&self, targets: &[String]) -> Vec<CheckResult> {
        info!("开始检测 {} 个链接", targets.len());

        let mut results = Vec::with_capacity(targets.len());
        for url in targets {
            results.push(self.check_one(url).await);
        }

        results
    }
}

//! HTTP探测器实现
//!
//! 对单个URL发起GET请求，网络层失败时按次数重试

use crate::error::{ProbeError, ProbeErrorKind};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// 一次成功请求的响应摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 本次请求的耗时
    pub elapsed: Duration,
}

/// 探测器trait
///
/// 实现者只需提供单次请求 `fetch`，重试策略由 `probe` 统一处理。
#[async_trait]
pub trait Prober: Send + Sync {
    /// 执行一次请求，任何状态码都视为成功响应
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, ProbeError>;

    /// 执行请求，网络失败时最多额外重试 `max_retries` 次
    ///
    /// # 参数
    /// * `url` - 目标URL
    /// * `max_retries` - 额外重试次数
    ///
    /// # 返回
    /// * `Result<ProbeResponse, ProbeError>` - 响应，或最后一次尝试的网络错误
    async fn probe(&self, url: &str, max_retries: u32) -> Result<ProbeResponse, ProbeError> {
        let mut attempt = 0;
        loop {
            match self.fetch(url).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt >= max_retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    debug!("请求 {} 失败 ({})，进行第 {} 次重试", url, e, attempt);
                }
            }
        }
    }
}

/// 基于reqwest的HTTP探测器
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 参数
    /// * `timeout` - 单次请求超时时间
    /// * `user_agent` - 请求使用的User-Agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProbeError::new(ProbeErrorKind::Request, e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let start_time = Instant::now();
        let response = self.client.get(url).send().await?;
        let elapsed = start_time.elapsed();

        Ok(ProbeResponse {
            status_code: response.status().as_u16(),
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const USER_AGENT: &str = "Mozilla/5.0 (LinkCheckerBot/1.0)";

    /// 前 `failures` 次返回错误，之后返回200
    struct FlakyProber {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Prober for FlakyProber {
        async fn fetch(&self, _url: &str) -> Result<ProbeResponse, ProbeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ProbeError::new(ProbeErrorKind::Timeout, "timed out"))
            } else {
                Ok(ProbeResponse {
                    status_code: 200,
                    elapsed: Duration::from_millis(5),
                })
            }
        }
    }

    fn refused_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let prober = FlakyProber {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let response = prober.probe("https://a.test/", 2).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted_returns_last_error() {
        let prober = FlakyProber {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let err = prober.probe("https://a.test/", 2).await.unwrap_err();
        assert_eq!(err.kind, ProbeErrorKind::Timeout);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_single_attempt() {
        let prober = FlakyProber {
            failures: 1,
            calls: AtomicU32::new(0),
        };
        assert!(prober.probe("https://a.test/", 0).await.is_err());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_http_get_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ok")
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let prober = HttpProber::new(Duration::from_secs(10), USER_AGENT).unwrap();
        let response = prober
            .probe(&format!("{}/ok", server.url()), 2)
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let prober = HttpProber::new(Duration::from_secs(10), USER_AGENT).unwrap();
        let response = prober
            .probe(&format!("{}/missing", server.url()), 2)
            .await
            .unwrap();

        assert_eq!(response.status_code, 404);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let prober = HttpProber::new(Duration::from_secs(2), USER_AGENT).unwrap();
        let err = prober.probe(&refused_url(), 1).await.unwrap_err();
        assert_eq!(err.kind, ProbeErrorKind::Connect);
        assert!(!err.message.is_empty());
    }
}

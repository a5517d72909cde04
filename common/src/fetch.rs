//! 通用页面抓取器
//!
//! 对目标站点的所有请求都从这里发出：统一 UA、超时与请求间隔。

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::{GENERAL_UA, convert_bytes};

/// 抓取层的错误类型
#[derive(Debug)]
pub enum FetchError {
    /// 网络请求错误（连接失败、超时等）
    Network(reqwest::Error),
    /// HTTP 状态码错误
    Http { status: u16, message: String },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "网络请求失败: {}", e),
            Self::Http { status, message } => write!(f, "HTTP 错误 {}: {}", status, message),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error)
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// 页面获取能力
///
/// 上层只通过这个 trait 访问网络，测试时可以换成内存中的假数据源。
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 获取页面 HTML
    async fn fetch_html(&self, url: &str) -> FetchResult<String>;

    /// 获取二进制内容（图片）
    async fn fetch_bytes(&self, url: &str) -> FetchResult<Vec<u8>>;
}

/// 抓取配置
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// 相邻两次请求之间的等待时间
    pub delay: Duration,
    /// 单次请求超时
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

/// 基于 reqwest 的页面抓取器
///
/// 除第一次请求外，每次请求发出前都会等待配置的间隔时间，
/// 这是对目标站点唯一的限速手段。
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
    started: AtomicBool,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        // 站点会拒绝非浏览器的默认客户端签名
        let client = reqwest::Client::builder()
            .user_agent(GENERAL_UA)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            delay: config.delay,
            started: AtomicBool::new(false),
        })
    }

    /// 请求限速：第一次直接放行，之后每次请求前等待间隔时间
    async fn throttle(&self) {
        if self.started.swap(true, Ordering::Relaxed) && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn get(&self, url: &str) -> FetchResult<reqwest::Response> {
        self.throttle().await;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::Http {
                status: status.as_u16(),
                message: format!("HTTP 请求失败，状态码: {}", status.as_u16()),
            })
        }
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> FetchResult<String> {
        log::debug!("Fetching page: {}", url);
        let response = self.get(url).await?;
        response.text().await.map_err(Into::into)
    }

    async fn fetch_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        log::debug!("Starting download from: {}", url);
        let response = self.get(url).await?;
        let bytes = response.bytes().await?;

        log::debug!(
            "Downloaded {} bytes ({})",
            bytes.len(),
            convert_bytes(bytes.len() as f64)
        );
        Ok(bytes.to_vec())
    }
}

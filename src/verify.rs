use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::redirect::Policy;
use reqwest::Client;
use tokio::time::timeout;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = "subs/1.0";

/// 默认最多跟随的重定向次数
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// 探测顺序固定：先HTTP，再HTTPS
pub const SCHEMES: [&str; 2] = ["http", "https"];

/// HTTP状态探测
#[async_trait]
pub trait Probe: Send + Sync {
    /// 返回第一个没有传输层错误的响应状态码，全部失败返回 `None`
    async fn probe(&self, hostname: &str, timeout_duration: Duration) -> Option<u16>;
}

/// 候选URL，按探测顺序排列
pub fn probe_urls(hostname: &str) -> [String; 2] {
    SCHEMES.map(|scheme| format!("{}://{}", scheme, hostname))
}

/// HTTP客户端选项
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub user_agent: String,
    pub max_redirects: usize,
    /// 接受无效证书
    pub insecure: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            insecure: false,
        }
    }
}

/// 基于 reqwest 的探测器
///
/// HTTP一旦拿到任意响应（包括5xx）就不再尝试HTTPS。
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(options: &ProbeOptions) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .redirect(Policy::limited(options.max_redirects))
            .danger_accept_invalid_certs(options.insecure)
            .no_proxy()
            .build()?;

        Ok(HttpProber { client })
    }

    /// 单次请求，超时独立计算
    async fn fetch_status(&self, url: &str, timeout_duration: Duration) -> Result<u16, String> {
        let request = self.client.get(url).timeout(timeout_duration).send();
        match timeout(timeout_duration, request).await {
            Ok(Ok(response)) => Ok(response.status().as_u16()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("timed out".to_string()),
        }
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, hostname: &str, timeout_duration: Duration) -> Option<u16> {
        first_status(probe_urls(hostname), |url| async move {
            self.fetch_status(&url, timeout_duration).await
        })
        .await
    }
}

/// 依次请求，返回第一个成功响应的状态码
async fn first_status<I, F, Fut>(urls: I, mut fetch: F) -> Option<u16>
where
    I: IntoIterator<Item = String>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<u16, String>>,
{
    for url in urls {
        match fetch(url.clone()).await {
            Ok(status) => return Some(status),
            Err(e) => debug!("{} 请求失败: {}", url, e),
        }
    }
    None
}

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::time::timeout;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// 域名存在性检查
///
/// 只关心能否解析出至少一个地址；NXDOMAIN、网络错误、超时一律视为失败。
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, hostname: &str) -> bool;
}

/// 解析器后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverKind {
    /// trust-dns 异步解析器，读取系统 resolv.conf
    #[default]
    Dns,
    /// 操作系统 getaddrinfo
    System,
}

impl FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dns" => Ok(ResolverKind::Dns),
            "system" => Ok(ResolverKind::System),
            _ => Err(format!("不支持的解析器: {}。支持: dns, system", s)),
        }
    }
}

/// 基于 trust-dns 的解析器
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    timeout_duration: Duration,
}

impl DnsResolver {
    pub fn new(timeout_duration: Duration) -> Self {
        let (config, mut opts) = match read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!("读取系统DNS配置失败: {}，使用默认解析服务器", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout_duration;
        opts.attempts = 1;

        DnsResolver {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout_duration,
        }
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    async fn resolve(&self, hostname: &str) -> bool {
        match timeout(self.timeout_duration, self.resolver.lookup_ip(hostname)).await {
            Ok(Ok(response)) => response.iter().next().is_some(),
            Ok(Err(e)) => {
                debug!("{} 解析失败: {}", hostname, e);
                false
            }
            Err(_) => {
                debug!("{} 解析超时", hostname);
                false
            }
        }
    }
}

/// 基于系统 getaddrinfo 的解析器
///
/// 阻塞查询在 tokio 的阻塞线程池里执行，超时后只放弃等待，查询线程本身不会被中断。
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout_duration: Duration,
}

impl SystemResolver {
    pub fn new(timeout_duration: Duration) -> Self {
        SystemResolver { timeout_duration }
    }
}

#[async_trait]
impl Resolve for SystemResolver {
    async fn resolve(&self, hostname: &str) -> bool {
        match timeout(self.timeout_duration, tokio::net::lookup_host((hostname, 0u16))).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(e)) => {
                debug!("{} 解析失败: {}", hostname, e);
                false
            }
            Err(_) => {
                debug!("{} 解析超时", hostname);
                false
            }
        }
    }
}

/// 按配置创建解析器
pub fn build_resolver(kind: ResolverKind, timeout_duration: Duration) -> Arc<dyn Resolve> {
    match kind {
        ResolverKind::Dns => Arc::new(DnsResolver::new(timeout_duration)),
        ResolverKind::System => Arc::new(SystemResolver::new(timeout_duration)),
    }
}

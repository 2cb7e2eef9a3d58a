use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use tokio::sync::mpsc;

use crate::classify::{Classifier, DEFAULT_ALLOWED_STATUS};
use crate::dns_resolver::{build_resolver, Resolve, ResolverKind};
use crate::error::ScanError;
use crate::handle::{self, NullSink, ResultSink};
use crate::model::{Candidate, ScanReport};
use crate::pacing::Pacing;
use crate::scheduler::{self, WorkerContext};
use crate::verify::{HttpProber, Probe, ProbeOptions};
use crate::wordlist::Wordlist;

/// 默认HTTP超时（秒）
pub const DEFAULT_TIMEOUT: u64 = 3;

/// HTTP超时上限（秒）
pub const MAX_TIMEOUT: u64 = 10;

/// 超时参数被修正的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutAdjustment {
    /// `<= 0`，改用默认值
    NonPositive { given: i64 },
    /// 超过上限，截断到 `MAX_TIMEOUT`
    TooHigh { given: i64 },
}

impl fmt::Display for TimeoutAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutAdjustment::NonPositive { given } => write!(
                f,
                "无效的超时时间 {}s，使用默认值 {}s",
                given, DEFAULT_TIMEOUT
            ),
            TimeoutAdjustment::TooHigh { given } => write!(
                f,
                "超时时间 {}s 过大，最大允许 {}s，使用 {}s",
                given, MAX_TIMEOUT, MAX_TIMEOUT
            ),
        }
    }
}

/// 把用户输入的超时修正到 `[1, MAX_TIMEOUT]`
pub fn clamp_timeout(raw: i64) -> (u64, Option<TimeoutAdjustment>) {
    if raw <= 0 {
        (DEFAULT_TIMEOUT, Some(TimeoutAdjustment::NonPositive { given: raw }))
    } else if raw as u64 > MAX_TIMEOUT {
        (MAX_TIMEOUT, Some(TimeoutAdjustment::TooHigh { given: raw }))
    } else {
        (raw as u64, None)
    }
}

/// 扫描配置，启动前构建，之后只读
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 目标域名
    pub domain: String,
    /// 每次HTTP请求的超时（秒）
    pub timeout: u64,
    /// DNS解析超时（秒），默认与HTTP超时相同
    pub dns_timeout: Option<u64>,
    /// worker数量，`None` 时按候选数量自动选择
    pub workers: Option<usize>,
    /// 请求间隔策略
    pub pacing: Pacing,
    /// 需要输出的状态码
    pub allowed_status: BTreeSet<u16>,
    /// 解析器后端
    pub resolver: ResolverKind,
    /// HTTP客户端选项
    pub probe: ProbeOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            domain: String::new(),
            timeout: DEFAULT_TIMEOUT,
            dns_timeout: None,
            workers: None,
            pacing: Pacing::default(),
            allowed_status: DEFAULT_ALLOWED_STATUS.into_iter().collect(),
            resolver: ResolverKind::default(),
            probe: ProbeOptions::default(),
        }
    }
}

impl ScanConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        ScanConfig {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// 校验域名并修正超时
    fn normalized(mut self) -> Result<Self, ScanError> {
        self.domain = self.domain.trim().to_string();
        if self.domain.is_empty() {
            return Err(ScanError::EmptyDomain);
        }

        let (timeout, adjustment) = clamp_timeout(self.timeout.min(i64::MAX as u64) as i64);
        if let Some(adjustment) = adjustment {
            warn!("{}", adjustment);
        }
        self.timeout = timeout;

        if let Some(dns_timeout) = self.dns_timeout {
            let (dns_timeout, adjustment) = clamp_timeout(dns_timeout.min(i64::MAX as u64) as i64);
            if let Some(adjustment) = adjustment {
                warn!("DNS {}", adjustment);
            }
            self.dns_timeout = Some(dns_timeout);
        }
        Ok(self)
    }

    pub fn dns_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.dns_timeout.unwrap_or(self.timeout))
    }
}

/// 子域名扫描引擎
pub struct ScanEngine {
    config: Arc<ScanConfig>,
    classifier: Arc<Classifier>,
    resolver: Arc<dyn Resolve>,
    prober: Arc<dyn Probe>,
    running: Arc<AtomicBool>,
}

impl ScanEngine {
    /// 使用配置中的解析器和 reqwest 探测器创建引擎
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let config = config.normalized()?;
        let resolver = build_resolver(config.resolver, config.dns_timeout_duration());
        let prober: Arc<dyn Probe> = Arc::new(HttpProber::new(&config.probe)?);
        Ok(Self::assemble(config, resolver, prober))
    }

    /// 使用自定义的解析器和探测器创建引擎
    pub fn with_components(
        config: ScanConfig,
        resolver: Arc<dyn Resolve>,
        prober: Arc<dyn Probe>,
    ) -> Result<Self, ScanError> {
        let config = config.normalized()?;
        Ok(Self::assemble(config, resolver, prober))
    }

    fn assemble(config: ScanConfig, resolver: Arc<dyn Resolve>, prober: Arc<dyn Probe>) -> Self {
        let classifier = Classifier::new(config.allowed_status.clone());
        ScanEngine {
            config: Arc::new(config),
            classifier: Arc::new(classifier),
            resolver,
            prober,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// 停止标志，置为 `false` 后worker不再领取新的候选
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// 执行扫描，不输出结果
    pub async fn run(&self, wordlist: &Wordlist) -> Result<ScanReport, ScanError> {
        self.run_with_sink(wordlist, NullSink).await
    }

    /// 执行扫描，需要展示的结果交给 `sink`
    pub async fn run_with_sink<S>(&self, wordlist: &Wordlist, sink: S) -> Result<ScanReport, ScanError>
    where
        S: ResultSink + 'static,
    {
        let start = Instant::now();
        let candidates: Vec<Candidate> = wordlist.candidates(&self.config.domain).collect();
        let submitted = candidates.len();
        let workers = scheduler::effective_workers(self.config.workers, submitted);

        info!(
            "开始扫描 {}: {} 个候选子域名, {} 个worker, 超时 {}s",
            self.config.domain, submitted, workers, self.config.timeout
        );

        let ctx = Arc::new(WorkerContext {
            config: self.config.clone(),
            classifier: self.classifier.clone(),
            resolver: self.resolver.clone(),
            prober: self.prober.clone(),
            running: self.running.clone(),
        });

        let (result_send, result_recv) = mpsc::unbounded_channel();
        let collector = handle::spawn_collector(result_recv, sink);

        let dispatched = scheduler::dispatch(ctx, candidates, workers, result_send).await;
        let collected = collector.await?;
        let dispatched = dispatched?;

        let mut summary = collected.summary;
        summary.submitted = submitted;
        summary.workers = workers;
        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        summary.interrupted = !self.running.load(Ordering::Relaxed);

        if !summary.interrupted && (dispatched != submitted || summary.processed != submitted) {
            return Err(ScanError::Incomplete {
                submitted,
                processed: summary.processed,
            });
        }

        info!(
            "扫描完成: 处理 {}/{}, 解析成功 {}, 输出 {}, 耗时 {}ms",
            summary.processed, submitted, summary.resolved, summary.included, summary.elapsed_ms
        );

        Ok(ScanReport {
            summary,
            included: collected.included,
        })
    }
}

/// 便捷的扫描函数，使用默认配置
pub async fn scan_subdomains<P: AsRef<Path>>(
    domain: &str,
    wordlist_path: P,
) -> Result<ScanReport, ScanError> {
    let wordlist = Wordlist::from_file(wordlist_path)?;
    let engine = ScanEngine::new(ScanConfig::new(domain))?;
    engine.run(&wordlist).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_clamping() {
        assert_eq!(clamp_timeout(0).0, 3);
        assert_eq!(clamp_timeout(-5).0, 3);
        assert_eq!(clamp_timeout(15).0, 10);
        assert_eq!(clamp_timeout(7), (7, None));
        assert_eq!(clamp_timeout(1), (1, None));
        assert_eq!(clamp_timeout(10), (10, None));
        assert_eq!(
            clamp_timeout(-5).1,
            Some(TimeoutAdjustment::NonPositive { given: -5 })
        );
        assert_eq!(
            clamp_timeout(15).1,
            Some(TimeoutAdjustment::TooHigh { given: 15 })
        );
    }

    #[test]
    fn normalized_config_is_clamped() {
        let config = ScanConfig {
            timeout: 0,
            dns_timeout: Some(99),
            ..ScanConfig::new(" example.com ")
        };
        let config = config.normalized().unwrap();
        assert_eq!(config.domain, "example.com");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.dns_timeout, Some(MAX_TIMEOUT));
    }

    #[test]
    fn empty_domain_is_rejected() {
        let err = ScanConfig::new("   ").normalized().unwrap_err();
        assert!(matches!(err, ScanError::EmptyDomain));
    }

    #[test]
    fn dns_timeout_defaults_to_http_timeout() {
        let config = ScanConfig {
            timeout: 5,
            ..ScanConfig::new("example.com")
        };
        assert_eq!(config.dns_timeout_duration(), Duration::from_secs(5));
    }
}

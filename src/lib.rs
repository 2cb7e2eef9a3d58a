//! # subprobe
//!
//! 基于字典的子域名存活探测工具库：DNS解析 + HTTP/HTTPS状态探测，只输出关注的状态码。
//!
//! ## 流程
//!
//! 字典 → 候选子域名 → worker池（解析 → 探测 → 分类）→ 唯一的结果处理任务。
//!
//! - 先请求 `http://`，只有传输层失败才会尝试 `https://`
//! - worker数量按候选数量自动选择，也可以显式指定
//! - 每个worker处理完一个候选后按固定或随机间隔停顿
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use subprobe::scan_subdomains;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = scan_subdomains("example.com", "wordlist.txt").await?;
//!
//!     println!("发现 {} 个子域名", report.included.len());
//!     for result in &report.included {
//!         println!("  {}", result);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 高级配置
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use subprobe::{ConsoleSink, Pacing, ScanConfig, ScanEngine, Wordlist};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig {
//!         timeout: 5,
//!         workers: Some(4),
//!         pacing: Pacing::jitter(Duration::from_millis(50), Duration::from_millis(200)),
//!         ..ScanConfig::new("example.com")
//!     };
//!
//!     let wordlist = Wordlist::from_file("wordlist.txt")?;
//!     let engine = ScanEngine::new(config)?;
//!     let report = engine.run_with_sink(&wordlist, ConsoleSink::new(true)).await?;
//!     println!("{:?}", report.summary);
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod classify;
pub mod dns_resolver;
pub mod error;
pub mod handle;
pub mod input;
pub mod logger;
pub mod model;
pub mod output;
pub mod pacing;
pub mod scheduler;
pub mod verify;
pub mod wordlist;

// 重新导出主要的公共API
pub use api::{
    clamp_timeout, scan_subdomains, ScanConfig, ScanEngine, TimeoutAdjustment, DEFAULT_TIMEOUT,
    MAX_TIMEOUT,
};

pub use classify::{Classifier, StatusCategory, DEFAULT_ALLOWED_STATUS};
pub use dns_resolver::{DnsResolver, Resolve, ResolverKind, SystemResolver};
pub use error::{ExportError, ScanError};
pub use handle::{ConsoleSink, NullSink, ResultSink};
pub use input::OutputFormat;
pub use model::{Candidate, ProbeResult, ScanReport, ScanSummary};
pub use output::export_results;
pub use pacing::Pacing;
pub use scheduler::{auto_workers, effective_workers};
pub use verify::{HttpProber, Probe, ProbeOptions};
pub use wordlist::Wordlist;

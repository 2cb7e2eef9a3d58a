use std::fmt;

use serde::Serialize;

use crate::classify::{Classifier, StatusCategory};

/// 待检测的子域名 (`label.domain`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    hostname: String,
}

impl Candidate {
    pub fn new(label: &str, domain: &str) -> Self {
        let mut hostname = String::with_capacity(label.len() + domain.len() + 1);
        hostname.push_str(label);
        hostname.push('.');
        hostname.push_str(domain);
        Candidate { hostname }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn into_hostname(self) -> String {
        self.hostname
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hostname)
    }
}

/// 单个候选域名的处理结果
///
/// 只能通过 [`ProbeResult::unresolved`] 和 [`ProbeResult::probed`] 构造，
/// 保证未解析的域名没有状态码，且 `included` 只由分类器决定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    hostname: String,
    resolved: bool,
    status: Option<u16>,
    included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<StatusCategory>,
}

impl ProbeResult {
    /// DNS解析失败，不会发起HTTP请求
    pub fn unresolved(candidate: Candidate) -> Self {
        ProbeResult {
            hostname: candidate.into_hostname(),
            resolved: false,
            status: None,
            included: false,
            category: None,
        }
    }

    /// DNS解析成功，`status` 为探测结果（两种协议都失败时为 `None`）
    pub fn probed(candidate: Candidate, status: Option<u16>, classifier: &Classifier) -> Self {
        let (included, category) = match status {
            Some(code) => {
                let (included, category) = classifier.classify(code);
                (included, Some(category))
            }
            None => (false, None),
        };

        ProbeResult {
            hostname: candidate.into_hostname(),
            resolved: true,
            status,
            included,
            category,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn resolved(&self) -> bool {
        self.resolved
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn included(&self) -> bool {
        self.included
    }

    pub fn category(&self) -> Option<StatusCategory> {
        self.category
    }
}

/// 输出行格式: `{subdomain} -> {status}`
impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} -> {}", self.hostname, status),
            None => write!(f, "{} -> N/A", self.hostname),
        }
    }
}

/// 扫描汇总统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub submitted: usize,
    pub processed: usize,
    pub resolved: usize,
    pub responded: usize,
    pub included: usize,
    pub workers: usize,
    pub elapsed_ms: u64,
    pub interrupted: bool,
}

impl ScanSummary {
    pub(crate) fn record(&mut self, result: &ProbeResult) {
        self.processed += 1;
        if result.resolved() {
            self.resolved += 1;
        }
        if result.status().is_some() {
            self.responded += 1;
        }
        if result.included() {
            self.included += 1;
        }
    }
}

/// 一次完整扫描的结果
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub included: Vec<ProbeResult>,
}

use std::path::PathBuf;

use thiserror::Error;

/// 扫描过程中的致命错误
///
/// 单个候选域名的DNS/HTTP失败不会出现在这里，它们被吸收进 `ProbeResult`。
#[derive(Debug, Error)]
pub enum ScanError {
    /// 字典文件不存在或无法读取，扫描不会开始
    #[error("wordlist file not found or unreadable: {}", path.display())]
    WordlistUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 目标域名为空
    #[error("target domain must not be empty")]
    EmptyDomain,

    /// HTTP客户端构建失败
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// 工作任务异常退出
    #[error("scan worker failed: {0}")]
    WorkerFailed(#[from] tokio::task::JoinError),

    /// 完成计数不一致
    #[error("scan incomplete: {processed} of {submitted} candidates processed")]
    Incomplete { submitted: usize, processed: usize },

    /// 结果导出失败
    #[error("failed to export results: {0}")]
    Export(#[from] ExportError),
}

/// 导出结果时的错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

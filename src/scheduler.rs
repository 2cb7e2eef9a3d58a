use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use log::{debug, error};
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ScanConfig;
use crate::classify::Classifier;
use crate::dns_resolver::Resolve;
use crate::error::ScanError;
use crate::model::{Candidate, ProbeResult};
use crate::verify::Probe;

/// 根据候选数量自动选择worker数
pub fn auto_workers(candidate_count: usize) -> usize {
    match candidate_count {
        0..=4_999 => 1,
        5_000..=29_999 => 3,
        30_000..=99_999 => 5,
        _ => 8,
    }
}

/// 实际启动的worker数：显式配置优先，且不超过候选数量
pub fn effective_workers(requested: Option<usize>, candidate_count: usize) -> usize {
    let workers = requested
        .filter(|&n| n > 0)
        .unwrap_or_else(|| auto_workers(candidate_count));
    workers.min(candidate_count.max(1))
}

/// worker共享的只读上下文
pub(crate) struct WorkerContext {
    pub(crate) config: Arc<ScanConfig>,
    pub(crate) classifier: Arc<Classifier>,
    pub(crate) resolver: Arc<dyn Resolve>,
    pub(crate) prober: Arc<dyn Probe>,
    pub(crate) running: Arc<AtomicBool>,
}

impl WorkerContext {
    /// 解析 -> 探测 -> 分类
    pub(crate) async fn process(&self, candidate: Candidate) -> ProbeResult {
        if !self.resolver.resolve(candidate.hostname()).await {
            return ProbeResult::unresolved(candidate);
        }

        let timeout = Duration::from_secs(self.config.timeout);
        let status = self.prober.probe(candidate.hostname(), timeout).await;
        debug!("{} 解析成功, 状态码: {:?}", candidate, status);
        ProbeResult::probed(candidate, status, &self.classifier)
    }
}

/// 把所有候选放入共享队列，启动 `workers` 个任务消费，返回已处理数量
///
/// 任何worker异常退出都会以 `WorkerFailed` 报告，其余worker继续消费队列。
pub(crate) async fn dispatch(
    ctx: Arc<WorkerContext>,
    candidates: Vec<Candidate>,
    workers: usize,
    results: UnboundedSender<ProbeResult>,
) -> Result<usize, ScanError> {
    let (queue_send, queue_recv) = crossbeam_channel::unbounded();
    for candidate in candidates {
        if queue_send.send(candidate).is_err() {
            break;
        }
    }
    drop(queue_send);

    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let queue = queue_recv.clone();
        let ctx = ctx.clone();
        let results = results.clone();
        handles.push(tokio::spawn(worker_loop(id, queue, ctx, results)));
    }
    drop(results);
    drop(queue_recv);

    let mut processed = 0;
    let mut failure = None;
    for handle in handles {
        match handle.await {
            Ok(count) => processed += count,
            Err(e) => {
                error!("worker异常退出: {}", e);
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        Some(e) => Err(ScanError::WorkerFailed(e)),
        None => Ok(processed),
    }
}

async fn worker_loop(
    id: usize,
    queue: Receiver<Candidate>,
    ctx: Arc<WorkerContext>,
    results: UnboundedSender<ProbeResult>,
) -> usize {
    let mut processed = 0;

    // 队列在启动前已填满，try_recv 失败即表示已取完
    while ctx.running.load(Ordering::Relaxed) {
        let candidate = match queue.try_recv() {
            Ok(candidate) => candidate,
            Err(_) => break,
        };

        let result = ctx.process(candidate).await;
        if results.send(result).is_err() {
            break;
        }
        processed += 1;

        ctx.config.pacing.pause().await;
    }

    debug!("worker {} 退出, 处理 {} 个候选", id, processed);
    processed
}

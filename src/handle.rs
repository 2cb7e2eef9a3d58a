use std::io::{self, Write};

use colored::Colorize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::model::{ProbeResult, ScanSummary};

/// 结果输出接口，只会收到需要展示的结果
pub trait ResultSink: Send {
    fn emit(&mut self, result: &ProbeResult);
}

/// 终端输出，每个结果一行
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        ConsoleSink { color }
    }

    /// 渲染一行输出，按状态码类别着色
    pub fn render(result: &ProbeResult, color: bool) -> String {
        let line = result.to_string();
        match result.category() {
            Some(category) if color => line.color(category.color()).to_string(),
            _ => line,
        }
    }
}

impl ResultSink for ConsoleSink {
    fn emit(&mut self, result: &ProbeResult) {
        let line = Self::render(result, self.color);
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{}", line);
    }
}

/// 不输出任何内容
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn emit(&mut self, _result: &ProbeResult) {}
}

/// 结果收集任务的产出
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub(crate) summary: ScanSummary,
    pub(crate) included: Vec<ProbeResult>,
}

/// 启动唯一的结果处理任务
///
/// 所有worker通过channel把结果交给这里，输出不会交错；所有发送端关闭后任务结束。
pub(crate) fn spawn_collector<S>(
    mut results: UnboundedReceiver<ProbeResult>,
    mut sink: S,
) -> JoinHandle<Collected>
where
    S: ResultSink + 'static,
{
    tokio::spawn(async move {
        let mut collected = Collected::default();
        while let Some(result) = results.recv().await {
            collected.summary.record(&result);
            if result.included() {
                sink.emit(&result);
                collected.included.push(result);
            }
        }
        collected
    })
}

use std::fs::File;
use std::io::Write;

use log::info;
use serde::Serialize;

use crate::error::ExportError;
use crate::input::OutputFormat;
use crate::model::{ProbeResult, ScanReport, ScanSummary};

/// 完整的导出数据结构
#[derive(Debug, Clone, Serialize)]
pub struct ExportData<'a> {
    pub domain: &'a str,
    pub export_time: String,
    pub summary: &'a ScanSummary,
    pub results: Vec<&'a ProbeResult>,
}

impl<'a> ExportData<'a> {
    /// 结果按域名排序，保证同一目标多次扫描的导出内容一致
    pub fn new(domain: &'a str, report: &'a ScanReport) -> Self {
        let mut results: Vec<&ProbeResult> = report.included.iter().collect();
        results.sort_by(|a, b| a.hostname().cmp(b.hostname()));

        ExportData {
            domain,
            export_time: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            summary: &report.summary,
            results,
        }
    }
}

/// 导出结果到文件
pub fn export_results(
    domain: &str,
    report: &ScanReport,
    output_path: &str,
    format: OutputFormat,
) -> Result<(), ExportError> {
    let data = ExportData::new(domain, report);
    let content = render(&data, format)?;

    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    info!("结果已导出到: {}", output_path);
    Ok(())
}

/// 按格式渲染导出内容
pub fn render(data: &ExportData<'_>, format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Csv => Ok(export_to_csv(data)),
        OutputFormat::Txt => Ok(export_to_txt(data)),
    }
}

/// 导出为CSV格式
fn export_to_csv(data: &ExportData<'_>) -> String {
    let mut csv = String::from("Subdomain,Status\n");
    for result in &data.results {
        csv.push_str(&format!(
            "{},{}\n",
            escape_csv(result.hostname()),
            status_text(result)
        ));
    }
    csv
}

/// 导出为TXT格式
fn export_to_txt(data: &ExportData<'_>) -> String {
    let summary = data.summary;
    let mut txt = String::new();

    txt.push_str(&format!("subprobe 扫描结果: {}\n", data.domain));
    txt.push_str(&format!("导出时间: {}\n", data.export_time));
    txt.push_str(&format!("{}\n\n", "=".repeat(60)));

    txt.push_str("汇总统计:\n");
    txt.push_str(&format!("  候选子域名: {}\n", summary.submitted));
    txt.push_str(&format!("  已处理: {}\n", summary.processed));
    txt.push_str(&format!("  解析成功: {}\n", summary.resolved));
    txt.push_str(&format!("  有HTTP响应: {}\n", summary.responded));
    txt.push_str(&format!("  输出结果: {}\n", summary.included));
    if summary.interrupted {
        txt.push_str("  扫描被中断\n");
    }
    txt.push('\n');

    for result in &data.results {
        txt.push_str(&format!("{}\n", result));
    }
    txt
}

fn status_text(result: &ProbeResult) -> String {
    result.status().map_or("N/A".to_string(), |s| s.to_string())
}

/// CSV转义
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

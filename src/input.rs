use std::collections::BTreeSet;
use std::time::Duration;

use clap::Parser;

use crate::wordlist::DEFAULT_WORDLIST;

/// 输出格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Txt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "txt" => Ok(OutputFormat::Txt),
            _ => Err(format!("不支持的输出格式: {}。支持的格式: json, csv, txt", s)),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "subprobe")]
#[command(author = "gelenlen")]
#[command(version = "0.1")]
#[command(about = "Enumerate live subdomains via DNS resolution and HTTP probing", long_about = None)]
pub struct Opts {
    /// target domain (example.com)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// HTTP timeout in seconds (1-10)
    #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
    pub timeout: i64,

    /// wordlist path, one label per line
    #[arg(short, long, default_value = DEFAULT_WORDLIST)]
    pub wordlist: String,

    /// number of workers, chosen from the wordlist size on default
    #[arg(long)]
    pub workers: Option<usize>,

    /// fixed delay between requests of one worker, in milliseconds
    #[arg(long, default_value_t = 10)]
    pub delay: u64,

    /// random delay range in milliseconds (e.g., 50-200), overrides --delay
    #[arg(long, value_parser = parse_jitter)]
    pub jitter: Option<(Duration, Duration)>,

    /// status codes to report, comma separated
    #[arg(long, default_value = "200,403,404", value_parser = parse_status_list)]
    pub status: BTreeSet<u16>,

    /// DNS timeout in seconds, same as --timeout on default
    #[arg(long)]
    pub dns_timeout: Option<i64>,

    /// resolver backend (dns, system)
    #[arg(long, default_value = "dns")]
    pub resolver: String,

    /// User-Agent header sent with every probe
    #[arg(long, default_value = crate::verify::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// output file path
    #[arg(short, long)]
    pub output: Option<String>,

    /// output format (json, csv, txt)
    #[arg(long, default_value = "json")]
    pub format: String,

    /// show summary statistics
    #[arg(long)]
    pub summary: bool,

    /// silent: no banner, warnings only
    #[arg(short, long)]
    pub silent: bool,

    /// verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// 解析随机间隔，格式 `MIN-MAX`（毫秒）
pub fn parse_jitter(value: &str) -> Result<(Duration, Duration), String> {
    let (min, max) = value
        .split_once('-')
        .ok_or_else(|| format!("无效的间隔范围: {}，格式为 MIN-MAX", value))?;

    let min: u64 = min
        .trim()
        .parse()
        .map_err(|_| format!("无效的最小间隔: {}", min))?;
    let max: u64 = max
        .trim()
        .parse()
        .map_err(|_| format!("无效的最大间隔: {}", max))?;

    if min > max {
        return Err(format!("最小间隔 {} 大于最大间隔 {}", min, max));
    }
    Ok((Duration::from_millis(min), Duration::from_millis(max)))
}

/// 解析状态码列表，如 `200,403,404`
pub fn parse_status_list(value: &str) -> Result<BTreeSet<u16>, String> {
    let mut codes = BTreeSet::new();
    for part in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let code: u16 = part.parse().map_err(|_| format!("无效的状态码: {}", part))?;
        if !(100..=599).contains(&code) {
            return Err(format!("状态码超出范围: {}", code));
        }
        codes.insert(code);
    }

    if codes.is_empty() {
        return Err("状态码列表不能为空".to_string());
    }
    Ok(codes)
}

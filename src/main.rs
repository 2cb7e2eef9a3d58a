use std::sync::atomic::Ordering;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use log::{error, info, warn};
use subprobe::input::Opts;
use subprobe::{
    clamp_timeout, export_results, logger, ConsoleSink, OutputFormat, Pacing, ProbeOptions,
    ResolverKind, ScanConfig, ScanEngine, ScanError, ScanSummary, Wordlist,
};

const BANNER: &str = r#"
           _
 ___ _   _| |__  _ __  _ __ ___ | |__   ___
/ __| | | | '_ \| '_ \| '__/ _ \| '_ \ / _ \
\__ \ |_| | |_) | |_) | | | (_) | |_) |  __/
|___/\__,_|_.__/| .__/|_|  \___/|_.__/ \___|
                |_|
"#;

#[tokio::main]
async fn main() {
    let opts = Opts::parse();

    if opts.no_color {
        colored::control::set_override(false);
    }
    logger::init_logger(logger::level_for(opts.silent, opts.verbose), !opts.no_color);

    if !opts.silent {
        show_banner();
    }

    // 未指定域名时只显示用法
    let Some(domain) = opts.domain.clone() else {
        show_usage();
        return;
    };

    if let Err(e) = run_scan(opts, domain).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn show_banner() {
    println!("{}", BANNER.red());
    println!("{}", "-".repeat(30));
    println!("{}", "# Subdomain Enumeration Tool".yellow());
    println!("{}", "-".repeat(30));
    println!();
}

fn show_usage() {
    println!("{}", "Usage: subprobe -d domain.com".green());
    println!();
    let _ = Opts::command().print_help();
}

/// 由命令行参数构建扫描配置
fn build_config(opts: &Opts, domain: String) -> Result<ScanConfig, Box<dyn std::error::Error>> {
    let (timeout, adjustment) = clamp_timeout(opts.timeout);
    if let Some(adjustment) = adjustment {
        warn!("{}", adjustment);
    }

    let dns_timeout = opts.dns_timeout.map(|raw| {
        let (secs, adjustment) = clamp_timeout(raw);
        if let Some(adjustment) = adjustment {
            warn!("DNS {}", adjustment);
        }
        secs
    });

    let pacing = match opts.jitter {
        Some((min, max)) => Pacing::jitter(min, max),
        None => Pacing::Fixed(std::time::Duration::from_millis(opts.delay)),
    };

    let resolver: ResolverKind = opts.resolver.parse()?;

    Ok(ScanConfig {
        domain,
        timeout,
        dns_timeout,
        workers: opts.workers,
        pacing,
        allowed_status: opts.status.clone(),
        resolver,
        probe: ProbeOptions {
            user_agent: opts.user_agent.clone(),
            insecure: opts.insecure,
            ..Default::default()
        },
    })
}

/// 执行扫描主逻辑
async fn run_scan(opts: Opts, domain: String) -> Result<(), Box<dyn std::error::Error>> {
    // 输出格式在扫描前校验，避免扫描结束后才报错
    let format = opts.format.parse::<OutputFormat>()?;
    let config = build_config(&opts, domain)?;

    let wordlist = match Wordlist::from_file(&opts.wordlist) {
        Ok(wordlist) => wordlist,
        Err(e @ ScanError::WordlistUnavailable { .. }) => {
            eprintln!("{}", format!("[!] Wordlist file not found: {}", opts.wordlist).red());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let engine = ScanEngine::new(config)?;

    // Ctrl-C 后不再领取新的候选，正在进行的请求受超时限制
    let running = engine.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，等待进行中的请求结束...");
            running.store(false, Ordering::Relaxed);
        }
    });

    info!("Start scanning...");
    let report = engine
        .run_with_sink(&wordlist, ConsoleSink::new(!opts.no_color))
        .await?;

    if opts.summary {
        print_summary(&report.summary);
    }

    if let Some(output_path) = &opts.output {
        export_results(&engine.config().domain, &report, output_path, format)?;
    }

    Ok(())
}

fn print_summary(summary: &ScanSummary) {
    println!();
    println!("=== 扫描汇总 ===");
    println!("候选子域名: {}", summary.submitted);
    println!("已处理: {}", summary.processed);
    println!("解析成功: {}", summary.resolved);
    println!("有HTTP响应: {}", summary.responded);
    println!("输出结果: {}", summary.included);
    println!("worker数量: {}", summary.workers);
    println!("耗时: {}ms", summary.elapsed_ms);
    if summary.interrupted {
        println!("{}", "扫描被中断".yellow());
    }
}

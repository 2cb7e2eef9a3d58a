use std::io::Write;

use colored::Colorize;
use log::{Level, LevelFilter};

/// 日志标签
fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "Error",
        Level::Warn => "Warning",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn wrap(level: Level, use_colors: bool) -> String {
    let label = label(level);
    if !use_colors {
        return label.to_string();
    }

    match level {
        Level::Error => label.red().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.blue().to_string(),
        Level::Debug => label.magenta().to_string(),
        Level::Trace => label.normal().to_string(),
    }
}

/// 根据命令行选项选择日志级别
pub fn level_for(silent: bool, verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if silent {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// 初始化日志，输出到 stderr，格式 `[LEVEL] message`
///
/// 只记录本crate的日志，依赖库的日志被过滤。
pub fn init_logger(max_level: LevelFilter, use_colors: bool) {
    let result = env_logger::Builder::new()
        .filter_level(LevelFilter::Off)
        .filter_module(env!("CARGO_CRATE_NAME"), max_level)
        .format(move |buf, record| {
            writeln!(buf, "[{}] {}", wrap(record.level(), use_colors), record.args())
        })
        .target(env_logger::Target::Stderr)
        .try_init();

    if let Err(e) = result {
        eprintln!("日志初始化失败: {}", e);
    }
}

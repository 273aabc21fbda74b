use chrono::Local; // 用于获取本地时间
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::core::error::DownloadError;

/// 日志行格式：`2024-01-01 12:00:00 [INFO] - 消息`
fn format_line(level: log::Level, message: &std::fmt::Arguments<'_>) -> String {
    format!("{} [{}] - {}", Local::now().format("%Y-%m-%d %H:%M:%S"), level, message)
}

fn builder(level: &str) -> Builder {
    // RUST_LOG 优先于配置中的级别
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format(|buf, record| writeln!(buf, "{}", format_line(record.level(), record.args())));
    builder
}

/// 初始化全局日志。指定文件时追加写入该文件，否则写标准错误
pub fn init_logger(level: &str, log_file: Option<&str>) -> Result<(), DownloadError> {
    let mut builder = builder(level);

    if let Some(file_path) = log_file {
        // 确保日志目录存在
        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| DownloadError::Config(format!("日志初始化失败: {}", e)))
}

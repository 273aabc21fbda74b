//! CLI: 命令行参数解析
//!
//! - 基本用法：`rangedown <主机>/<索引路径>`
//! - 并行分片：`rangedown -t 4 <索引>`
//! - 字节范围：`rangedown -r 100-199 <索引>`
//! - 指定配置：`rangedown -c rangedown.conf <索引>`
//!
//! 配置文件默认位置：
//! - Windows: `%APPDATA%/rangedown/rangedown.conf`
//! - macOS: `~/Library/Application Support/rangedown/rangedown.conf`
//! - Linux: `~/.config/rangedown/rangedown.conf`

use clap::Parser;
use std::env;
use crate::config::Config;
use crate::core::error::DownloadError;
use crate::core::partition::RequestedRange;

/// 获取平台默认配置文件路径
pub fn default_config_path() -> String {
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        format!("{}/rangedown/rangedown.conf", appdata)
    }
    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/Library/Application Support/rangedown/rangedown.conf", home)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/.config/rangedown/rangedown.conf", home)
    }
}

/// RangeDown 命令行参数
///
/// 示例用法：
///   rangedown example.com/files/index.txt
///   rangedown -t 4 -d ./out example.com/files/index.txt
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rangedown",
    author = "panzhifu",
    version = env!("CARGO_PKG_VERSION"),
    about = "按索引文件批量下载，支持按字节范围多线程分片",
    long_about = "先下载索引文件，再逐个下载其中列出的目标。\n每个目标先发送 HEAD 获取大小，再按线程数切分字节范围并行下载，最后按顺序拼接。\n\n示例：\n  rangedown example.com/files/index.txt\n  rangedown -t 4 example.com/files/index.txt\n  rangedown -r 0-1023 example.com/files/index.txt\n"
)]
pub struct Args {
    /// 索引文件，格式为 <主机>/<路径>
    #[arg(help = "索引文件，格式为 <主机>/<路径>，文件中每行一个下载目标。")]
    pub index: String,

    /// 每个文件的并行连接数
    #[arg(long = "threads", short = 't', help = "每个文件的并行连接数，覆盖配置文件中的设置。")]
    pub thread_count: Option<usize>,

    /// 只下载每个文件中的这一段
    #[arg(long, short = 'r', help = "只下载每个文件的这一段字节，格式 start-end 或 start-。")]
    pub range: Option<RequestedRange>,

    /// 配置文件路径，默认为平台推荐路径
    #[arg(short = 'c', long, default_value_t = default_config_path(), help = "配置文件路径，默认为平台推荐路径。")]
    pub config: String,

    /// 下载目录
    #[arg(long, short = 'd', help = "下载目录，覆盖配置文件中的设置。")]
    pub download_dir: Option<String>,

    /// 服务器端口
    #[arg(long, short = 'p', help = "服务器端口，覆盖配置文件中的设置。")]
    pub port: Option<u16>,

    /// 单次请求超时（秒）
    #[arg(long, help = "单次请求超时时间（秒），0 表示不限时。")]
    pub timeout: Option<u64>,

    /// JSON 报告路径
    #[arg(long, help = "运行结束后把每个文件的结果写入此 JSON 文件。")]
    pub report: Option<String>,

    /// 有文件未下载成功时以非零状态退出
    #[arg(long, help = "有任何文件未下载成功时以状态码 2 退出。")]
    pub strict: bool,
}

impl Args {
    /// 解析命令行参数并加载、合并、校验配置
    pub fn parse_args() -> Result<(Self, Config), DownloadError> {
        let args = Args::parse();
        let config = args.load_config()?;
        Ok((args, config))
    }

    pub fn load_config(&self) -> Result<Config, DownloadError> {
        let mut config = Config::load(&self.config)
            .map_err(|e| DownloadError::Config(format!("无法读取配置文件 {}: {}", self.config, e)))?;

        // 合并命令行参数到配置
        config.merge_from_args(self);

        config.validate()?;
        crate::utils::validator::validate_target(&self.index)
            .map_err(|e| DownloadError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["rangedown", "example.com/index.txt"]).unwrap();
        assert_eq!(args.index, "example.com/index.txt");
        assert!(args.thread_count.is_none());
        assert!(args.range.is_none());
        assert!(!args.strict);
    }

    #[test]
    fn test_args_with_range_and_threads() {
        let args = Args::try_parse_from([
            "rangedown", "-t", "4", "-r", "100-199", "--strict", "example.com/index.txt",
        ])
        .unwrap();
        assert_eq!(args.thread_count, Some(4));
        assert_eq!(args.range, Some(RequestedRange { start: 100, end: Some(199) }));
        assert!(args.strict);
    }

    #[test]
    fn test_args_reject_bad_range() {
        assert!(Args::try_parse_from(["rangedown", "-r", "abc", "example.com/index.txt"]).is_err());
    }

    #[test]
    fn test_args_require_index() {
        assert!(Args::try_parse_from(["rangedown"]).is_err());
    }

    #[test]
    fn test_load_config_merges_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("rangedown.conf");
        let config_path = config_path.to_str().unwrap();

        let args = Args::try_parse_from([
            "rangedown", "-c", config_path, "-t", "3", "example.com/index.txt",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.thread_count, 3);

        let args = Args::try_parse_from([
            "rangedown", "-c", config_path, "-t", "0", "example.com/index.txt",
        ])
        .unwrap();
        assert!(matches!(args.load_config(), Err(DownloadError::Config(_))));

        let args = Args::try_parse_from(["rangedown", "-c", config_path, "no-slash"]).unwrap();
        assert!(args.load_config().is_err());
    }
}

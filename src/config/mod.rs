use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::core::error::DownloadError;

/// 配置结构体
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 下载文件保存目录
    pub download_dir: String,
    /// 每个文件使用的连接数，1 表示不分片
    pub thread_count: usize,
    /// 服务器端口
    pub port: u16,
    /// 单次请求超时时间（秒），0 表示不限时
    pub timeout: u64,
    /// 日志级别：error / warn / info / debug / trace
    pub log_level: String,
    /// 日志文件，不设置时输出到标准错误
    pub log_file: Option<String>,
    /// 运行结束后写入 JSON 报告的路径
    pub report_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: ".".to_string(),
            thread_count: 1,
            port: 80,
            timeout: 0, // 默认不限时
            log_level: "info".to_string(),
            log_file: None,
            report_file: None,
        }
    }
}

pub const MAX_THREAD_COUNT: usize = 32;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// 加载配置文件，不存在时写入默认配置
    pub fn load(path: &str) -> Result<Self, DownloadError> {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            // 尝试解析TOML
            match toml::from_str(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    eprintln!("配置文件格式错误: {}，将使用默认配置", e);
                    let config = Config::default();
                    Config::save_with_tutorial(&config, path)?;
                    Ok(config)
                }
            }
        } else {
            let config = Config::default();
            Config::save_with_tutorial(&config, path)?;
            Ok(config)
        }
    }

    /// 保存带教程的配置文件（唯一写入方法）
    pub fn save_with_tutorial(&self, path: &str) -> Result<(), DownloadError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let config_content = toml::to_string_pretty(self)
            .map_err(|e| DownloadError::Config(format!("无法序列化配置: {}", e)))?;
        let full_content = format!("{}\n\n{}", Config::generate_tutorial_content(), config_content);
        fs::write(path, full_content)?;
        Ok(())
    }

    fn generate_tutorial_content() -> &'static str {
        r#"# RangeDown 配置文件
# ====================
#
# TOML 格式。命令行参数会覆盖这里的设置，优先级：命令行 > 配置文件 > 默认值
#
# 使用示例：
#   rangedown example.com/files/index.txt              # 逐个下载索引中的文件
#   rangedown -t 4 example.com/files/index.txt         # 每个文件分 4 段并行下载
#   rangedown -r 100-199 example.com/files/index.txt   # 每个文件只下载第 100-199 字节
#
# 索引文件每行一个目标，格式为 <主机>/<路径>，空行会被忽略。
#
# ==================== 下载设置 ====================
#
# download_dir  下载文件保存目录，文件名取目标路径的最后一段
# thread_count  每个文件的并行连接数，1 表示整文件单连接下载
#               分片数不能超过文件字节数，上限 32
#
# ==================== 网络设置 ====================
#
# port     服务器端口，只支持明文 HTTP
# timeout  单次请求超时时间（秒），0 表示不限时
#          不限时的情况下，对端不关闭连接且不返回 Content-Length 时会一直等待
#
# ==================== 日志与报告 ====================
#
# log_level    error / warn / info / debug / trace，环境变量 RUST_LOG 优先
# log_file     日志写入的文件，不设置时输出到标准错误
# report_file  运行结束后把每个文件的结果写成 JSON

# ==================== 配置项 ===================="#
    }

    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.thread_count == 0 {
            return Err(DownloadError::Config("线程数必须大于0".to_string()));
        }

        if self.thread_count > MAX_THREAD_COUNT {
            return Err(DownloadError::Config(format!("线程数不能超过{}", MAX_THREAD_COUNT)));
        }

        if self.port == 0 {
            return Err(DownloadError::Config("端口必须大于0".to_string()));
        }

        if self.download_dir.is_empty() {
            return Err(DownloadError::Config("下载目录不能为空".to_string()));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(DownloadError::Config(format!("无效的日志级别: {}", self.log_level)));
        }

        Ok(())
    }

    /// 合并命令行参数到配置
    pub fn merge_from_args(&mut self, args: &crate::cli::Args) {
        if let Some(dir) = &args.download_dir {
            self.download_dir = dir.clone();
        }

        if let Some(thread_count) = args.thread_count {
            self.thread_count = thread_count;
        }

        if let Some(port) = args.port {
            self.port = port;
        }

        if let Some(timeout) = args.timeout {
            self.timeout = timeout;
        }

        if let Some(report) = &args.report {
            self.report_file = Some(report.clone());
        }
    }

    /// 获取配置摘要信息
    pub fn get_summary(&self) -> String {
        format!(
            "配置摘要:\n\
            - 下载目录: {}\n\
            - 线程数: {}\n\
            - 端口: {}\n\
            - 超时时间: {}\n\
            - 日志级别: {}",
            self.download_dir,
            self.thread_count,
            self.port,
            if self.timeout == 0 { "不限时".to_string() } else { format!("{} 秒", self.timeout) },
            self.log_level,
        )
    }
}

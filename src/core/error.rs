use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("连接错误: {0}")]
    Connection(String),

    #[error("响应解析错误: {0}")]
    Parse(String),

    #[error("文件不存在: {0}")]
    NotFound(String),

    #[error("无法分片: {workers} 个线程无法划分 {total} 字节")]
    Partition {
        total: u64,
        workers: usize,
    },

    #[error("分片下载失败: 线程 {failed_indices:?}")]
    WorkerFailure {
        failed_indices: Vec<usize>,
    },

    #[error("索引文件不可用: {0}")]
    IndexUnavailable(String),

    #[error("无效的目标: {0}")]
    InvalidTarget(String),

    #[error("意外的响应状态: {0}")]
    UnexpectedStatus(String),

    #[error("大小不匹配: 预期 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch {
        expected: u64,
        actual: u64,
    },

    #[error("响应缺少 Content-Length")]
    MissingContentLength,

    #[error("请求超时")]
    Timeout,

    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("配置错误: {0}")]
    Config(String),
}

impl DownloadError {
    /// 单次请求在网络层面失败（连接不上、连接中断、超时）
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            DownloadError::Connection(_) |
            DownloadError::Timeout
        )
    }

    /// 是否需要终止整个运行，其余错误只影响当前目标
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            DownloadError::IndexUnavailable(_) |
            DownloadError::Config(_)
        )
    }
}

pub type DownloadResult<T> = Result<T, DownloadError>;

//! Core: 请求构造、传输、响应解析、字节范围划分、并行下载与流程编排

pub mod client;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod message;
pub mod outcome;
pub mod partition;
pub mod response;
pub mod sink;
pub mod target;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// 只导出主流程和其它模块实际用到的类型
pub use client::HttpClient;
pub use downloader::Downloader;
pub use error::{DownloadError, DownloadResult};
pub use fetcher::{Fetcher, FetchRequest, ParallelFetcher, SingleFetcher};
pub use outcome::{RunReport, TargetOutcome, TargetReport};
pub use partition::{partition, ByteRange, Partition, RequestedRange};
pub use sink::{FileSink, Sink};
pub use target::Target;
pub use transport::{TcpTransport, Transport};

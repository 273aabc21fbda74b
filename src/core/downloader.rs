//! 下载流程编排：取索引文件，然后逐个目标 HEAD → 分片 → 下载 → 写入
//!
//! 目标之间串行，只有同一目标的分片并行。

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::core::client::HttpClient;
use crate::core::error::{DownloadError, DownloadResult};
use crate::core::fetcher::{FetchRequest, Fetcher, ParallelFetcher, SingleFetcher};
use crate::core::outcome::{TargetOutcome, TargetReport};
use crate::core::partition::RequestedRange;
use crate::core::response::Status;
use crate::core::sink::{FileSink, Sink};
use crate::core::target::{parse_index, Target};
use crate::core::transport::TcpTransport;
use crate::ui::{self, ProgressManager};

/// 线程数大于 1 时并行分片，否则单连接下载
pub fn select_fetcher(client: HttpClient, workers: usize, progress: ProgressManager) -> Box<dyn Fetcher> {
    if workers > 1 {
        Box::new(ParallelFetcher::new(client, workers).with_progress(progress))
    } else {
        Box::new(SingleFetcher::new(client))
    }
}

pub struct Downloader {
    client: HttpClient,
    fetcher: Box<dyn Fetcher>,
    sink: Arc<dyn Sink>,
    range: Option<RequestedRange>,
}

impl Downloader {
    pub fn new(client: HttpClient, fetcher: Box<dyn Fetcher>, sink: Arc<dyn Sink>) -> Self {
        Self {
            client,
            fetcher,
            sink,
            range: None,
        }
    }

    /// 每个目标只下载这一段
    pub fn with_range(mut self, range: Option<RequestedRange>) -> Self {
        self.range = range;
        self
    }

    pub fn from_config(config: &Config, progress: ProgressManager) -> Self {
        let timeout = match config.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let transport = TcpTransport::new(config.port).with_timeout(timeout);
        log::debug!("端口: {}, 超时: {:?}", transport.port(), timeout);
        let client = HttpClient::new(Arc::new(transport));
        let fetcher = select_fetcher(client.clone(), config.thread_count, progress);
        let sink = Arc::new(FileSink::new(&config.download_dir));
        log::info!("下载目录: {}", sink.dir().display());
        Self::new(client, fetcher, sink)
    }

    /// 下载索引文件并返回其中的目标描述符
    pub async fn fetch_index(&self, index: &Target) -> DownloadResult<Vec<String>> {
        let response = self
            .client
            .get(index, None)
            .await
            .map_err(|e| DownloadError::IndexUnavailable(e.to_string()))?;
        if response.status() != Status::Ok {
            return Err(DownloadError::IndexUnavailable(response.status_line));
        }
        let body = String::from_utf8_lossy(&response.body);
        Ok(parse_index(&body))
    }

    /// 完整运行一次。只有索引文件不可用时返回错误，单个目标的失败记录在结果里
    pub async fn run(&self, index_descriptor: &str) -> DownloadResult<Vec<TargetReport>> {
        let index = Target::parse(index_descriptor)
            .map_err(|e| DownloadError::IndexUnavailable(e.to_string()))?;
        log::info!("索引文件: {}", index);

        let descriptors = self.fetch_index(&index).await?;
        log::info!("索引文件下载完成，共 {} 个目标", descriptors.len());
        println!("索引文件下载完成，共 {} 个目标", descriptors.len());

        let mut reports = Vec::with_capacity(descriptors.len());
        for (i, descriptor) in descriptors.into_iter().enumerate() {
            log::info!("{}. 尝试下载 {}", i + 1, descriptor);
            let outcome = match Target::parse(&descriptor) {
                Ok(target) => self.download_target(&target).await,
                Err(e) => TargetOutcome::Failed { reason: e.to_string() },
            };
            ui::print_outcome(i + 1, &descriptor, &outcome);
            reports.push(TargetReport {
                index: i + 1,
                target: descriptor,
                outcome,
            });
        }

        Ok(reports)
    }

    /// 下载单个目标，任何错误都转为 `Failed`
    pub async fn download_target(&self, target: &Target) -> TargetOutcome {
        match self.try_download(target).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_connection_level() {
                    log::warn!("下载 {} 失败，网络错误: {}", target, e);
                } else {
                    log::error!("下载 {} 失败: {}", target, e);
                }
                TargetOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    async fn try_download(&self, target: &Target) -> DownloadResult<TargetOutcome> {
        let name = target.file_name()?.to_string();

        let head = self.client.head(target).await?;
        match head.status() {
            Status::Ok => {}
            Status::NotFound => return Ok(TargetOutcome::NotFound),
            _ => {
                log::warn!("HEAD {} 返回 {}", target, head.status_line);
                return Ok(TargetOutcome::NotFound);
            }
        }

        let length = head.content_length();
        let request = match self.range {
            Some(range) => {
                let length = length.ok_or(DownloadError::MissingContentLength)?;
                match range.clamp(length) {
                    Some(span) => FetchRequest::Span(span),
                    None => {
                        log::info!("{} 只有 {} 字节，小于起始位置 {}", target, length, range.start);
                        return Ok(TargetOutcome::SkippedTooSmall { length });
                    }
                }
            }
            None => FetchRequest::Whole { length },
        };

        log::info!("{} 使用 {} 个连接下载", target, self.fetcher.workers());
        let body = self.fetcher.fetch(target, request).await?;
        self.sink.write(&name, &body).await?;

        let range = match request {
            FetchRequest::Span(span) => Some(span),
            FetchRequest::Whole { .. } => None,
        };
        Ok(TargetOutcome::Downloaded {
            name,
            byte_count: body.len() as u64,
            range,
        })
    }
}

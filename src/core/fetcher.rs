//! 下载正文的两种方式：单连接整体下载、按字节范围多线程并行下载
//!
//! 两者实现同一个 `Fetcher` trait，由配置的线程数决定使用哪一个。

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::future::join_all;
use indicatif::ProgressBar;

use crate::core::client::HttpClient;
use crate::core::error::{DownloadError, DownloadResult};
use crate::core::partition::{partition, partition_span, ByteRange, Partition};
use crate::core::response::{HttpResponse, Status};
use crate::core::target::Target;
use crate::ui::ProgressManager;

/// 要下载的内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    /// 整个资源；长度来自 HEAD，可能未知
    Whole { length: Option<u64> },
    /// 资源中的一段
    Span(ByteRange),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &Target, request: FetchRequest) -> DownloadResult<Bytes>;

    /// 每个目标使用的连接数
    fn workers(&self) -> usize;
}

/// 单个线程的下载结果，在汇合前只归该线程所有
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub index: usize,
    pub range: ByteRange,
    pub body: Bytes,
}

fn check_length(expected: u64, body: &Bytes) -> DownloadResult<()> {
    let actual = body.len() as u64;
    if actual != expected {
        return Err(DownloadError::SizeMismatch { expected, actual });
    }
    Ok(())
}

fn unexpected(target: &Target, response: &HttpResponse) -> DownloadError {
    match response.status() {
        Status::NotFound => DownloadError::NotFound(target.to_string()),
        _ => DownloadError::UnexpectedStatus(response.status_line.clone()),
    }
}

/// 一条连接、一个 GET
#[derive(Clone)]
pub struct SingleFetcher {
    client: HttpClient,
}

impl SingleFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for SingleFetcher {
    async fn fetch(&self, target: &Target, request: FetchRequest) -> DownloadResult<Bytes> {
        match request {
            FetchRequest::Whole { length } => {
                let response = self.client.get(target, None).await?;
                if response.status() != Status::Ok {
                    return Err(unexpected(target, &response));
                }
                if let Some(length) = length {
                    check_length(length, &response.body)?;
                }
                Ok(response.body)
            }
            FetchRequest::Span(range) => {
                let response = self.client.get(target, Some(range)).await?;
                match response.status() {
                    Status::Ok | Status::PartialContent => {}
                    _ => return Err(unexpected(target, &response)),
                }
                check_length(range.len(), &response.body)?;
                Ok(response.body)
            }
        }
    }

    fn workers(&self) -> usize {
        1
    }
}

/// 每个分片一个并发任务，全部结束后按分片顺序拼接
#[derive(Clone)]
pub struct ParallelFetcher {
    client: HttpClient,
    workers: usize,
    progress: ProgressManager,
}

impl ParallelFetcher {
    pub fn new(client: HttpClient, workers: usize) -> Self {
        Self {
            client,
            workers,
            progress: ProgressManager::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = progress;
        self
    }
}

#[async_trait]
impl Fetcher for ParallelFetcher {
    async fn fetch(&self, target: &Target, request: FetchRequest) -> DownloadResult<Bytes> {
        let plan = match request {
            FetchRequest::Whole { length: Some(0) } => {
                // 空资源无法表示为字节范围
                return SingleFetcher::new(self.client.clone()).fetch(target, request).await;
            }
            FetchRequest::Whole { length: Some(length) } => partition(length, self.workers)?,
            FetchRequest::Whole { length: None } => return Err(DownloadError::MissingContentLength),
            FetchRequest::Span(span) => partition_span(span, self.workers)?,
        };

        let bar = if self.progress.is_hidden() {
            None
        } else {
            Some(self.progress.worker_bar(&target.to_string(), plan.len()))
        };
        let results = run_workers(&self.client, target, &plan, bar.clone()).await;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        Ok(reassemble(results?))
    }

    fn workers(&self) -> usize {
        self.workers
    }
}

/// 并发下载 `plan` 中的每个分片，按分片顺序返回各段正文。
///
/// 任一线程失败时整体失败并给出失败线程的下标，已下载的分片全部丢弃。
pub async fn fetch_ranges(
    client: &HttpClient,
    target: &Target,
    plan: &Partition,
) -> DownloadResult<Vec<Bytes>> {
    run_workers(client, target, plan, None).await
}

async fn run_workers(
    client: &HttpClient,
    target: &Target,
    plan: &Partition,
    bar: Option<ProgressBar>,
) -> DownloadResult<Vec<Bytes>> {
    log::info!("启动 {} 个线程下载 {}", plan.len(), target);

    let handles: Vec<_> = plan
        .iter()
        .copied()
        .enumerate()
        .map(|(index, range)| {
            let client = client.clone();
            let target = target.clone();
            let bar = bar.clone();
            tokio::spawn(async move {
                let result = fetch_one(&client, &target, index, range).await;
                if let Some(bar) = bar {
                    bar.inc(1);
                }
                result
            })
        })
        .collect();

    // 汇合点：所有线程结束前不读取任何结果
    let joined = join_all(handles).await;

    let mut slots: Vec<Option<WorkerResult>> = vec![None; plan.len()];
    let mut failed_indices = Vec::new();
    for (index, outcome) in joined.into_iter().enumerate() {
        match outcome {
            Ok(Ok(result)) => {
                log::info!(
                    "线程 {} 下载完成 | 字节范围: {} | 长度: {}",
                    result.index,
                    result.range,
                    result.body.len()
                );
                let slot = result.index;
                slots[slot] = Some(result);
            }
            Ok(Err(e)) => {
                log::error!("线程 {} 下载失败: {}", index, e);
                failed_indices.push(index);
            }
            Err(e) => {
                log::error!("线程 {} 异常退出: {}", index, e);
                failed_indices.push(index);
            }
        }
    }

    if !failed_indices.is_empty() {
        return Err(DownloadError::WorkerFailure { failed_indices });
    }

    Ok(slots.into_iter().flatten().map(|r| r.body).collect())
}

async fn fetch_one(
    client: &HttpClient,
    target: &Target,
    index: usize,
    range: ByteRange,
) -> DownloadResult<WorkerResult> {
    let response = client.get(target, Some(range)).await?;
    match response.status() {
        Status::Ok | Status::PartialContent => {}
        _ => return Err(unexpected(target, &response)),
    }
    check_length(range.len(), &response.body)?;
    Ok(WorkerResult { index, range, body: response.body })
}

/// 按顺序拼接各段正文
pub fn reassemble(parts: Vec<Bytes>) -> Bytes {
    let total = parts.iter().map(Bytes::len).sum();
    let mut out = BytesMut::with_capacity(total);
    for part in parts {
        out.extend_from_slice(&part);
    }
    out.freeze()
}

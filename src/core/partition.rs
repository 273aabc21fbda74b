//! 字节范围划分：把一个资源（或其中一段）均匀分给 N 个线程

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::core::error::{DownloadError, DownloadResult};

/// 闭区间字节范围 `[start, end]`，保证 `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// 覆盖整个资源的范围，长度为 0 时不存在
    pub fn whole(total_length: u64) -> Option<Self> {
        if total_length == 0 {
            None
        } else {
            Some(Self { start: 0, end: total_length - 1 })
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Range` 请求头的值
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// 用户请求的范围 `start-end` 或 `start-`，结束位置按资源长度截断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl RequestedRange {
    /// 起始位置不在资源内时返回 `None`
    pub fn clamp(&self, total_length: u64) -> Option<ByteRange> {
        if self.start >= total_length {
            return None;
        }
        let last = total_length - 1;
        let end = self.end.map_or(last, |end| end.min(last));
        ByteRange::new(self.start, end)
    }
}

impl FromStr for RequestedRange {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DownloadError::Config(format!("无效的字节范围: {:?}，应为 start-end 或 start-", s));
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse::<u64>().map_err(|_| invalid())?;
        let end = match end.trim() {
            "" => None,
            end => Some(end.parse::<u64>().map_err(|_| invalid())?),
        };
        if matches!(end, Some(end) if end < start) {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for RequestedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-", self.start),
        }
    }
}

/// 有序的分片列表：互不重叠、首尾相接、严格递增
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    ranges: Vec<ByteRange>,
}

impl Partition {
    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// 所有分片覆盖的字节数
    pub fn total_len(&self) -> u64 {
        self.ranges.iter().map(ByteRange::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ByteRange> {
        self.ranges.iter()
    }
}

/// 把 `[0, total_length-1]` 划分给 `worker_count` 个线程。
///
/// 设 `base = total / n`、`remainder = total % n`，前 `remainder` 个分片各多分 1 字节。
pub fn partition(total_length: u64, worker_count: usize) -> DownloadResult<Partition> {
    if worker_count == 0 || worker_count as u64 > total_length {
        return Err(DownloadError::Partition { total: total_length, workers: worker_count });
    }

    let workers = worker_count as u64;
    let base = total_length / workers;
    let remainder = total_length % workers;

    let mut ranges = Vec::with_capacity(worker_count);
    let mut start = 0u64;
    for index in 0..workers {
        let size = if index < remainder { base + 1 } else { base };
        let end = start + size - 1;
        ranges.push(ByteRange { start, end });
        start = end + 1;
    }

    Ok(Partition { ranges })
}

/// 划分资源中的一段，分片按 `span.start` 平移
pub fn partition_span(span: ByteRange, worker_count: usize) -> DownloadResult<Partition> {
    let local = partition(span.len(), worker_count)?;
    let ranges = local
        .ranges
        .into_iter()
        .map(|r| ByteRange { start: r.start + span.start, end: r.end + span.start })
        .collect();
    Ok(Partition { ranges })
}

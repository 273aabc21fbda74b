use std::path::Path;
use chrono::{DateTime, Local};
use serde::{Serialize, Deserialize};

use crate::core::error::DownloadResult;
use crate::core::partition::ByteRange;

/// 单个目标的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    Downloaded {
        name: String,
        byte_count: u64,
        /// 只下载了资源中的一段时记录该段
        range: Option<ByteRange>,
    },
    SkippedTooSmall {
        length: u64,
    },
    NotFound,
    Failed {
        reason: String,
    },
}

impl TargetOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, TargetOutcome::Downloaded { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    /// 在索引中的序号，从 1 开始
    pub index: usize,
    pub target: String,
    pub outcome: TargetOutcome,
}

/// 一次运行的全部结果，可写成 JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub index_target: String,
    pub finished_at: DateTime<Local>,
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    pub fn new(index_target: &str, targets: Vec<TargetReport>) -> Self {
        Self {
            index_target: index_target.to_string(),
            finished_at: Local::now(),
            targets,
        }
    }

    pub fn all_downloaded(&self) -> bool {
        self.targets.iter().all(|t| t.outcome.is_downloaded())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> DownloadResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

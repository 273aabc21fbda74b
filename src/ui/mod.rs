mod progress;

use std::fmt;
use std::time::Duration;
pub use progress::ProgressManager;

use crate::core::outcome::{TargetOutcome, TargetReport};

pub fn print_success(message: &str) {
    println!("✓ {}", message);
}

pub fn print_error(message: &str) {
    println!("✗ {}", message);
}

/// 一个目标一行结果
pub fn outcome_line(index: usize, target: &str, outcome: &TargetOutcome) -> String {
    match outcome {
        TargetOutcome::Downloaded { name, byte_count, range: Some(range) } => format!(
            "{}. {} 下载完成: {} (范围 = {}, {})",
            index, target, name, range, format_size(*byte_count)
        ),
        TargetOutcome::Downloaded { name, byte_count, range: None } => format!(
            "{}. {} 下载完成: {} (大小 = {})",
            index, target, name, format_size(*byte_count)
        ),
        TargetOutcome::SkippedTooSmall { length } => format!(
            "{}. {} 无法下载: 文件比起始位置小 (大小 = {} 字节)",
            index, target, length
        ),
        TargetOutcome::NotFound => format!("{}. {} 下载失败: 文件不存在", index, target),
        TargetOutcome::Failed { reason } => format!("{}. {} 下载失败: {}", index, target, reason),
    }
}

pub fn print_outcome(index: usize, target: &str, outcome: &TargetOutcome) {
    let line = outcome_line(index, target, outcome);
    if outcome.is_downloaded() {
        print_success(&line);
    } else {
        print_error(&line);
    }
}

pub struct DownloadSummary {
    pub total_files: usize,
    pub total_size: u64,
    pub elapsed_time: Duration,
    pub success_count: usize,
    pub skipped_count: usize,
    pub not_found_count: usize,
    pub failed_count: usize,
}

impl DownloadSummary {
    pub fn from_reports(reports: &[TargetReport], elapsed_time: Duration) -> Self {
        let mut summary = Self {
            total_files: reports.len(),
            total_size: 0,
            elapsed_time,
            success_count: 0,
            skipped_count: 0,
            not_found_count: 0,
            failed_count: 0,
        };
        for report in reports {
            match &report.outcome {
                TargetOutcome::Downloaded { byte_count, .. } => {
                    summary.success_count += 1;
                    summary.total_size += byte_count;
                }
                TargetOutcome::SkippedTooSmall { .. } => summary.skipped_count += 1,
                TargetOutcome::NotFound => summary.not_found_count += 1,
                TargetOutcome::Failed { .. } => summary.failed_count += 1,
            }
        }
        summary
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n下载摘要:")?;
        writeln!(f, "总文件数: {}", self.total_files)?;
        writeln!(f, "总大小: {}", format_size(self.total_size))?;
        writeln!(f, "耗时: {:.2}秒", self.elapsed_time.as_secs_f64())?;
        writeln!(f, "成功: {}", self.success_count)?;
        writeln!(f, "跳过: {}", self.skipped_count)?;
        writeln!(f, "不存在: {}", self.not_found_count)?;
        writeln!(f, "失败: {}", self.failed_count)?;
        Ok(())
    }
}

pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if size < 1024 {
        return format!("{} B", size);
    }
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

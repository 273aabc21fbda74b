use std::path::{Path, PathBuf};
use async_trait::async_trait;

use crate::core::error::DownloadResult;

/// 下载结果的写入目的地，按名称写入整段字节
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, name: &str, data: &[u8]) -> DownloadResult<()>;
}

/// 写入本地目录。先写临时文件再重命名，失败时不会覆盖已有文件
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, name: &str, data: &[u8]) -> DownloadResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(name);
        let temp_path = self.dir.join(format!(".{}.part", name));
        let written = match tokio::fs::write(&temp_path, data).await {
            Ok(()) => tokio::fs::rename(&temp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // 清理残留的临时文件
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                log::debug!("无法删除临时文件 {}: {}", temp_path.display(), cleanup);
            }
            return Err(e.into());
        }
        log::info!("文件已保存: {} ({} 字节)", path.display(), data.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_writes_bytes_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("nested"));
        let payload = vec![0u8, 0xff, b'\r', b'\n', 0x80, b'a'];

        sink.write("data.bin", &payload).await.unwrap();

        let written = std::fs::read(sink.path_for("data.bin")).unwrap();
        assert_eq!(written, payload);
        assert!(!sink.dir().join(".data.bin.part").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        // 目标位置已有同名目录，重命名必然失败
        std::fs::create_dir(dir.path().join("taken")).unwrap();

        let err = sink.write("taken", b"payload").await.unwrap_err();
        assert!(matches!(err, crate::core::error::DownloadError::Io(_)));
        assert!(!dir.path().join(".taken.part").exists());
        assert!(dir.path().join("taken").is_dir());
    }

    #[tokio::test]
    async fn test_file_sink_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        sink.write("a.txt", b"old content").await.unwrap();
        sink.write("a.txt", b"new").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"new");
    }
}

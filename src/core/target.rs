use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::error::{DownloadError, DownloadResult};

/// 下载目标，描述符形如 `<host>/<path>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub host: String,
    pub path: String,
}

impl Target {
    /// 在第一个 `/` 处切分主机与路径，两者都不能为空
    pub fn parse(descriptor: &str) -> DownloadResult<Self> {
        let descriptor = descriptor.trim();
        match descriptor.split_once('/') {
            Some((host, path)) if !host.is_empty() && !path.is_empty() => Ok(Self {
                host: host.to_string(),
                path: path.to_string(),
            }),
            _ => Err(DownloadError::InvalidTarget(descriptor.to_string())),
        }
    }

    /// 输出文件名：路径的最后一段
    pub fn file_name(&self) -> DownloadResult<&str> {
        match self.path.rsplit('/').next() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(DownloadError::InvalidTarget(format!("{} 的路径没有文件名", self))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.path)
    }
}

/// 解析索引文件正文：按行切分、去掉首尾空白、丢弃空行，保持原有顺序
pub fn parse_index(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

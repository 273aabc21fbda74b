//! 单元测试用的脚本化传输层与内存输出

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use async_trait::async_trait;

use crate::core::error::{DownloadError, DownloadResult};
use crate::core::message::RequestMessage;
use crate::core::sink::Sink;
use crate::core::transport::Transport;

/// 按描述符提供资源，支持 HEAD、GET 和 Range；记录收到的每条请求
#[derive(Default)]
pub struct ScriptedTransport {
    resources: HashMap<String, Vec<u8>>,
    failing_starts: HashSet<u64>,
    error_starts: HashSet<u64>,
    malformed_starts: HashSet<u64>,
    lowercase_length: bool,
    no_length: HashSet<String>,
    ignore_range: bool,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, descriptor: &str, body: &[u8]) -> Self {
        self.resources.insert(descriptor.to_string(), body.to_vec());
        self
    }

    /// 起始字节为 `start` 的分片请求以连接错误失败
    pub fn failing_range_at(mut self, start: u64) -> Self {
        self.failing_starts.insert(start);
        self
    }

    /// 起始字节为 `start` 的分片请求返回 500
    pub fn error_status_at(mut self, start: u64) -> Self {
        self.error_starts.insert(start);
        self
    }

    /// 起始字节为 `start` 的分片请求返回没有头部分隔符的字节
    pub fn malformed_at(mut self, start: u64) -> Self {
        self.malformed_starts.insert(start);
        self
    }

    /// 所有响应的长度头写成 `content-length`
    pub fn lowercase_length(mut self) -> Self {
        self.lowercase_length = true;
        self
    }

    /// HEAD 响应不带 Content-Length
    pub fn without_content_length(mut self, descriptor: &str) -> Self {
        self.no_length.insert(descriptor.to_string());
        self
    }

    /// 忽略 Range 头，总是返回完整资源
    pub fn ignoring_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    /// 形如 `GET /a.bin bytes=0-3` 的请求记录
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(&format!("{} ", method)))
            .count()
    }
}

fn respond(status: &str, headers: &[(&str, String)], body: &[u8]) -> Vec<u8> {
    let mut raw = status.as_bytes().to_vec();
    for (key, value) in headers {
        raw.extend_from_slice(format!("\r\n{}: {}", key, value).as_bytes());
    }
    raw.extend_from_slice(b"\r\n\r\n");
    raw.extend_from_slice(body);
    raw
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, host: &str, request: &RequestMessage) -> DownloadResult<Vec<u8>> {
        let mut lines = request.as_str().split("\r\n");
        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split(' ');
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();
        let range = lines
            .find_map(|line| line.strip_prefix("Range: bytes="))
            .and_then(|value| value.split_once('-'))
            .map(|(s, e)| (s.parse::<u64>().unwrap(), e.parse::<u64>().unwrap()));

        let mut record = format!("{} {}", method, path);
        if let Some((start, end)) = range {
            record.push_str(&format!(" bytes={}-{}", start, end));
        }
        self.requests.lock().unwrap().push(record);

        let length_key = if self.lowercase_length { "content-length" } else { "Content-Length" };
        let key = format!("{}{}", host, path);
        let body = match self.resources.get(&key) {
            Some(body) => body,
            None => return Ok(respond("HTTP/1.1 404 Not Found", &[], b"")),
        };

        if method == "HEAD" {
            let headers = if self.no_length.contains(&key) {
                vec![]
            } else {
                vec![(length_key, body.len().to_string())]
            };
            return Ok(respond("HTTP/1.1 200 OK", &headers, b""));
        }

        match range {
            Some((start, _)) if self.failing_starts.contains(&start) => {
                Err(DownloadError::Connection(format!("连接被重置: {}", key)))
            }
            Some((start, _)) if self.error_starts.contains(&start) => {
                Ok(respond("HTTP/1.1 500 Internal Server Error", &[], b""))
            }
            Some((start, _)) if self.malformed_starts.contains(&start) => {
                Ok(b"HTTP/1.1 206 Partial Content\r\nContent-Length: 3".to_vec())
            }
            Some((start, end)) if !self.ignore_range => {
                let slice = &body[start as usize..=end as usize];
                Ok(respond(
                    "HTTP/1.1 206 Partial Content",
                    &[
                        (length_key, slice.len().to_string()),
                        ("Content-Range", format!("bytes {}-{}/{}", start, end, body.len())),
                    ],
                    slice,
                ))
            }
            _ => Ok(respond(
                "HTTP/1.1 200 OK",
                &[(length_key, body.len().to_string())],
                body,
            )),
        }
    }
}

/// 把写入保存在内存中
#[derive(Default)]
pub struct MemorySink {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write(&self, name: &str, data: &[u8]) -> DownloadResult<()> {
        self.files.lock().unwrap().insert(name.to_string(), data.to_vec());
        Ok(())
    }
}

//! HTTP 响应解析：状态行、头部、正文
//!
//! 状态行按原文与固定字符串比较，不提取数字状态码。

use bytes::{Bytes, BytesMut, BufMut};

use crate::core::error::{DownloadError, DownloadResult};

pub const HEADER_BOUNDARY: &[u8] = b"\r\n\r\n";

pub const STATUS_OK: &str = "HTTP/1.1 200 OK";
pub const STATUS_PARTIAL_CONTENT: &str = "HTTP/1.1 206 Partial Content";
pub const STATUS_NOT_FOUND: &str = "HTTP/1.1 404 Not Found";

/// 由状态行归类得到的结果，状态机按此分支
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    PartialContent,
    NotFound,
    Other(String),
}

impl Status {
    pub fn from_status_line(line: &str) -> Self {
        match line {
            STATUS_OK => Status::Ok,
            STATUS_PARTIAL_CONTENT => Status::PartialContent,
            STATUS_NOT_FOUND => Status::NotFound,
            other => Status::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_line: String,
    /// 按出现顺序保存；同名键查询时取最后一次出现的值
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn status(&self) -> Status {
        Status::from_status_line(&self.status_line)
    }

    /// 按原样的键查找头部，不做大小写归一
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 与传输层分帧一致，按不区分大小写的键取最后一个 `Content-Length`
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
            .and_then(|(_, v)| v.trim().parse::<u64>().ok())
    }

    /// 用解析时相同的分隔符重新拼出原始报文
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.status_line.len() + self.body.len() + 64);
        out.put_slice(self.status_line.as_bytes());
        for (key, value) in &self.headers {
            out.put_slice(b"\r\n");
            out.put_slice(key.as_bytes());
            out.put_slice(b": ");
            out.put_slice(value.as_bytes());
        }
        out.put_slice(HEADER_BOUNDARY);
        out.put_slice(&self.body);
        out.freeze()
    }
}

pub fn find_boundary(raw: &[u8]) -> Option<usize> {
    raw.windows(HEADER_BOUNDARY.len()).position(|w| w == HEADER_BOUNDARY)
}

/// 在第一个 `CRLF CRLF` 处切分头部与正文
pub fn parse(raw: impl Into<Bytes>) -> DownloadResult<HttpResponse> {
    let raw: Bytes = raw.into();
    let boundary = find_boundary(&raw)
        .ok_or_else(|| DownloadError::Parse("找不到头部与正文的分隔符".to_string()))?;

    let head = std::str::from_utf8(&raw[..boundary])
        .map_err(|e| DownloadError::Parse(format!("头部不是合法的 UTF-8: {}", e)))?;
    let body = raw.slice(boundary + HEADER_BOUNDARY.len()..);

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    for line in lines {
        let (key, value) = line
            .split_once(": ")
            .ok_or_else(|| DownloadError::Parse(format!("无效的头部行: {:?}", line)))?;
        headers.push((key.to_string(), value.to_string()));
    }

    Ok(HttpResponse { status_line, headers, body })
}

//! HTTP/1.1 请求报文构造
//!
//! 不发送 `Connection` 头，对端在响应后关闭连接。

use std::fmt;

use crate::core::partition::ByteRange;

/// 请求方法，传输层据此判断响应是否带有正文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
        }
    }
}

/// 已格式化好的请求报文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    pub method: Method,
    pub text: String,
}

impl RequestMessage {
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RequestMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn request_line(method: Method, path: &str) -> String {
    if path.starts_with('/') {
        format!("{} {} HTTP/1.1\r\n", method.as_str(), path)
    } else {
        format!("{} /{} HTTP/1.1\r\n", method.as_str(), path)
    }
}

/// GET 请求，指定范围时附带 `Range: bytes=<start>-<end>`
pub fn build_get(host: &str, path: &str, range: Option<ByteRange>) -> RequestMessage {
    let mut text = request_line(Method::Get, path);
    text.push_str(&format!("Host: {}\r\n", host));
    if let Some(range) = range {
        text.push_str(&format!("Range: {}\r\n", range.header_value()));
    }
    text.push_str("\r\n");
    RequestMessage { method: Method::Get, text }
}

pub fn build_head(host: &str, path: &str) -> RequestMessage {
    let mut text = request_line(Method::Head, path);
    text.push_str(&format!("Host: {}\r\n", host));
    text.push_str("\r\n");
    RequestMessage { method: Method::Head, text }
}

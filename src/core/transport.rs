//! 传输层：每个请求独占一条 TCP 连接，发送后读取完整响应再关闭

use std::time::Duration;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::core::error::{DownloadError, DownloadResult};
use crate::core::message::{Method, RequestMessage};
use crate::core::response::{find_boundary, HEADER_BOUNDARY};

const READ_CHUNK_SIZE: usize = 8192;

/// 发送一条请求并返回原始响应字节
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, host: &str, request: &RequestMessage) -> DownloadResult<Vec<u8>>;
}

/// 基于 `tokio::net::TcpStream` 的传输实现，连接从不复用
#[derive(Debug, Clone)]
pub struct TcpTransport {
    port: u16,
    timeout: Option<Duration>,
}

impl TcpTransport {
    pub fn new(port: u16) -> Self {
        Self { port, timeout: None }
    }

    /// 限制单次请求（连接、写入、读取）的总耗时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(80)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, host: &str, request: &RequestMessage) -> DownloadResult<Vec<u8>> {
        let port = self.port;
        let round_trip = async move {
            let mut stream = TcpStream::connect((host, port))
                .await
                .map_err(|e| DownloadError::Connection(format!("无法连接 {}:{}: {}", host, port, e)))?;
            // stream 在离开作用域时关闭，出错路径同样如此
            exchange(&mut stream, request).await
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, round_trip)
                .await
                .map_err(|_| DownloadError::Timeout)?,
            None => round_trip.await,
        }
    }
}

/// 在已建立的流上写入请求并读取响应
pub async fn exchange<S>(stream: &mut S, request: &RequestMessage) -> DownloadResult<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| DownloadError::Connection(format!("发送请求失败: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DownloadError::Connection(format!("发送请求失败: {}", e)))?;
    read_response(stream, request.method).await
}

/// 读取一个完整响应。
///
/// 头部带 `Content-Length` 时只读到声明的长度（HEAD 响应没有正文），
/// 否则一直读到对端关闭连接。
pub async fn read_response<R>(reader: &mut R, method: Method) -> DownloadResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut response = Vec::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut header_seen = false;
    let mut expected: Option<usize> = None;

    loop {
        if let Some(total) = expected {
            if response.len() >= total {
                response.truncate(total);
                break;
            }
        }

        let n = reader
            .read(&mut buf)
            .await
            .map_err(|e| DownloadError::Connection(format!("读取响应失败: {}", e)))?;

        if n == 0 {
            if response.is_empty() {
                return Err(DownloadError::Connection("连接在返回任何数据前已关闭".to_string()));
            }
            if let Some(total) = expected {
                return Err(DownloadError::Connection(format!(
                    "连接提前关闭: 预期 {} 字节, 实际 {} 字节",
                    total,
                    response.len()
                )));
            }
            break;
        }
        response.extend_from_slice(&buf[..n]);

        if !header_seen {
            if let Some(pos) = find_boundary(&response) {
                header_seen = true;
                let body_start = pos + HEADER_BOUNDARY.len();
                expected = match framed_body_length(&response[..pos], method) {
                    Some(len) => Some(
                        body_start
                            .checked_add(len)
                            .ok_or_else(|| DownloadError::Parse("Content-Length 超出范围".to_string()))?,
                    ),
                    None => None,
                };
            }
        }
    }

    Ok(response)
}

/// 根据头部决定正文长度，未知时返回 `None`
fn framed_body_length(head: &[u8], method: Method) -> Option<usize> {
    if method == Method::Head {
        return Some(0);
    }
    let head = String::from_utf8_lossy(head);
    head.split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .last()
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{build_get, build_head};
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_read_until_close_without_content_length() {
        let mut mock = Builder::new()
            .read(b"HTTP/1.1 200 OK\r\n\r\nfirst ")
            .read(b"second")
            .build();
        let raw = read_response(&mut mock, Method::Get).await.unwrap();
        assert_eq!(raw, b"HTTP/1.1 200 OK\r\n\r\nfirst second".to_vec());
    }

    #[tokio::test]
    async fn test_content_length_stops_without_waiting_for_close() {
        // 读完声明的长度后若继续读取，会卡在一小时的等待上
        let mut mock = Builder::new()
            .read(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhel")
            .read(b"lo")
            .wait(Duration::from_secs(3600))
            .build();
        let raw = tokio::time::timeout(
            Duration::from_secs(5),
            read_response(&mut mock, Method::Get),
        )
        .await
        .expect("读取应在正文结束时返回")
        .unwrap();
        assert!(raw.ends_with(b"hello"));
    }

    #[tokio::test]
    async fn test_head_response_has_no_body() {
        let mut mock = Builder::new()
            .read(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n")
            .wait(Duration::from_secs(3600))
            .build();
        let raw = tokio::time::timeout(
            Duration::from_secs(5),
            read_response(&mut mock, Method::Head),
        )
        .await
        .expect("HEAD 响应不应等待正文")
        .unwrap();
        assert_eq!(raw, b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n".to_vec());
    }

    #[tokio::test]
    async fn test_lowercase_content_length_frames_body() {
        let mut mock = Builder::new()
            .read(b"HTTP/1.1 206 Partial Content\r\ncontent-length: 2\r\n\r\nab")
            .wait(Duration::from_secs(3600))
            .build();
        let raw = tokio::time::timeout(
            Duration::from_secs(5),
            read_response(&mut mock, Method::Get),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(raw.ends_with(b"\r\n\r\nab"));
    }

    #[tokio::test]
    async fn test_truncated_body_is_connection_error() {
        let mut mock = Builder::new()
            .read(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabcd")
            .build();
        let err = read_response(&mut mock, Method::Get).await.unwrap_err();
        assert!(matches!(err, DownloadError::Connection(_)));
    }

    #[tokio::test]
    async fn test_oversized_content_length_is_parse_error() {
        let mut mock = Builder::new()
            .read(b"HTTP/1.1 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\nabc")
            .build();
        let err = read_response(&mut mock, Method::Get).await.unwrap_err();
        match err {
            DownloadError::Parse(msg) => assert!(msg.contains("Content-Length")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_before_any_bytes_is_connection_error() {
        let mut mock = Builder::new().build();
        let err = read_response(&mut mock, Method::Get).await.unwrap_err();
        assert!(matches!(err, DownloadError::Connection(_)));
    }

    #[tokio::test]
    async fn test_exchange_writes_request_then_reads() {
        let request = build_head("example.com", "a.txt");
        let mut mock = Builder::new()
            .write(request.as_bytes())
            .read(b"HTTP/1.1 404 Not Found\r\n\r\n")
            .build();
        let raw = exchange(&mut mock, &request).await.unwrap();
        assert_eq!(raw, b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec());
    }

    #[tokio::test]
    async fn test_tcp_transport_unreachable_host() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = TcpTransport::new(port);
        let request = build_get("127.0.0.1", "a.txt", None);
        let err = transport.send("127.0.0.1", &request).await.unwrap_err();
        assert!(matches!(err, DownloadError::Connection(_)));
    }

    #[tokio::test]
    async fn test_tcp_transport_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // 接受连接但从不响应
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(3600)).await;
            drop(socket);
        });

        let transport = TcpTransport::new(port).with_timeout(Some(Duration::from_millis(200)));
        let request = build_get("127.0.0.1", "a.txt", None);
        let err = transport.send("127.0.0.1", &request).await.unwrap_err();
        assert!(matches!(err, DownloadError::Timeout));
        server.abort();
    }
}

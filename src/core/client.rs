use std::sync::Arc;

use crate::core::error::DownloadResult;
use crate::core::message::{build_get, build_head};
use crate::core::partition::ByteRange;
use crate::core::response::{parse, HttpResponse};
use crate::core::target::Target;
use crate::core::transport::Transport;

/// 请求构造 + 传输 + 解析，可在线程间廉价克隆
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn head(&self, target: &Target) -> DownloadResult<HttpResponse> {
        let request = build_head(&target.host, &target.path);
        log::debug!("HEAD {}", target);
        let raw = self.transport.send(&target.host, &request).await?;
        parse(raw)
    }

    pub async fn get(&self, target: &Target, range: Option<ByteRange>) -> DownloadResult<HttpResponse> {
        let request = build_get(&target.host, &target.path, range);
        match range {
            Some(range) => log::debug!("GET {} (bytes {})", target, range),
            None => log::debug!("GET {}", target),
        }
        let raw = self.transport.send(&target.host, &request).await?;
        parse(raw)
    }
}

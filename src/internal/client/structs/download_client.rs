use core::fmt;
use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::internal::remote_resource::downloader::structs::{
    DownloadError, DownloaderConfig,
};

/// 下载用 HTTP 客户端
///
/// 该结构体定位
/// - 包装一个共享的 [`reqwest::Client`]（内部是 Arc，clone 很便宜）
/// - 探测请求、分片请求、整文件请求都走同一个客户端，传输层超时对所有分片一致
#[derive(Clone)]
pub struct DownloadClient {
    pub client: Client,
}

impl DownloadClient {
    /// 按配置创建客户端：HTTP/1、默认 User-Agent、可选连接超时。
    pub fn new(config: &DownloaderConfig) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();

        let ua_value = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| DownloadError::ClientBuild(e.to_string()))?;
        headers.insert(USER_AGENT, ua_value);

        let mut builder = Client::builder().http1_only().default_headers(headers);
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| DownloadError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    /// 包装调用方已经配置好的客户端。
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl fmt::Debug for DownloadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadClient")
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

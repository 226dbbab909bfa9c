use serde::{Deserialize, Serialize};

/// 启用分片下载的最小文件大小：1MB；更小的文件直接单线程下载
pub const DEFAULT_MIN_CHUNKED_SIZE: u64 = 1024 * 1024;

/// 单次传输单元：8KB，每读写一个单元上报一次进度
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// 默认分片数（并发数）
pub const DEFAULT_THREADS: usize = 4;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("range_fetch/", env!("CARGO_PKG_VERSION"));

/// 下载器配置。所有请求共用一个 HTTP 客户端，超时由客户端统一施加，没有单分片超时。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// 文件大小达到该值且服务器支持 Range 时才分片
    pub min_chunked_size: u64,
    /// 传输单元大小（字节）
    pub buffer_size: usize,
    /// 每个请求携带的 User-Agent
    pub user_agent: String,
    /// 建立连接的超时（秒），不设则使用 reqwest 默认值
    pub connect_timeout_secs: Option<u64>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            min_chunked_size: DEFAULT_MIN_CHUNKED_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: None,
        }
    }
}

impl DownloaderConfig {
    /// 传输单元大小，至少 1 字节。
    pub(crate) fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}

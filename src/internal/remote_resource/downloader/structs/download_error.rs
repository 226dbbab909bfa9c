//! 下载相关错误类型。
//!
//! 探测失败不在这里：探测是软失败，直接退化为单线程下载。
//! 删除临时文件的失败同样被吞掉，不会构造成错误。

use thiserror::Error;

use crate::internal::remote_resource::downloader::traits::download::HookAbort;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("服务器返回错误状态 {status}: {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("分片 {index} 的 Range 请求未被服务器执行（状态 {status}）")]
    RangeNotHonored {
        index: usize,
        status: reqwest::StatusCode,
    },

    #[error("分片 {index} 长度不符：期望 {expected} 字节，实际 {actual} 字节")]
    ChunkLengthMismatch {
        index: usize,
        expected: u64,
        actual: u64,
    },

    #[error("响应体长度不符：期望 {expected} 字节，实际 {actual} 字节")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("无效的下载地址 {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("创建目录失败: {0}")]
    CreateDir(std::io::Error),

    #[error("创建文件失败: {0}")]
    CreateFile(std::io::Error),

    #[error("读取响应数据失败: {0}")]
    ReadBody(std::io::Error),

    #[error("写入文件失败: {0}")]
    WriteFile(std::io::Error),

    #[error("读取分片文件失败: {0}")]
    ReadPart(std::io::Error),

    #[error("合并分片失败: {0}")]
    Assemble(std::io::Error),

    #[error("下载被取消")]
    Cancelled,

    #[error("分片任务失败: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("创建 HTTP 客户端失败: {0}")]
    ClientBuild(String),

    /// 钩子在 before_start 中返回错误，中止下载。
    #[error("{0}")]
    HookAbort(#[from] HookAbort),
}

impl DownloadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}

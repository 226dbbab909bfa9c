use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::internal::remote_resource::downloader::structs::{
    DEFAULT_THREADS, DownloadError,
};

/// URL 里取不到文件名时使用的默认文件名
pub const DEFAULT_FILE_NAME: &str = "download.bin";

/// 一次下载请求：源地址、保存路径、期望的分片数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub save_path: PathBuf,
    pub threads: usize,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, save_path: impl AsRef<Path>) -> Self {
        Self {
            url: url.into(),
            save_path: save_path.as_ref().to_path_buf(),
            threads: DEFAULT_THREADS,
        }
    }

    /// 设置期望的分片数，至少为 1。
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// 根据 URL 与可选的保存路径推导完整请求。
    ///
    /// - 文件名取 URL 最后一段路径（百分号解码），取不到时为 [`DEFAULT_FILE_NAME`]；
    /// - 未给路径时保存到用户的下载目录；
    /// - 路径以 `~/` 开头时展开为用户主目录；
    /// - 路径是已存在的目录或以分隔符结尾时，在其后拼接文件名。
    pub fn resolve(url: &str, path: Option<&str>) -> Result<Self, DownloadError> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let file_name = file_name_from_url(&parsed);

        let save_path = match path.map(str::trim).filter(|p| !p.is_empty()) {
            None => default_download_dir().join(&file_name),
            Some(p) => {
                let expanded = expand_home(p);
                if expanded.is_dir() || p.ends_with('/') || p.ends_with('\\') {
                    expanded.join(&file_name)
                } else {
                    expanded
                }
            }
        };

        Ok(Self::new(parsed.as_str(), save_path))
    }

    /// 进度快照里展示的文件名。
    pub fn file_name(&self) -> String {
        self.save_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
    }
}

fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .map(|seg| {
            percent_decode_str(seg)
                .decode_utf8_lossy()
                .replace(['/', '\\'], "_")
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

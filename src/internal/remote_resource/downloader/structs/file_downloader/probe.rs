//! 能力探测：HEAD 请求拿资源大小与 Range 支持情况。探测失败不致命，退化为单线程下载。

use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, HeaderMap};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{DownloadError, ProbeResult};

use super::cancellation::cancellable;

/// 探测资源大小与 Range 支持；任何网络错误或非 2xx 状态都视为「大小未知、不支持 Range」。
pub async fn probe(
    client: &DownloadClient,
    url: &str,
    cancel: &CancellationToken,
) -> ProbeResult {
    let request = async {
        client
            .client
            .head(url)
            .send()
            .await
            .map_err(DownloadError::Request)
    };

    match cancellable(cancel, request).await {
        Ok(resp) if resp.status().is_success() => {
            let result = probe_from_headers(resp.headers());
            debug!(
                url,
                total_bytes = ?result.total_bytes,
                supports_ranges = result.supports_ranges,
                "探测完成"
            );
            result
        }
        Ok(resp) => {
            warn!(url, status = %resp.status(), "探测返回非成功状态，改用单线程下载");
            ProbeResult::unknown()
        }
        Err(e) => {
            warn!(url, error = %e, "探测失败，改用单线程下载");
            ProbeResult::unknown()
        }
    }
}

/// 从响应头解析探测结果。
///
/// 直接读 `Content-Length` 头：HEAD 响应没有响应体，不能用 `Response::content_length()`。
pub(crate) fn probe_from_headers(headers: &HeaderMap) -> ProbeResult {
    let supports_ranges = headers
        .get_all(ACCEPT_RANGES)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|unit| unit.trim().eq_ignore_ascii_case("bytes"));

    ProbeResult {
        total_bytes: content_length(headers),
        supports_ranges,
    }
}

/// 解析 `Content-Length` 头，缺失或非法时返回 `None`。
pub(crate) fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

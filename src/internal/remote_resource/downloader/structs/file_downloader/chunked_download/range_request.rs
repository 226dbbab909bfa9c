//! 分片下载：发起单段 Range 请求，返回响应供流式读取。

use reqwest::header::RANGE;
use reqwest::{Response, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{ChunkSpec, DownloadError};

use super::super::cancellation::cancellable;
use super::super::transfer::ensure_success;

/// 发起 Range 请求时的参数（形参超过 3 个时用 struct 承载）。
pub(crate) struct FetchRangeParams<'a> {
    pub client: &'a DownloadClient,
    pub url: &'a str,
    pub chunk: &'a ChunkSpec,
    pub cancel: &'a CancellationToken,
}

/// 发起单段 Range GET 请求。服务器必须以 `206 Partial Content` 响应，
/// 返回 200 说明 Range 被忽略，整文件写进分片会导致结果错误，按失败处理。
pub(crate) async fn fetch_range_response(
    params: FetchRangeParams<'_>,
) -> Result<Response, DownloadError> {
    let resp = cancellable(params.cancel, async {
        params
            .client
            .client
            .get(params.url)
            .header(RANGE, params.chunk.range_header())
            .send()
            .await
            .map_err(DownloadError::Request)
    })
    .await?;

    ensure_success(&resp)?;
    if resp.status() != StatusCode::PARTIAL_CONTENT {
        return Err(DownloadError::RangeNotHonored {
            index: params.chunk.index,
            status: resp.status(),
        });
    }
    Ok(resp)
}

//! 单线程整文件下载：直接写入目标路径，没有中间分片文件。
//!
//! 用于小文件、不支持 Range 的服务器，以及探测失败后的兜底路径。

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{
    DownloadError, DownloadHooksContainer, ProgressSnapshot,
};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::cancellation::cancellable;
use super::probe::content_length;
use super::progress_aggregator::{ChunkState, ProgressAggregator, ProgressAggregatorParams};
use super::transfer::{StreamToFileParams, ensure_success, stream_to_file};

/// 单线程下载的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct RunSingleDownloadParams<'a> {
    pub client: &'a DownloadClient,
    pub url: &'a str,
    pub save_path: &'a Path,
    pub file_name: String,
    /// 探测得到的大小；只在 GET 响应没有 `Content-Length` 时使用
    pub known_total: Option<u64>,
    pub buffer_size: usize,
    pub started_at: Instant,
    pub cancel: &'a CancellationToken,
    pub hooks: Arc<Mutex<DownloadHooksContainer>>,
    pub progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
}

/// 单线程下载：整文件 GET，流式写入目标文件并上报进度。失败或取消时删除写了一半的目标文件。
///
/// 总大小以 GET 响应为准；写入字节数与已知总大小不一致时按失败处理。
pub(crate) async fn run_single_download(
    params: RunSingleDownloadParams<'_>,
) -> Result<(), DownloadError> {
    let save_path = params.save_path;
    let result = single_download_inner(params).await;

    if result.is_err() {
        // 失败时不能留下看起来完整的目标文件
        if let Err(e) = tokio::fs::remove_file(save_path).await {
            debug!(path = %save_path.display(), error = %e, "清理目标文件失败，已忽略");
        }
    }
    result
}

async fn single_download_inner(
    params: RunSingleDownloadParams<'_>,
) -> Result<(), DownloadError> {
    let resp = cancellable(params.cancel, async {
        params
            .client
            .client
            .get(params.url)
            .send()
            .await
            .map_err(DownloadError::Request)
    })
    .await?;
    ensure_success(&resp)?;

    let total = content_length(resp.headers()).or(params.known_total);
    let state = Arc::new(ChunkState::new());
    let aggregator = ProgressAggregator::new(ProgressAggregatorParams {
        file_name: params.file_name,
        total,
        started_at: params.started_at,
        chunks: vec![Arc::clone(&state)],
        hooks: params.hooks,
        progress: params.progress,
    });

    let written = stream_to_file(StreamToFileParams {
        response: resp,
        path: params.save_path,
        buffer_size: params.buffer_size,
        state: &state,
        aggregator: &aggregator,
        cancel: params.cancel,
    })
    .await?;

    if let Some(expected) = total {
        if written != expected {
            return Err(DownloadError::LengthMismatch {
                expected,
                actual: written,
            });
        }
    }
    state.mark_completed();

    debug!(url = params.url, bytes = written, "单线程下载完成");

    // 最终快照：空文件没有传输单元，也要让调用方看到 100%
    aggregator.report().await;
    Ok(())
}

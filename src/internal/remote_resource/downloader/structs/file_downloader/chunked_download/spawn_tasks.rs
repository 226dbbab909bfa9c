//! 分片下载：为每个分片 spawn 一个任务，以及等待全部任务结束（AND 汇合）。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{ChunkSpec, DownloadError};

use super::super::progress_aggregator::{ChunkState, ProgressAggregator};
use super::download_one_range::{DownloadOneRangeParams, download_one_range};

/// 单个分片任务句柄：(分片序号, JoinHandle)。
pub(crate) type RangeTaskHandle = (usize, JoinHandle<Result<(), DownloadError>>);

/// spawn 分片任务时的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct SpawnRangeTasksParams<'a> {
    pub client: &'a DownloadClient,
    pub url: &'a str,
    pub chunks: &'a [ChunkSpec],
    pub part_paths: &'a [PathBuf],
    pub states: &'a [Arc<ChunkState>],
    pub buffer_size: usize,
    pub aggregator: &'a Arc<ProgressAggregator>,
    /// 分片专用令牌：会话取消会传递到这里，任一分片失败也会触发它
    pub chunk_cancel: &'a CancellationToken,
}

/// 同时启动所有分片任务。任一分片出现非取消错误时立即取消其余分片。
pub(crate) fn spawn_range_tasks(params: SpawnRangeTasksParams<'_>) -> Vec<RangeTaskHandle> {
    params
        .chunks
        .iter()
        .zip(params.part_paths)
        .zip(params.states)
        .map(|((chunk, part_path), state)| {
            let download_params = DownloadOneRangeParams {
                client: params.client.clone(),
                url: params.url.to_string(),
                chunk: *chunk,
                part_path: part_path.clone(),
                buffer_size: params.buffer_size,
                state: Arc::clone(state),
                aggregator: Arc::clone(params.aggregator),
                cancel: params.chunk_cancel.clone(),
            };
            let fail_fast = params.chunk_cancel.clone();

            let handle = tokio::spawn(async move {
                let result = download_one_range(download_params).await;
                if let Err(e) = &result {
                    if !e.is_cancelled() {
                        fail_fast.cancel();
                    }
                }
                result
            });
            (chunk.index, handle)
        })
        .collect()
}

/// 等待全部分片任务结束，不提前返回，保证汇合后没有任务还在写临时文件。
///
/// 返回第一个真实错误；只有取消错误时返回 [`DownloadError::Cancelled`]。
pub(crate) async fn join_range_handles(
    handles: Vec<RangeTaskHandle>,
    chunk_cancel: &CancellationToken,
) -> Result<(), DownloadError> {
    let mut first_error: Option<DownloadError> = None;

    for (index, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                chunk_cancel.cancel();
                Err(DownloadError::TaskJoin(join_err))
            }
        };

        if let Err(e) = result {
            debug!(index, error = %e, "分片以错误结束");
            let replace = match &first_error {
                None => true,
                Some(prev) => prev.is_cancelled() && !e.is_cancelled(),
            };
            if replace {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

//! 分片下载：并发 Range 请求写入各自的临时文件，全部成功后按序合并。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{
    DownloadError, DownloadHooksContainer, DownloadPlan, ProgressSnapshot,
};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::super::progress_aggregator::{ChunkState, ProgressAggregator, ProgressAggregatorParams};
use super::assemble::assemble_parts;
use super::constants::{part_path, remove_part_files};
use super::spawn_tasks::{SpawnRangeTasksParams, join_range_handles, spawn_range_tasks};

/// 分片下载的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct RunChunkedDownloadParams<'a> {
    pub client: &'a DownloadClient,
    pub url: &'a str,
    pub save_path: &'a Path,
    pub file_name: String,
    pub plan: &'a DownloadPlan,
    pub buffer_size: usize,
    pub started_at: Instant,
    pub cancel: &'a CancellationToken,
    pub hooks: Arc<Mutex<DownloadHooksContainer>>,
    pub progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
}

/// 分片下载入口：计划里至少两片且总大小已知。
///
/// 失败或取消时尽力删除全部临时文件；合并失败时连同写了一半的目标文件一起删除。
pub(crate) async fn run_chunked_download(
    params: RunChunkedDownloadParams<'_>,
) -> Result<(), DownloadError> {
    let chunks = &params.plan.chunks;
    let save_path = params.save_path;

    let states: Vec<Arc<ChunkState>> = chunks.iter().map(|_| Arc::new(ChunkState::new())).collect();
    let part_paths: Vec<PathBuf> = chunks.iter().map(|c| part_path(save_path, c.index)).collect();

    let aggregator = Arc::new(ProgressAggregator::new(ProgressAggregatorParams {
        file_name: params.file_name,
        total: params.plan.total_bytes,
        started_at: params.started_at,
        chunks: states.clone(),
        hooks: params.hooks,
        progress: params.progress,
    }));

    let chunk_cancel = params.cancel.child_token();
    let handles = spawn_range_tasks(SpawnRangeTasksParams {
        client: params.client,
        url: params.url,
        chunks,
        part_paths: &part_paths,
        states: &states,
        buffer_size: params.buffer_size,
        aggregator: &aggregator,
        chunk_cancel: &chunk_cancel,
    });

    if let Err(e) = join_range_handles(handles, &chunk_cancel).await {
        remove_part_files(save_path, part_paths.len()).await;
        return Err(e);
    }
    debug_assert!(aggregator.all_completed());

    match assemble_parts(&part_paths, save_path, params.cancel).await {
        Ok(bytes) => {
            debug!(path = %save_path.display(), bytes, parts = part_paths.len(), "分片合并完成");
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(save_path).await {
                debug!(path = %save_path.display(), error = %rm, "清理目标文件失败，已忽略");
            }
            remove_part_files(save_path, part_paths.len()).await;
            return Err(e);
        }
    }

    remove_part_files(save_path, part_paths.len()).await;
    aggregator.report().await;
    Ok(())
}

//! 分片下载：把一个字节区间下载到它自己的临时文件。

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{ChunkSpec, DownloadError};

use super::super::progress_aggregator::{ChunkState, ProgressAggregator};
use super::super::transfer::{StreamToFileParams, stream_to_file};
use super::range_request::{FetchRangeParams, fetch_range_response};

/// 执行单段 Range 下载时的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct DownloadOneRangeParams {
    pub client: DownloadClient,
    pub url: String,
    pub chunk: ChunkSpec,
    pub part_path: PathBuf,
    pub buffer_size: usize,
    pub state: Arc<ChunkState>,
    pub aggregator: Arc<ProgressAggregator>,
    pub cancel: CancellationToken,
}

/// 执行单段 Range 下载：流式写入 `part_path`，写满 `chunk.len()` 字节才算成功。
///
/// 只写自己的临时文件，不碰其他分片的文件；出错直接返回，不重试、不续传。
pub(crate) async fn download_one_range(
    params: DownloadOneRangeParams,
) -> Result<(), DownloadError> {
    let chunk = params.chunk;
    debug!(index = chunk.index, range = %chunk.range_header(), "开始下载分片");

    let resp = fetch_range_response(FetchRangeParams {
        client: &params.client,
        url: &params.url,
        chunk: &chunk,
        cancel: &params.cancel,
    })
    .await?;

    let written = stream_to_file(StreamToFileParams {
        response: resp,
        path: &params.part_path,
        buffer_size: params.buffer_size,
        state: &params.state,
        aggregator: &params.aggregator,
        cancel: &params.cancel,
    })
    .await?;

    if written != chunk.len() {
        return Err(DownloadError::ChunkLengthMismatch {
            index: chunk.index,
            expected: chunk.len(),
            actual: written,
        });
    }

    params.state.mark_completed();
    debug!(index = chunk.index, bytes = written, "分片下载完成");
    Ok(())
}

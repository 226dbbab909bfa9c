//! 流式写盘：按固定大小的传输单元把响应体写入文件，每个单元累加计数并上报进度。
//!
//! 分片下载与单线程下载共用这套读写逻辑。

use std::io;
use std::path::Path;

use futures_util::TryStreamExt;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use crate::internal::remote_resource::downloader::structs::DownloadError;

use super::cancellation::cancellable;
use super::progress_aggregator::{ChunkState, ProgressAggregator};

/// 非 2xx 状态转换为错误。
pub(crate) fn ensure_success(resp: &Response) -> Result<(), DownloadError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DownloadError::Status {
            status,
            url: resp.url().to_string(),
        })
    }
}

/// 流式写盘时的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct StreamToFileParams<'a> {
    pub response: Response,
    pub path: &'a Path,
    pub buffer_size: usize,
    pub state: &'a ChunkState,
    pub aggregator: &'a ProgressAggregator,
    pub cancel: &'a CancellationToken,
}

/// 以创建/覆盖方式打开 `path`，写入整个响应体，返回写入的字节数。
///
/// 第一个网络或磁盘错误直接返回，不重试；每次读和写都会检查取消令牌。
pub(crate) async fn stream_to_file(
    params: StreamToFileParams<'_>,
) -> Result<u64, DownloadError> {
    let cancel = params.cancel;

    let mut file = cancellable(cancel, async {
        File::create(params.path)
            .await
            .map_err(DownloadError::CreateFile)
    })
    .await?;

    let stream = params.response.bytes_stream().map_err(io::Error::other);
    let mut reader = StreamReader::new(Box::pin(stream));
    let mut buf = vec![0u8; params.buffer_size.max(1)];
    let mut written: u64 = 0;

    loop {
        let n = cancellable(cancel, async {
            reader.read(&mut buf).await.map_err(DownloadError::ReadBody)
        })
        .await?;
        if n == 0 {
            break;
        }

        cancellable(cancel, async {
            file.write_all(&buf[..n])
                .await
                .map_err(DownloadError::WriteFile)
        })
        .await?;

        written += n as u64;
        params.state.add(n as u64);
        params.aggregator.report().await;
    }

    cancellable(cancel, async {
        file.flush().await.map_err(DownloadError::WriteFile)
    })
    .await?;

    Ok(written)
}

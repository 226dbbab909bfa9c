//! 文件合并：按分片序号把临时文件依次追加到目标文件。

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::internal::remote_resource::downloader::structs::DownloadError;

use super::super::cancellation::cancellable;

/// 按 `parts` 的顺序把分片临时文件拼接成 `save_path`（创建/覆盖），返回写入的总字节数。
///
/// 只在所有分片都成功后调用。本函数不删除临时文件，也不处理失败后的清理。
pub async fn assemble_parts(
    parts: &[PathBuf],
    save_path: &Path,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError> {
    let mut out = cancellable(cancel, async {
        File::create(save_path)
            .await
            .map_err(DownloadError::CreateFile)
    })
    .await?;

    let mut total: u64 = 0;
    for part in parts {
        let mut input = cancellable(cancel, async {
            File::open(part).await.map_err(DownloadError::ReadPart)
        })
        .await?;

        total += cancellable(cancel, async {
            tokio::io::copy(&mut input, &mut out)
                .await
                .map_err(DownloadError::Assemble)
        })
        .await?;
    }

    cancellable(cancel, async {
        out.flush().await.map_err(DownloadError::Assemble)
    })
    .await?;

    Ok(total)
}

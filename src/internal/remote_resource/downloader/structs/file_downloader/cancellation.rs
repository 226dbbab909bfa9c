//! 取消协调：整个会话共用一个 [`CancellationToken`]，每个可能挂起的调用（网络读、磁盘写）都挂在它上面。

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::internal::remote_resource::downloader::structs::DownloadError;

/// 在取消令牌下执行一个可能挂起的操作；令牌先触发则返回 [`DownloadError::Cancelled`]。
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, DownloadError>
where
    F: Future<Output = Result<T, DownloadError>>,
{
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(DownloadError::Cancelled),
        result = fut => result,
    }
}

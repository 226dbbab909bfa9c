use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::download_error::DownloadError;
use super::download_outcome::DownloadOutcome;
use super::download_status::DownloadStatus;
use super::progress_snapshot::ProgressSnapshot;

/// 已启动的下载会话句柄。
///
/// 取消、查询状态无需加锁：取消走共享令牌，状态与进度走响应式属性。
#[derive(Debug)]
pub struct DownloadHandle {
    cancel: CancellationToken,
    status: UnlockReactiveProperty<DownloadStatus>,
    progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
    task: JoinHandle<DownloadOutcome>,
}

impl DownloadHandle {
    pub(crate) fn new(
        cancel: CancellationToken,
        status: UnlockReactiveProperty<DownloadStatus>,
        progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
        task: JoinHandle<DownloadOutcome>,
    ) -> Self {
        Self {
            cancel,
            status,
            progress,
            task,
        }
    }

    /// 取消下载。任何时刻都可以调用，重复调用无副作用。
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 当前会话状态。
    pub fn status(&self) -> DownloadStatus {
        self.status.get_or_default()
    }

    /// 会话状态的响应式属性，可 `.watch()` 监听。
    pub fn status_property(&self) -> UnlockReactiveProperty<DownloadStatus> {
        self.status.clone()
    }

    /// 最近一次进度快照的响应式属性。
    pub fn progress(&self) -> UnlockReactiveProperty<Option<ProgressSnapshot>> {
        self.progress.clone()
    }

    /// 等待会话结束并取回结果。下载任务异常退出时同样得到失败结果。
    pub async fn wait(self) -> DownloadOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => DownloadOutcome::failed(DownloadError::TaskJoin(e).to_string()),
        }
    }
}

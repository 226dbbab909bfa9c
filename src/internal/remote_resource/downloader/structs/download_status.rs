/// 下载状态（由下载器内部维护，外部只读监听）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Pending,
    Running,
    Finished,
    Failed,
    Canceled,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadStatus::Finished | DownloadStatus::Failed | DownloadStatus::Canceled
        )
    }
}

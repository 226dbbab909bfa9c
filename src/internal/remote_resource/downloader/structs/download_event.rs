use super::download_outcome::DownloadOutcome;
use super::progress_snapshot::ProgressSnapshot;

/// 通道模式下的下载事件：若干 `Progress`，最后恰好一个 `Completed`。
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(ProgressSnapshot),
    Completed(DownloadOutcome),
}

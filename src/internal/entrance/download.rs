use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::structs::{
    DownloadError, DownloadHandle, DownloadOutcome, DownloaderConfig, FileDownloader,
    ProgressSnapshot,
};
use crate::internal::remote_resource::structs::download_request::DownloadRequest;

/// 本库主入口：用默认配置启动一次下载会话。
///
/// - `on_progress`：每个传输单元后调用，调用之间不会重叠；
/// - `on_complete`：会话结束时恰好调用一次；
/// - 返回的句柄可随时 `cancel()`。
///
/// 必须在 tokio 运行时内调用。只有创建 HTTP 客户端失败时才返回 `Err`，
/// 其余错误都通过 `on_complete` 的结果送出。
///
/// example:
/// ```rust,no_run
/// use range_fetch::{start_download, download::DownloadRequest};
///
/// # async fn run() -> Result<(), range_fetch::download::DownloadError> {
/// let request = DownloadRequest::resolve("https://example.com/file.zip", Some("~/Downloads/"))?;
/// let handle = start_download(
///     request,
///     |p| println!("{} {:?}% {}", p.file_name, p.percent, p.formatted_speed),
///     |outcome| println!("完成: {:?}", outcome),
/// )?;
/// let _ = handle.wait().await;
/// # Ok(())
/// # }
/// ```
pub fn start_download<P, C>(
    request: DownloadRequest,
    on_progress: P,
    on_complete: C,
) -> Result<DownloadHandle, DownloadError>
where
    P: FnMut(&ProgressSnapshot) + Send + Sync + 'static,
    C: FnMut(DownloadOutcome) + Send + Sync + 'static,
{
    start_download_with_config(request, DownloaderConfig::default(), on_progress, on_complete)
}

/// 同 [`start_download`]，使用自定义配置。
pub fn start_download_with_config<P, C>(
    request: DownloadRequest,
    config: DownloaderConfig,
    on_progress: P,
    on_complete: C,
) -> Result<DownloadHandle, DownloadError>
where
    P: FnMut(&ProgressSnapshot) + Send + Sync + 'static,
    C: FnMut(DownloadOutcome) + Send + Sync + 'static,
{
    let client = DownloadClient::new(&config)?;
    Ok(FileDownloader::new(client, request)
        .with_config(config)
        .with_on_progress_hook(on_progress)
        .with_on_complete_hook(on_complete)
        .start())
}

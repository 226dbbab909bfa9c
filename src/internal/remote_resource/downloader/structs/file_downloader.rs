//! 文件下载器
//!
//! 从一个 URL 下载单个资源到本地，服务器支持 Range 且文件足够大时拆成多个分片并发下载。
//!
//! ## 流程
//!
//! 1. 探测（HEAD）：拿到大小与 Range 支持；失败不致命，直接走单线程
//! 2. 规划：支持 Range 且大小 ≥ 1MB 时按请求的分片数切分，否则一片
//! 3. 传输：每个分片一个任务写 `<目标>.part<序号>`；单线程则直接写目标文件
//! 4. 进度：每个 8KB 传输单元聚合一次，串行回调 `on_progress`
//! 5. 汇合：所有分片成功后按序合并，删除临时文件
//! 6. 结束：`on_complete` 恰好调用一次
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! # use range_fetch::client::DownloadClient;
//! # use range_fetch::download::{DownloadRequest, DownloaderConfig, FileDownloader};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DownloadClient::new(&DownloaderConfig::default())?;
//! let request = DownloadRequest::new("https://example.com/big.iso", "big.iso").with_threads(8);
//!
//! let handle = FileDownloader::new(client, request)
//!     .with_on_progress_hook(|p| println!("{:?}% {}", p.percent, p.formatted_speed))
//!     .start();
//!
//! // 任意时刻都可以取消
//! // handle.cancel();
//! let outcome = handle.wait().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## 内部实现说明
//!
//! - `probe`：能力探测
//! - `chunked_download`：分片规划后的并发下载与合并
//! - `single_download`：单线程流式下载
//! - `progress_aggregator`：分片计数器与进度聚合
//! - `cancellation`：取消令牌包装

mod cancellation;
mod chunked_download;
mod probe;
mod progress_aggregator;
mod single_download;
mod transfer;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::internal::client::structs::download_client::DownloadClient;
use crate::internal::remote_resource::downloader::traits::download::{DownloadHook, HookAbort};
use crate::internal::remote_resource::structs::download_request::DownloadRequest;
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::chunk_plan::DownloadPlan;
use super::download_config::DownloaderConfig;
use super::download_error::DownloadError;
use super::download_event::DownloadEvent;
use super::download_handle::DownloadHandle;
use super::download_hooks_container::DownloadHooksContainer;
use super::download_outcome::DownloadOutcome;
use super::download_status::DownloadStatus;
use super::hook_adapters::{
    BeforeStartHookAdapter, ChannelHookAdapter, OnCompleteHookAdapter, OnProgressHookAdapter,
};
use super::progress_snapshot::ProgressSnapshot;
use chunked_download::{RunChunkedDownloadParams, run_chunked_download};
use single_download::{RunSingleDownloadParams, run_single_download};

pub use chunked_download::{assemble_parts, part_path, remove_part_files};
pub use probe::probe;

/// 文件下载器：链式配置后调用 [`FileDownloader::send`] 或 [`FileDownloader::start`]。
///
/// 拥有两个响应式属性：`progress()`（最近一次进度快照）与 `status()`（会话状态）。
pub struct FileDownloader {
    pub(crate) client: DownloadClient,
    pub(crate) request: DownloadRequest,
    pub(crate) config: DownloaderConfig,
    pub(crate) hooks: DownloadHooksContainer,
    pub(crate) cancel: CancellationToken,
    pub(crate) progress_state: UnlockReactiveProperty<Option<ProgressSnapshot>>,
    pub(crate) status_state: UnlockReactiveProperty<DownloadStatus>,
}

impl FileDownloader {
    pub fn new(client: DownloadClient, request: DownloadRequest) -> Self {
        Self {
            client,
            request,
            config: DownloaderConfig::default(),
            hooks: Default::default(),
            cancel: CancellationToken::new(),
            progress_state: UnlockReactiveProperty::new(None),
            status_state: UnlockReactiveProperty::new(DownloadStatus::Pending),
        }
    }

    /// 替换下载配置。
    pub fn with_config(mut self, config: DownloaderConfig) -> Self {
        self.config = config;
        self
    }

    /// 使用外部的取消令牌，便于与调用方自己的生命周期绑定。
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 注册「开始前」钩子；闭包返回 `Err(HookAbort)` 会中止本次下载。
    pub fn with_before_start_hook<F, Fut>(mut self, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), HookAbort>> + Send + 'static,
    {
        self.hooks.add(BeforeStartHookAdapter(f));
        self
    }

    /// 注册「进度」钩子。回调是串行的，但可能来自任意分片任务。
    pub fn with_on_progress_hook<F>(mut self, f: F) -> Self
    where
        F: FnMut(&ProgressSnapshot) + Send + Sync + 'static,
    {
        self.hooks.add(OnProgressHookAdapter(f));
        self
    }

    /// 注册「完成」钩子；每个会话恰好调用一次。
    pub fn with_on_complete_hook<F>(mut self, f: F) -> Self
    where
        F: FnMut(DownloadOutcome) + Send + Sync + 'static,
    {
        self.hooks.add(OnCompleteHookAdapter(f));
        self
    }

    /// 添加完整钩子。
    pub fn with_hook(mut self, hook: impl DownloadHook + 'static) -> Self {
        self.hooks.add(hook);
        self
    }

    /// 本会话的取消令牌；`cancel()` 可在任意时刻调用，重复调用无副作用。
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 最近一次进度快照；返回可共享句柄，`.watch()` 后 `changed().await` 监听。
    pub fn progress(&self) -> UnlockReactiveProperty<Option<ProgressSnapshot>> {
        self.progress_state.clone()
    }

    /// 会话状态。
    pub fn status(&self) -> UnlockReactiveProperty<DownloadStatus> {
        self.status_state.clone()
    }

    /// 在 tokio 运行时上启动下载，立即返回句柄。
    pub fn start(self) -> DownloadHandle {
        let cancel = self.cancel.clone();
        let status = self.status_state.clone();
        let progress = self.progress_state.clone();
        let task = tokio::spawn(self.send());
        DownloadHandle::new(cancel, status, progress, task)
    }

    /// 通道模式：进度与结果通过容量为 `capacity` 的有界通道送出，最后一条一定是 `Completed`。
    pub fn start_with_channel(
        mut self,
        capacity: usize,
    ) -> (DownloadHandle, mpsc::Receiver<DownloadEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.hooks.add(ChannelHookAdapter(tx));
        (self.start(), rx)
    }

    /// 在当前任务中执行下载，返回本会话唯一的结果。
    pub async fn send(self) -> DownloadOutcome {
        let FileDownloader {
            client,
            request,
            config,
            hooks,
            cancel,
            progress_state,
            status_state,
        } = self;

        status_state.update(DownloadStatus::Running);
        info!(
            url = %request.url,
            path = %request.save_path.display(),
            threads = request.threads,
            "开始下载"
        );

        let hooks = Arc::new(Mutex::new(hooks));
        let result = run_session(SessionParams {
            client: &client,
            request: &request,
            config: &config,
            cancel: &cancel,
            hooks: Arc::clone(&hooks),
            progress: progress_state,
        })
        .await;

        let outcome = match result {
            Ok(()) => {
                status_state.update(DownloadStatus::Finished);
                info!(url = %request.url, path = %request.save_path.display(), "下载完成");
                DownloadOutcome::succeeded()
            }
            Err(e) => {
                if e.is_cancelled() && cancel.is_cancelled() {
                    status_state.update(DownloadStatus::Canceled);
                    info!(url = %request.url, "下载已取消");
                } else {
                    status_state.update(DownloadStatus::Failed);
                    error!(url = %request.url, error = %e, "下载失败");
                }
                DownloadOutcome::failed(e.to_string())
            }
        };

        hooks.lock().await.run_on_complete(&outcome).await;
        outcome
    }
}

/// 一次会话的参数（形参超过 3 个，用 struct 承载）。
struct SessionParams<'a> {
    client: &'a DownloadClient,
    request: &'a DownloadRequest,
    config: &'a DownloaderConfig,
    cancel: &'a CancellationToken,
    hooks: Arc<Mutex<DownloadHooksContainer>>,
    progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
}

/// 探测 → 规划 → 分片或单线程传输。错误原样返回，由 `send` 转换为结果。
async fn run_session(params: SessionParams<'_>) -> Result<(), DownloadError> {
    let request = params.request;
    let started_at = Instant::now();

    params.hooks.lock().await.run_before_start().await?;
    ensure_parent_dir(&request.save_path).await?;

    let probe_result = probe(params.client, &request.url, params.cancel).await;
    if params.cancel.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }

    let plan = DownloadPlan::decide(&probe_result, request.threads, params.config.min_chunked_size);
    info!(
        url = %request.url,
        total_bytes = ?plan.total_bytes,
        supports_ranges = plan.supports_ranges,
        chunks = plan.chunks.len(),
        chunked = plan.is_chunked(),
        "下载计划已确定"
    );

    let buffer_size = params.config.effective_buffer_size();
    if plan.is_chunked() {
        run_chunked_download(RunChunkedDownloadParams {
            client: params.client,
            url: &request.url,
            save_path: &request.save_path,
            file_name: request.file_name(),
            plan: &plan,
            buffer_size,
            started_at,
            cancel: params.cancel,
            hooks: params.hooks,
            progress: params.progress,
        })
        .await
    } else {
        run_single_download(RunSingleDownloadParams {
            client: params.client,
            url: &request.url,
            save_path: &request.save_path,
            file_name: request.file_name(),
            known_total: plan.total_bytes,
            buffer_size,
            started_at,
            cancel: params.cancel,
            hooks: params.hooks,
            progress: params.progress,
        })
        .await
    }
}

/// 目标文件所在目录不存在时创建。
async fn ensure_parent_dir(save_path: &Path) -> Result<(), DownloadError> {
    match save_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(DownloadError::CreateDir)?;
            debug!(dir = %dir.display(), "目标目录已就绪");
            Ok(())
        }
        _ => Ok(()),
    }
}

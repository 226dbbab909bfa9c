//! 单阶段钩子适配器：将闭包包装成 [`DownloadHook`]，供 `with_xx_hook` 使用。

use std::future::Future;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::internal::remote_resource::downloader::traits::download::{DownloadHook, HookAbort};

use super::download_event::DownloadEvent;
use super::download_outcome::DownloadOutcome;
use super::progress_snapshot::ProgressSnapshot;

/// 仅实现「开始前」的钩子适配器。
pub(crate) struct BeforeStartHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F, Fut> DownloadHook for BeforeStartHookAdapter<F>
where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HookAbort>> + Send + 'static,
{
    async fn before_start(&mut self) -> Result<(), HookAbort> {
        (self.0)().await
    }
}

/// 仅实现「进度」的钩子适配器。
pub(crate) struct OnProgressHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F> DownloadHook for OnProgressHookAdapter<F>
where
    F: FnMut(&ProgressSnapshot) + Send + Sync + 'static,
{
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        (self.0)(snapshot);
    }
}

/// 仅实现「完成」的钩子适配器；结果按值交给闭包。
pub(crate) struct OnCompleteHookAdapter<F>(pub(crate) F);

#[async_trait]
impl<F> DownloadHook for OnCompleteHookAdapter<F>
where
    F: FnMut(DownloadOutcome) + Send + Sync + 'static,
{
    async fn on_complete(&mut self, outcome: &DownloadOutcome) {
        (self.0)(outcome.clone());
    }
}

/// 把进度与结果转发到有界通道。
///
/// 进度事件用 `try_send`，通道满时丢弃这一帧；结果事件用 `send().await`，保证送达。
pub(crate) struct ChannelHookAdapter(pub(crate) mpsc::Sender<DownloadEvent>);

#[async_trait]
impl DownloadHook for ChannelHookAdapter {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let _ = self.0.try_send(DownloadEvent::Progress(snapshot.clone()));
    }

    async fn on_complete(&mut self, outcome: &DownloadOutcome) {
        let _ = self.0.send(DownloadEvent::Completed(outcome.clone())).await;
    }
}

use crate::internal::remote_resource::downloader::traits::download::{DownloadHook, HookAbort};

use super::download_outcome::DownloadOutcome;
use super::progress_snapshot::ProgressSnapshot;

/// 钩子容器：按注册顺序依次执行多个钩子。
///
/// 分片下载时容器放在 `Arc<Mutex<_>>` 里，锁就是进度回调的串行化临界区。
#[derive(Default)]
pub struct DownloadHooksContainer {
    hooks: Vec<Box<dyn DownloadHook>>,
}

impl DownloadHooksContainer {
    /// 添加一个下载钩子；支持多次调用以注册多个钩子。
    pub fn add(&mut self, hook: impl DownloadHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn run_before_start(&mut self) -> Result<(), HookAbort> {
        for h in self.hooks.iter_mut() {
            h.before_start().await?;
        }
        Ok(())
    }

    pub fn run_on_progress(&mut self, snapshot: &ProgressSnapshot) {
        for h in self.hooks.iter_mut() {
            h.on_progress(snapshot);
        }
    }

    pub async fn run_on_complete(&mut self, outcome: &DownloadOutcome) {
        for h in self.hooks.iter_mut() {
            h.on_complete(outcome).await;
        }
    }
}

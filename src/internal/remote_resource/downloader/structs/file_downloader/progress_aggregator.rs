//! 进度聚合：汇总所有分片计数器，计算快照并串行地交给钩子与响应式属性。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::Mutex;

use crate::internal::remote_resource::downloader::structs::{
    DownloadHooksContainer, ProgressSnapshot,
};
use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

/// 单个分片的状态：字节计数器只由所属任务写，聚合器只读。
#[derive(Debug, Default)]
pub(crate) struct ChunkState {
    bytes_done: AtomicU64,
    completed: AtomicBool,
}

impl ChunkState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 累加本分片已写入的字节，返回累加后的值。
    pub(crate) fn add(&self, len: u64) -> u64 {
        self.bytes_done.fetch_add(len, Ordering::AcqRel) + len
    }

    pub(crate) fn bytes_done(&self) -> u64 {
        self.bytes_done.load(Ordering::Acquire)
    }

    pub(crate) fn mark_completed(&self) {
        self.completed.store(true, Ordering::Release);
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}

/// 构建聚合器的参数（形参超过 3 个，用 struct 承载）。
pub(crate) struct ProgressAggregatorParams {
    pub file_name: String,
    pub total: Option<u64>,
    pub started_at: Instant,
    pub chunks: Vec<Arc<ChunkState>>,
    pub hooks: Arc<Mutex<DownloadHooksContainer>>,
    pub progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
}

/// 进度聚合器，可以在任意分片任务里调用 [`ProgressAggregator::report`]。
///
/// 计数器的读取不加锁；快照的计算与发出在钩子容器的锁内完成，
/// 所以回调不会并发执行，且最后一次发出的快照一定包含所有已完成的累加。
pub(crate) struct ProgressAggregator {
    file_name: String,
    total: Option<u64>,
    started_at: Instant,
    chunks: Vec<Arc<ChunkState>>,
    hooks: Arc<Mutex<DownloadHooksContainer>>,
    progress: UnlockReactiveProperty<Option<ProgressSnapshot>>,
}

impl ProgressAggregator {
    pub(crate) fn new(params: ProgressAggregatorParams) -> Self {
        Self {
            file_name: params.file_name,
            total: params.total,
            started_at: params.started_at,
            chunks: params.chunks,
            hooks: params.hooks,
            progress: params.progress,
        }
    }

    /// 所有分片已写入字节之和。可能与正在累加的分片存在短暂不一致。
    pub(crate) fn bytes_received(&self) -> u64 {
        self.chunks.iter().map(|c| c.bytes_done()).sum()
    }

    pub(crate) fn all_completed(&self) -> bool {
        self.chunks.iter().all(|c| c.is_completed())
    }

    /// 计算一次快照并通知钩子与响应式属性。
    pub(crate) async fn report(&self) -> ProgressSnapshot {
        let mut hooks = self.hooks.lock().await;
        let snapshot = ProgressSnapshot::compute(
            &self.file_name,
            self.bytes_received(),
            self.total,
            self.started_at.elapsed(),
        );
        hooks.run_on_progress(&snapshot);
        self.progress.update(Some(snapshot.clone()));
        snapshot
    }
}

//! 下载相关 trait：观察者钩子接口，供下载会话在各阶段回调。
//!
//! 对外使用入口为 [`crate::download`]。

use async_trait::async_trait;

use crate::internal::remote_resource::downloader::structs::{
    DownloadOutcome, ProgressSnapshot,
};

/// 钩子执行时请求中止下载时使用的错误。
#[derive(Debug, Clone)]
pub struct HookAbort;

impl std::fmt::Display for HookAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("下载被钩子中止")
    }
}

impl std::error::Error for HookAbort {}

/// 下载流程钩子：在「开始前 / 进度 / 完成」插入自定义逻辑。
///
/// 使用方式二选一（可混用）：
/// - **单阶段**：用 `with_before_start_hook` / `with_on_progress_hook` / `with_on_complete_hook` 传入闭包；
/// - **完整钩子**：实现本 trait，通过下载器的 `with_hook` 注册。
///
/// 同一会话内的回调是串行的：不会出现两个 `on_progress` 同时执行。
#[async_trait]
pub trait DownloadHook: Send + Sync {
    /// 下载开始前调用。返回 `Err` 则中止本次下载，结果为失败。
    async fn before_start(&mut self) -> Result<(), HookAbort> {
        Ok(())
    }

    /// 每传输完一个单元后调用，参数为聚合后的进度快照。
    ///
    /// 可能在任意分片任务里被调用，实现里不要做阻塞操作。
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}

    /// 会话结束时调用，每个会话恰好一次；成功、失败、取消都会走到这里。
    async fn on_complete(&mut self, _outcome: &DownloadOutcome) {}
}

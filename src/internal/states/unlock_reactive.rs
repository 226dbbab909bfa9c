//! # UnlockReactiveProperty
//!
//! 无锁的响应式属性容器，基于 [`tokio::sync::watch`]，读写都不阻塞，
//! 适合下载进度这类高频更新的状态。
//!
//! ## 使用示例
//! ```rust,no_run
//! use range_fetch::states::unlock_reactive::UnlockReactiveProperty;
//!
//! let prop = UnlockReactiveProperty::new(0u64);
//! prop.update(1).update(2);
//! assert_eq!(prop.get_current(), Some(2));
//! ```

pub use super::reactive_core::{PropertyWatcher, ReactivePropertyError as UnlockReactivePropertyError};

/// 轻量级响应式属性容器。
pub type UnlockReactiveProperty<T> = super::reactive_core::ReactiveProperty<T>;

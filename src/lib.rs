/// 内部导出的模块
mod internal;


/// 导出核心入口函数
pub use internal::entrance::download::*;

pub mod client {
    use crate::internal;
    pub use internal::client::structs::download_client::DownloadClient;
}

/// 下载引擎：请求、计划、下载器、进度与结果
pub mod download {
    use crate::internal;
    // 请求模型
    pub use internal::remote_resource::structs::download_request::*;
    // 下载器：类型与入口（以 lib 为中心，此处统一导出）
    pub use internal::remote_resource::downloader::structs::*;
    pub use internal::remote_resource::downloader::traits::download::{DownloadHook, HookAbort};
}

pub mod states {
    pub mod unlock_reactive {
        use crate::internal;
        pub use internal::states::unlock_reactive::*;
    }
}

pub use tokio_util::sync::CancellationToken;

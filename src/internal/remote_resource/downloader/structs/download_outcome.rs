use serde::{Deserialize, Serialize};

/// 一次下载会话的最终结果，每个会话恰好产生一个。
///
/// 用户取消与真实的传输错误在这里不做区分，都是 `success == false`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub success: bool,
    pub error_message: Option<String>,
}

impl DownloadOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// 能力探测结果：资源大小与是否支持 Range。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeResult {
    /// `Content-Length`，缺失或解析失败时为 `None`
    pub total_bytes: Option<u64>,
    /// 服务器是否在 `Accept-Ranges` 中声明了 `bytes`
    pub supports_ranges: bool,
}

impl ProbeResult {
    /// 探测失败时的结果：大小未知、不支持 Range。
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn size_known(&self) -> bool {
        self.total_bytes.is_some()
    }
}

//! 分片规划：把总大小切成连续、无缝、无重叠的字节区间。

use super::probe_result::ProbeResult;

/// 单个分片的字节区间 `[start, end_inclusive]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub index: usize,
    pub start: u64,
    pub end_inclusive: u64,
}

impl ChunkSpec {
    /// 分片长度（字节）。
    pub fn len(&self) -> u64 {
        self.end_inclusive - self.start + 1
    }

    /// HTTP Range 头的值：`bytes=start-end`，两端都包含。
    pub fn range_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end_inclusive)
    }
}

/// 按请求的分片数切分 `total` 字节。
///
/// 基础分片大小为 `total / threads`（整除），除最后一片外都恰好是这个大小，
/// 最后一片吸收余数。分片数不超过 `threads`，也不超过 `total`（不会出现空分片）。
/// `total == 0` 时返回空列表。
pub fn plan_chunks(total: u64, threads: usize) -> Vec<ChunkSpec> {
    if total == 0 {
        return Vec::new();
    }
    let count = (threads.max(1) as u64).min(total);
    let base = total / count;

    (0..count)
        .map(|i| {
            let start = i * base;
            let end_inclusive = if i == count - 1 {
                total - 1
            } else {
                start + base - 1
            };
            ChunkSpec {
                index: i as usize,
                start,
                end_inclusive,
            }
        })
        .collect()
}

/// 由探测结果得出的下载计划。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    /// 总大小，未知时为 `None`
    pub total_bytes: Option<u64>,
    /// 服务器是否声明支持 Range
    pub supports_ranges: bool,
    /// 有序分片列表；单线程时为覆盖整个文件的一片（大小未知或为 0 时为空）
    pub chunks: Vec<ChunkSpec>,
}

impl DownloadPlan {
    /// 路由规则：支持 Range 且 `total >= min_chunked_size` 才按 `threads` 切分，
    /// 否则只规划一个覆盖整个文件的分片，走单线程路径。
    pub fn decide(probe: &ProbeResult, threads: usize, min_chunked_size: u64) -> Self {
        let total_bytes = probe.total_bytes.filter(|&t| t > 0);

        let chunks = match total_bytes {
            Some(total) if probe.supports_ranges && total >= min_chunked_size => {
                plan_chunks(total, threads)
            }
            Some(total) => plan_chunks(total, 1),
            None => Vec::new(),
        };

        Self {
            total_bytes,
            supports_ranges: probe.supports_ranges,
            chunks,
        }
    }

    /// 是否走分片并发路径（至少两片）。
    pub fn is_chunked(&self) -> bool {
        self.chunks.len() > 1
    }
}

//! 进度快照：聚合所有分片的已下载字节后计算出的不可变值。

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 下载进度快照，每传输完一个单元重新计算并发出一次。
///
/// - `percent`：保留 1 位小数，总大小未知时为 `None`；
/// - `speed_bytes_per_sec`：会话开始以来的平均速度，整个会话共用一个时钟；
/// - `eta`：仅在速度大于 0 且总大小已知时才有值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub file_name: String,
    pub bytes_received: u64,
    pub total_bytes: Option<u64>,
    pub percent: Option<f64>,
    pub speed_bytes_per_sec: f64,
    pub formatted_speed: String,
    pub eta: Option<Duration>,
    pub formatted_eta: Option<String>,
}

impl ProgressSnapshot {
    /// 由已下载字节、总大小与会话已用时间计算快照。
    pub fn compute(
        file_name: &str,
        bytes_received: u64,
        total_bytes: Option<u64>,
        elapsed: Duration,
    ) -> Self {
        let percent = total_bytes.map(|total| percent_of(bytes_received, total));

        let secs = elapsed.as_secs_f64();
        let speed = if secs > 0.0 {
            bytes_received as f64 / secs
        } else {
            0.0
        };

        let eta = match total_bytes {
            Some(total) if speed > 0.0 => {
                let remaining = total.saturating_sub(bytes_received) as f64;
                Some(Duration::from_secs_f64(remaining / speed))
            }
            _ => None,
        };

        Self {
            file_name: file_name.to_string(),
            bytes_received,
            total_bytes,
            percent,
            speed_bytes_per_sec: speed,
            formatted_speed: format_speed(speed),
            formatted_eta: eta.map(format_eta),
            eta,
        }
    }

    /// 是否已收齐全部字节（总大小未知时返回 false）。
    pub fn is_complete(&self) -> bool {
        self.total_bytes == Some(self.bytes_received)
    }
}

/// 百分比，四舍五入到 1 位小数并限制在 [0, 100]；空文件视为 100%。
fn percent_of(bytes_received: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    if bytes_received >= total {
        return 100.0;
    }
    let raw = bytes_received as f64 / total as f64 * 100.0;
    ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// 格式化速度：`512 B/s`、`1.5 KB/s`、`12.0 MB/s`、`1.1 GB/s`。
pub fn format_speed(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let v = bytes_per_sec.max(0.0);
    if v < KB {
        format!("{:.0} B/s", v)
    } else if v < MB {
        format!("{:.1} KB/s", v / KB)
    } else if v < GB {
        format!("{:.1} MB/s", v / MB)
    } else {
        format!("{:.1} GB/s", v / GB)
    }
}

/// 格式化剩余时间：`42s`、`3m 5s`、`2h 10m`。
pub fn format_eta(eta: Duration) -> String {
    let total = eta.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if total < 60 {
        format!("{}s", s)
    } else if total < 3600 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}h {}m", h, m)
    }
}

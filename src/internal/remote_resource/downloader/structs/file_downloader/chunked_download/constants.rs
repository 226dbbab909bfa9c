//! 分片下载的临时文件命名与清理。

use std::path::{Path, PathBuf};

use tracing::debug;

/// 分片临时文件的后缀前缀，完整形式为 `<目标路径>.part<序号>`。
const PART_SUFFIX: &str = ".part";

/// 第 `index` 个分片的临时文件路径：`<save_path>.part<index>`。
pub fn part_path(save_path: &Path, index: usize) -> PathBuf {
    let mut s = save_path.as_os_str().to_os_string();
    s.push(format!("{}{}", PART_SUFFIX, index));
    PathBuf::from(s)
}

/// 尽力删除 `0..count` 的所有分片临时文件；删除失败（包括文件不存在）一律忽略。
pub async fn remove_part_files(save_path: &Path, count: usize) {
    for index in 0..count {
        let path = part_path(save_path, index);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %path.display(), error = %e, "删除分片临时文件失败，已忽略");
            }
        }
    }
}

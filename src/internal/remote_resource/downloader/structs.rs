pub mod chunk_plan;
pub mod download_config;
pub mod download_error;
pub mod download_event;
pub mod download_handle;
pub mod download_hooks_container;
pub mod download_outcome;
pub mod download_status;
pub mod file_downloader;
pub(crate) mod hook_adapters;
pub mod probe_result;
pub mod progress_snapshot;

// 重导出公共类型
pub use chunk_plan::{ChunkSpec, DownloadPlan, plan_chunks};
pub use download_config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_MIN_CHUNKED_SIZE, DEFAULT_THREADS, DEFAULT_USER_AGENT,
    DownloaderConfig,
};
pub use download_error::DownloadError;
pub use download_event::DownloadEvent;
pub use download_handle::DownloadHandle;
pub use download_hooks_container::DownloadHooksContainer;
pub use download_outcome::DownloadOutcome;
pub use download_status::DownloadStatus;
pub use file_downloader::{
    FileDownloader, assemble_parts, part_path, probe, remove_part_files,
};
pub use probe_result::ProbeResult;
pub use progress_snapshot::{ProgressSnapshot, format_eta, format_speed};

mod assemble;
mod chunked;
mod constants;
mod download_one_range;
mod range_request;
mod spawn_tasks;

pub(crate) use chunked::{RunChunkedDownloadParams, run_chunked_download};
pub use assemble::assemble_parts;
pub use constants::{part_path, remove_part_files};

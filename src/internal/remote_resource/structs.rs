pub mod download_request;

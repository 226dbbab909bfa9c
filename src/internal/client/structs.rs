pub mod download_client;

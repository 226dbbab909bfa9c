//! 端到端下载：分片与单线程路径的字节一致性、路由、失败清理。
//!
//! 全部跑在本地 wiremock 服务器上，HEAD 报告大小与 Range 支持，GET 按 `Range` 返回切片。

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::DownloadClient;
use crate::download::{
    DownloadOutcome, DownloadRequest, DownloadStatus, DownloaderConfig, FileDownloader,
    ProgressSnapshot, part_path, plan_chunks,
};
use crate::tests::{
    RangeResponder, mount_resource, part_files_in, payload, ranged_get_count,
    serve_without_content_length, test_client,
};

const MIB: usize = 1024 * 1024;

/// 一次下载的结果、全部进度快照与最终状态。
struct Run {
    outcome: DownloadOutcome,
    snapshots: Vec<ProgressSnapshot>,
    status: DownloadStatus,
}

async fn run_download(client: DownloadClient, url: String, dest: &Path, threads: usize) -> Run {
    let snapshots = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);

    let downloader = FileDownloader::new(client, DownloadRequest::new(url, dest).with_threads(threads))
        .with_on_progress_hook(move |p| sink.lock().unwrap().push(p.clone()));
    let status = downloader.status();
    let outcome = downloader.send().await;

    let snapshots = snapshots.lock().unwrap().clone();
    Run {
        outcome,
        snapshots,
        status: status.get_or_default(),
    }
}

fn assert_progress_converges(snapshots: &[ProgressSnapshot], total: u64) {
    let last = snapshots.last().expect("至少应有一次进度回调");
    assert_eq!(last.bytes_received, total);
    assert_eq!(last.percent, Some(100.0));

    let mut prev = 0;
    for s in snapshots {
        assert!(s.bytes_received >= prev, "已下载字节不应回退");
        prev = s.bytes_received;
        if let Some(p) = s.percent {
            assert!((0.0..=100.0).contains(&p));
        }
        assert!(s.speed_bytes_per_sec >= 0.0);
        if s.speed_bytes_per_sec == 0.0 {
            assert!(s.eta.is_none());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn chunked_download_is_byte_identical() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(2 * MIB + 123, 7));
    mount_resource(&server, "/big.bin", RangeResponder::new(Arc::clone(&body)), true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("big.bin");
    let run = run_download(test_client(), format!("{}/big.bin", server.uri()), &dest, 4).await;

    assert!(run.outcome.is_success(), "{:?}", run.outcome);
    assert_eq!(run.status, DownloadStatus::Finished);
    assert!(run.status.is_terminal());
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), *body);
    assert!(part_files_in(dir.path()).is_empty());
    assert_eq!(ranged_get_count(&server).await, 4);
    assert_progress_converges(&run.snapshots, body.len() as u64);
    assert_eq!(run.snapshots.last().unwrap().file_name, "big.bin");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_and_chunked_produce_same_file() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(3 * MIB / 2, 11));
    mount_resource(&server, "/f.bin", RangeResponder::new(Arc::clone(&body)), true).await;
    let url = format!("{}/f.bin", server.uri());

    let dir = tempfile::tempdir().unwrap();
    let single = dir.path().join("single.bin");
    let chunked = dir.path().join("chunked.bin");

    let a = run_download(test_client(), url.clone(), &single, 1).await;
    let b = run_download(test_client(), url, &chunked, 6).await;
    assert!(a.outcome.is_success() && b.outcome.is_success());

    let a_bytes = tokio::fs::read(&single).await.unwrap();
    let b_bytes = tokio::fs::read(&chunked).await.unwrap();
    assert_eq!(a_bytes, b_bytes);
    assert_eq!(a_bytes, *body);
    assert_eq!(ranged_get_count(&server).await, 6);
}

#[tokio::test]
async fn small_file_downloads_in_one_stream() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(512_000, 3));
    mount_resource(&server, "/small.zip", RangeResponder::new(Arc::clone(&body)), true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("small.zip");
    let run = run_download(test_client(), format!("{}/small.zip", server.uri()), &dest, 8).await;

    assert!(run.outcome.is_success());
    assert_eq!(ranged_get_count(&server).await, 0);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), *body);
    assert!(part_files_in(dir.path()).is_empty());
    assert_progress_converges(&run.snapshots, 512_000);
}

#[tokio::test]
async fn no_range_support_downloads_in_one_stream() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(2 * MIB, 5));
    mount_resource(&server, "/f.bin", RangeResponder::new(Arc::clone(&body)), false).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(run.outcome.is_success());
    assert_eq!(ranged_get_count(&server).await, 0);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), *body);
}

#[tokio::test]
async fn failed_probe_falls_back_to_single_stream() {
    let server = MockServer::start().await;
    let body = payload(300_000, 9);
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("deeper").join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(run.outcome.is_success(), "{:?}", run.outcome);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
    // 总大小来自 GET 响应的 Content-Length
    assert_eq!(run.snapshots.last().unwrap().total_bytes, Some(300_000));
    assert_progress_converges(&run.snapshots, 300_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_chunk_fails_whole_download() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(2 * MIB, 13));
    let third = plan_chunks(body.len() as u64, 4)[2].start as usize;
    let mut responder = RangeResponder::new(Arc::clone(&body));
    responder.fail_from = Some(third);
    mount_resource(&server, "/f.bin", responder, true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(!run.outcome.is_success());
    assert!(run.outcome.error_message.as_deref().is_some_and(|m| m.contains("500")));
    assert_eq!(run.status, DownloadStatus::Failed);
    assert!(!dest.exists());
    assert!(part_files_in(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ignored_range_header_is_an_error() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(2 * MIB, 17));
    let mut responder = RangeResponder::new(Arc::clone(&body));
    responder.ignore_range = true;
    mount_resource(&server, "/f.bin", responder, true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(!run.outcome.is_success());
    assert_eq!(run.status, DownloadStatus::Failed);
    assert!(!dest.exists());
    assert!(part_files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn http_error_on_single_stream_leaves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("missing.bin");
    let run = run_download(test_client(), format!("{}/missing.bin", server.uri()), &dest, 4).await;

    assert!(!run.outcome.is_success());
    assert!(run.outcome.error_message.is_some());
    assert_eq!(run.status, DownloadStatus::Failed);
    assert!(!dest.exists());
}

#[tokio::test]
async fn empty_resource_completes() {
    let server = MockServer::start().await;
    mount_resource(&server, "/empty", RangeResponder::new(Arc::new(Vec::new())), true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("empty");
    let run = run_download(test_client(), format!("{}/empty", server.uri()), &dest, 4).await;

    assert!(run.outcome.is_success());
    assert_eq!(tokio::fs::metadata(&dest).await.unwrap().len(), 0);
    assert_eq!(run.snapshots.last().unwrap().percent, Some(100.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn custom_threshold_and_buffer() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(100_000, 21));
    mount_resource(&server, "/f.bin", RangeResponder::new(Arc::clone(&body)), true).await;

    let config = DownloaderConfig {
        min_chunked_size: 10_000,
        buffer_size: 1024,
        ..Default::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let outcome = FileDownloader::new(
        DownloadClient::new(&config).unwrap(),
        DownloadRequest::new(format!("{}/f.bin", server.uri()), &dest).with_threads(3),
    )
    .with_config(config)
    .send()
    .await;

    assert!(outcome.is_success());
    assert_eq!(ranged_get_count(&server).await, 3);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), *body);
}

#[tokio::test]
async fn user_agent_is_sent() {
    let server = MockServer::start().await;
    mount_resource(&server, "/f.bin", RangeResponder::new(Arc::new(payload(10, 1))), true).await;

    let dir = tempfile::tempdir().unwrap();
    let run = run_download(
        test_client(),
        format!("{}/f.bin", server.uri()),
        &dir.path().join("f.bin"),
        1,
    )
    .await;
    assert!(run.outcome.is_success());

    let requests = server.received_requests().await.unwrap();
    let expected = DownloaderConfig::default().user_agent;
    assert!(requests.iter().all(|r| {
        r.headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ua| ua == expected)
    }));
}

#[tokio::test]
async fn get_length_wins_over_head_length() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-length", "1000")
                .set_body_bytes(vec![0u8; 1000]),
        )
        .mount(&server)
        .await;
    let body = payload(500, 31);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(run.outcome.is_success(), "{:?}", run.outcome);
    let last = run.snapshots.last().unwrap();
    assert_eq!(last.total_bytes, Some(500));
    assert_progress_converges(&run.snapshots, 500);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
}

#[tokio::test]
async fn short_body_without_length_fails() {
    let base = serve_without_content_length(1000, payload(500, 33)).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", base), &dest, 4).await;

    assert!(!run.outcome.is_success());
    let message = run.outcome.error_message.unwrap();
    assert!(message.contains("期望 1000") && message.contains("实际 500"), "{}", message);
    assert_eq!(run.status, DownloadStatus::Failed);
    assert!(!dest.exists());
}

#[tokio::test]
async fn body_without_length_uses_head_size() {
    let body = payload(500, 35);
    let base = serve_without_content_length(500, body.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = run_download(test_client(), format!("{}/f.bin", base), &dest, 4).await;

    assert!(run.outcome.is_success(), "{:?}", run.outcome);
    assert_eq!(run.snapshots.last().unwrap().total_bytes, Some(500));
    assert_progress_converges(&run.snapshots, 500);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_chunk_cancels_slow_siblings() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(2 * MIB, 37));
    let second = plan_chunks(body.len() as u64, 4)[1].start as usize;
    let mut responder = RangeResponder::new(Arc::clone(&body));
    responder.fail_from = Some(second);
    responder.delay = Some(Duration::from_secs(30));
    mount_resource(&server, "/f.bin", responder, true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    let run = tokio::time::timeout(
        Duration::from_secs(5),
        run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4),
    )
    .await
    .expect("一个分片失败后其余分片应立即被取消");

    assert!(!run.outcome.is_success());
    let message = run.outcome.error_message.unwrap();
    assert!(message.contains("500"), "{}", message);
    assert!(!message.contains("下载被取消"));
    assert_eq!(run.status, DownloadStatus::Failed);
    assert!(!dest.exists());
    assert!(part_files_in(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unwritable_part_file_fails_download() {
    let server = MockServer::start().await;
    let body = Arc::new(payload(2 * MIB, 39));
    mount_resource(&server, "/f.bin", RangeResponder::new(body), true).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("f.bin");
    // 分片 1 的临时文件路径被目录占用，创建文件必然失败
    std::fs::create_dir(part_path(&dest, 1)).unwrap();

    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(!run.outcome.is_success());
    let message = run.outcome.error_message.unwrap();
    assert!(message.contains("创建文件失败"), "{}", message);
    assert_eq!(run.status, DownloadStatus::Failed);
    assert!(!dest.exists());
    for index in [0, 2, 3] {
        assert!(!part_path(&dest, index).exists(), "分片 {} 的临时文件未清理", index);
    }
}

#[tokio::test]
async fn destination_under_a_file_fails() {
    let server = MockServer::start().await;
    mount_resource(&server, "/f.bin", RangeResponder::new(Arc::new(payload(100, 41))), true).await;

    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let dest = blocker.join("f.bin");

    let run = run_download(test_client(), format!("{}/f.bin", server.uri()), &dest, 4).await;

    assert!(!run.outcome.is_success());
    let message = run.outcome.error_message.unwrap();
    assert!(message.contains("创建目录失败"), "{}", message);
    assert_eq!(run.status, DownloadStatus::Failed);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");
}

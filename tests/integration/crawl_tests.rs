//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the catalog feed and the
//! project download pages, and test the full run cycle end-to-end against a
//! snapshot file in a temporary directory.

use appimage_ripple::catalog::{Package, Platform};
use appimage_ripple::config::Config;
use appimage_ripple::crawler::{run_catalog, Coordinator, RunOptions};
use appimage_ripple::storage::{CatalogStore, JsonFileStore, StorageError};
use appimage_ripple::RippleError;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, snapshot: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.artifact_hosts = vec!["127.0.0.1".to_string()];
    config.crawler.request_timeout_secs = 5;
    config.catalog.feed_url = format!("{}/feed.json", server.uri());
    config.catalog.snapshot_path = snapshot.to_path_buf();
    config
}

fn feed_item(name: &str, download: &str) -> serde_json::Value {
    json!({
        "name": name,
        "description": format!("{} description", name),
        "categories": ["Utility"],
        "license": "MIT",
        "links": [
            { "type": "GitHub", "url": "owner/repo" },
            { "type": "Download", "url": download }
        ],
        "icons": [format!("{}/icons/128x128/{}.png", name, name)],
        "screenshots": null
    })
}

async fn mount_feed(server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 1,
            "home_page_url": "https://appimage.github.io",
            "items": items
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, body: String, heads: u64, gets: u64) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(heads)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .expect(gets)
        .mount(server)
        .await;
}

async fn mount_artifact(server: &MockServer, route: &str, size: usize, heads: u64) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0u8; size], "application/octet-stream"),
        )
        .expect(heads)
        .mount(server)
        .await;
}

fn load_snapshot(path: &Path) -> Vec<Package> {
    JsonFileStore::new(path).load().expect("snapshot should load")
}

#[tokio::test]
async fn test_full_run_discovers_appimage() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(&server, vec![feed_item("Demo", &format!("{}/o/demo/releases", uri))]).await;
    mount_page(
        &server,
        "/o/demo/releases",
        r#"<html><body>
            <a href="/o/demo/releases/download/v1/Demo-x86_64.AppImage">Linux</a>
            <a href="/o/demo/releases/download/v1/Demo-setup.exe">Windows</a>
            <a href="/o/demo/releases/download/v1/Demo.dmg">macOS</a>
            <a href="/o/demo/releases/download/v1/Demo.tar.gz">Source</a>
        </body></html>"#
            .to_string(),
        1,
        1,
    )
    .await;
    mount_artifact(&server, "/o/demo/releases/download/v1/Demo-x86_64.AppImage", 4096, 1).await;
    mount_artifact(&server, "/o/demo/releases/download/v1/Demo-setup.exe", 512, 1).await;
    mount_artifact(&server, "/o/demo/releases/download/v1/Demo.dmg", 1024, 1).await;
    mount_artifact(&server, "/o/demo/releases/download/v1/Demo.tar.gz", 64, 1).await;

    let report = run_catalog(create_test_config(&server, &snapshot), false)
        .await
        .unwrap();

    assert_eq!(report.packages, 1);
    assert_eq!(report.crawled_urls, 5);
    assert_eq!(report.artifacts_found, 3);
    assert_eq!(report.packages_with_artifacts, 1);
    assert_eq!(report.fetch_failures, 0);

    let packages = load_snapshot(&snapshot);
    assert_eq!(packages.len(), 1);
    let demo = &packages[0];
    assert_eq!(demo.artifacts().len(), 3);

    let linux: Vec<_> = demo.artifacts_for(Platform::Linux).collect();
    assert_eq!(linux.len(), 1);
    assert_eq!(
        linux[0].url,
        format!("{}/o/demo/releases/download/v1/Demo-x86_64.AppImage", uri)
    );
    assert_eq!(linux[0].filesize, Some(4096));
    let sizes = |platform| {
        demo.artifacts_for(platform)
            .map(|a| a.filesize)
            .collect::<Vec<_>>()
    };
    assert_eq!(sizes(Platform::Windows), vec![Some(512)]);
    assert_eq!(sizes(Platform::MacOs), vec![Some(1024)]);

    // Feed fields the crawler does not model survive the round trip.
    assert_eq!(demo.license.as_deref(), Some("MIT"));
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(raw[0]["versions"][0]["os"], "linux");
    assert_eq!(raw[0]["links"][1]["type"], "Download");
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(&server, vec![feed_item("Dup", &format!("{}/o/dup/releases", uri))]).await;
    mount_page(
        &server,
        "/o/dup/releases",
        format!(
            r#"<a href="{0}/o/dup/releases/download/v2/Dup.AppImage">a</a>
               <a href="/o/dup/releases/download/v2/Dup.AppImage#sha">b</a>
               <a href="{0}/o/dup/releases">self</a>
               <a href="{0}/o/dup/releases/tag/v2">tag</a>"#,
            uri
        ),
        1,
        1,
    )
    .await;
    mount_page(
        &server,
        "/o/dup/releases/tag/v2",
        r#"<a href="/o/dup/releases/download/v2/Dup.AppImage">again</a>"#.to_string(),
        1,
        1,
    )
    .await;
    mount_artifact(&server, "/o/dup/releases/download/v2/Dup.AppImage", 100, 1).await;

    let mut config = create_test_config(&server, &snapshot);
    config.crawler.max_depth = 2;
    let report = run_catalog(config, false).await.unwrap();

    assert_eq!(report.artifacts_found, 1);
    assert_eq!(load_snapshot(&snapshot)[0].artifacts().len(), 1);
}

#[tokio::test]
async fn test_depth_limit_stops_expansion() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(&server, vec![feed_item("Deep", &format!("{}/o/deep/releases", uri))]).await;
    mount_page(
        &server,
        "/o/deep/releases",
        r#"<a href="/o/deep/releases/tag/v1">tag</a>"#.to_string(),
        1,
        1,
    )
    .await;
    // One hop away: probed, but never fetched at depth 1.
    mount_page(
        &server,
        "/o/deep/releases/tag/v1",
        r#"<a href="/o/deep/releases/download/v1/Deep.AppImage">file</a>"#.to_string(),
        1,
        0,
    )
    .await;
    mount_artifact(&server, "/o/deep/releases/download/v1/Deep.AppImage", 10, 0).await;

    let report = run_catalog(create_test_config(&server, &snapshot), false)
        .await
        .unwrap();

    assert_eq!(report.artifacts_found, 0);
    assert_eq!(report.packages_with_artifacts, 0);

    let packages = load_snapshot(&snapshot);
    assert!(packages[0].is_crawled());
    assert!(!packages[0].has_artifacts());
}

#[tokio::test]
async fn test_resume_is_idempotent() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(&server, vec![feed_item("Again", &format!("{}/o/again/releases", uri))]).await;
    // Only the first run may touch the network.
    mount_page(
        &server,
        "/o/again/releases",
        r#"<a href="/o/again/releases/download/v1/Again.AppImage">file</a>"#.to_string(),
        1,
        1,
    )
    .await;
    mount_artifact(&server, "/o/again/releases/download/v1/Again.AppImage", 10, 1).await;

    run_catalog(create_test_config(&server, &snapshot), false)
        .await
        .unwrap();
    let first = std::fs::read_to_string(&snapshot).unwrap();

    let report = run_catalog(create_test_config(&server, &snapshot), true)
        .await
        .unwrap();
    let second = std::fs::read_to_string(&snapshot).unwrap();

    assert_eq!(first, second);
    assert_eq!(report.crawled_urls, 0);
    assert_eq!(report.artifacts_found, 0);
}

#[tokio::test]
async fn test_resume_without_snapshot_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("missing.json");

    let result = run_catalog(create_test_config(&server, &snapshot), true).await;

    assert!(matches!(
        result,
        Err(RippleError::Storage(StorageError::MissingSnapshot(_)))
    ));
    assert!(!snapshot.exists());
}

#[tokio::test]
async fn test_max_loops_limits_packages() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(
        &server,
        vec![
            feed_item("First", &format!("{}/o/first/releases", uri)),
            feed_item("Second", &format!("{}/o/second/releases", uri)),
            feed_item("Third", &format!("{}/o/third/releases", uri)),
        ],
    )
    .await;
    mount_page(&server, "/o/first/releases", String::new(), 1, 1).await;
    mount_page(&server, "/o/second/releases", String::new(), 0, 0).await;
    mount_page(&server, "/o/third/releases", String::new(), 0, 0).await;

    let mut config = create_test_config(&server, &snapshot);
    config.catalog.max_loops = 1;
    let report = run_catalog(config, false).await.unwrap();

    assert_eq!(report.packages, 3);
    assert_eq!(report.crawled_urls, 1);

    let packages = load_snapshot(&snapshot);
    assert_eq!(packages.len(), 3);
    assert!(packages[0].is_crawled());
    assert!(!packages[1].is_crawled());
    assert!(!packages[2].is_crawled());
}

#[tokio::test]
async fn test_shared_page_fetched_once_across_packages() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    let shared = format!("{}/o/suite/releases", uri);
    mount_feed(
        &server,
        vec![feed_item("SuiteA", &shared), feed_item("SuiteB", &shared)],
    )
    .await;
    mount_page(
        &server,
        "/o/suite/releases",
        r#"<a href="/o/suite/releases/download/v1/Suite.AppImage">file</a>"#.to_string(),
        1,
        1,
    )
    .await;
    mount_artifact(&server, "/o/suite/releases/download/v1/Suite.AppImage", 10, 1).await;

    let report = run_catalog(create_test_config(&server, &snapshot), false)
        .await
        .unwrap();

    assert_eq!(report.packages_with_artifacts, 1);

    // The second package reaches an already visited seed and finds nothing.
    let packages = load_snapshot(&snapshot);
    assert_eq!(packages[0].artifacts().len(), 1);
    assert!(packages[1].is_crawled());
    assert!(packages[1].artifacts().is_empty());
}

#[tokio::test]
async fn test_package_without_download_link_is_skipped() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(
        &server,
        vec![
            json!({ "name": "NoLinks", "links": null }),
            json!({ "name": "GitHubOnly", "links": [{ "type": "GitHub", "url": "owner/repo" }] }),
            feed_item("Relative", "owner/repo/releases"),
            feed_item("Real", &format!("{}/o/real/releases", uri)),
        ],
    )
    .await;
    mount_page(&server, "/o/real/releases", String::new(), 1, 1).await;

    let report = run_catalog(create_test_config(&server, &snapshot), false)
        .await
        .unwrap();
    assert_eq!(report.crawled_urls, 1);

    let packages = load_snapshot(&snapshot);
    assert_eq!(packages.len(), 4);
    assert!(!packages[0].is_crawled());
    assert!(!packages[1].is_crawled());
    assert!(!packages[2].is_crawled());
    assert!(packages[3].is_crawled());
}

#[tokio::test]
async fn test_bad_feed_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": 1 })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    let result = run_catalog(create_test_config(&server, &snapshot), false).await;

    assert!(matches!(result, Err(RippleError::Feed(_))));
    assert!(!snapshot.exists());
}

#[tokio::test]
async fn test_concurrent_packages_all_crawled() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    let names = ["alpha", "beta", "gamma", "delta"];
    let items = names
        .iter()
        .map(|name| feed_item(name, &format!("{}/o/{}/releases", uri, name)))
        .collect();
    mount_feed(&server, items).await;
    for name in names {
        mount_page(
            &server,
            &format!("/o/{}/releases", name),
            format!(r#"<a href="/o/{0}/releases/download/v1/{0}.AppImage">f</a>"#, name),
            1,
            1,
        )
        .await;
        mount_artifact(
            &server,
            &format!("/o/{0}/releases/download/v1/{0}.AppImage", name),
            10,
            1,
        )
        .await;
    }

    let mut config = create_test_config(&server, &snapshot);
    config.crawler.max_concurrent_packages = 3;
    let options = RunOptions::from_config(&config, false);
    let mut coordinator =
        Coordinator::new(config, options, JsonFileStore::new(&snapshot)).unwrap();
    let packages = coordinator.run().await.unwrap();

    // Results land on their own package regardless of completion order.
    for (package, name) in packages.iter().zip(names) {
        assert_eq!(package.name, name);
        assert_eq!(package.artifacts().len(), 1);
        assert!(package.artifacts()[0].url.ends_with(&format!("/{}.AppImage", name)));
    }
    assert_eq!(coordinator.report().packages_with_artifacts, 4);
    assert_eq!(load_snapshot(&snapshot), packages);
}

#[tokio::test]
async fn test_interrupted_package_is_recrawled_on_resume() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("appimages.json");

    mount_feed(&server, vec![feed_item("Slow", &format!("{}/o/slow/releases", uri))]).await;
    mount_page(
        &server,
        "/o/slow/releases",
        r#"<a href="/o/slow/releases/download/v1/Slow.AppImage">linux</a>
           <a href="/o/slow/releases/download/v1/Slow.exe">windows</a>"#
            .to_string(),
        2,
        2,
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/o/slow/releases/download/v1/Slow.AppImage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0u8; 16], "application/octet-stream")
                .set_delay(std::time::Duration::from_millis(600)),
        )
        .expect(2)
        .mount(&server)
        .await;
    mount_artifact(&server, "/o/slow/releases/download/v1/Slow.exe", 32, 1).await;

    let config = create_test_config(&server, &snapshot);
    let options = RunOptions::from_config(&config, false);
    let mut coordinator =
        Coordinator::new(config, options, JsonFileStore::new(&snapshot)).unwrap();
    let ctx = std::sync::Arc::clone(coordinator.context());
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        ctx.budget.stop();
    });
    coordinator.run().await.unwrap();

    // Nothing from the cut-short crawl reaches the snapshot.
    let packages = load_snapshot(&snapshot);
    assert!(!packages[0].is_crawled());

    let report = run_catalog(create_test_config(&server, &snapshot), true)
        .await
        .unwrap();
    assert_eq!(report.artifacts_found, 2);

    let packages = load_snapshot(&snapshot);
    assert_eq!(packages[0].artifacts().len(), 2);
}

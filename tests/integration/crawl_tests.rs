//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the catalog site and run the
//! full page loop end-to-end against a temporary output directory.

use catalog_crawler::config::Config;
use catalog_crawler::crawler::{crawl, Coordinator, PageRange};
use catalog_crawler::CrawlError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, base_dir: &Path, launch_delay_ms: u64) -> Config {
    let mut config = Config::default();
    config.site.site_url = format!("{}/", server.uri());
    config.site.index_url_template = format!("{}/page/{{page}}", server.uri());
    config.crawler.launch_delay_ms = launch_delay_ms;
    config.crawler.request_timeout_secs = 5;
    config.output.base_dir = base_dir.display().to_string();
    config
}

/// One item block in the catalog's markup
fn item_block(title: &str, href: &str, img: &str) -> String {
    format!(
        r#"<div class="newcomic-short">
            <div class="newcomic-mask-top">12 pages, 8 MB<a href="/tags/drama">Drama</a><a href="/tags/color">Color</a></div>
            <div class="newcomic-mask-bottom"><a href="{}" title="{}">{}</a></div>
            <img src="{}">
        </div>"#,
        href, title, title, img
    )
}

fn index_page(blocks: &[String]) -> String {
    format!(
        "<html><head><title>Catalog</title></head><body>{}</body></html>",
        blocks.concat()
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_ok(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let blocks = vec![
        item_block("Alpha", "/d/a.html", "/img/a.jpg"),
        item_block(
            "Beta",
            "/d/b.html",
            &format!("{}/cdn/b.jpg", server.uri()),
        ),
    ];
    mount_html(&server, "/page/1", index_page(&blocks)).await;
    mount_ok(&server, "/img/a.jpg", "jpeg-a").await;
    mount_ok(&server, "/cdn/b.jpg", "jpeg-b").await;
    mount_ok(&server, "/d/a.html", "<html>alpha</html>").await;
    mount_ok(&server, "/d/b.html", "<html>beta</html>").await;

    let config = create_test_config(&server, dir.path(), 300);
    let report = crawl(config, PageRange::new(1, 1).unwrap(), CancellationToken::new())
        .await
        .expect("crawl should succeed");

    let root = dir.path().join("1-1");
    assert!(root.join("1.html").is_file());
    assert_eq!(
        std::fs::read_to_string(root.join("images").join("a.jpg")).unwrap(),
        "jpeg-a"
    );
    assert_eq!(
        std::fs::read_to_string(root.join("images").join("b.jpg")).unwrap(),
        "jpeg-b"
    );
    assert_eq!(
        std::fs::read_to_string(root.join("pages").join("a.html")).unwrap(),
        "<html>alpha</html>"
    );
    assert!(root.join("pages").join("b.html").is_file());

    assert_eq!(report.index_pages_saved, 1);
    assert_eq!(report.items_extracted, 2);
    assert_eq!(report.items_launched, 2);
    assert_eq!(report.files_saved(), 5);
    assert!(!report.cancelled);

    // Two launches with one pacing delay between them
    assert!(report.elapsed >= Duration::from_millis(300));

    // No temporary files are left behind
    for entry in std::fs::read_dir(root.join("images")).unwrap() {
        let name = entry.unwrap().file_name();
        assert!(!name.to_string_lossy().ends_with(".part"));
    }
}

#[tokio::test]
async fn test_failed_index_page_does_not_stop_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for page in [1, 3] {
        Mock::given(method("GET"))
            .and(path(format!("/page/{}", page)))
            .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&[])))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), 10);
    let report = crawl(config, PageRange::new(1, 3).unwrap(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.index_pages_saved, 2);
    assert_eq!(report.index_pages_failed, 1);
    assert_eq!(report.empty_pages, 2);

    let root = dir.path().join("1-3");
    assert!(root.join("1.html").is_file());
    assert!(!root.join("2.html").exists());
    assert!(root.join("3.html").is_file());

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(requested, vec!["/page/1", "/page/2", "/page/3"]);
}

#[tokio::test]
async fn test_page_items_finish_before_next_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/page/1",
        index_page(&[
            item_block("One", "/d/one.html", "/img/one.jpg"),
            item_block("Two", "/d/two.html", "/img/two.jpg"),
        ]),
    )
    .await;
    mount_html(&server, "/page/2", index_page(&[])).await;
    // A slow detail page must still complete before page 2 is requested
    Mock::given(method("GET"))
        .and(path("/d/one.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("one")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_ok(&server, "/d/two.html", "two").await;
    mount_ok(&server, "/img/one.jpg", "1").await;
    mount_ok(&server, "/img/two.jpg", "2").await;

    let config = create_test_config(&server, dir.path(), 20);
    let report = crawl(config, PageRange::new(1, 2).unwrap(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.files_saved(), 6);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();

    assert_eq!(requested.first().map(String::as_str), Some("/page/1"));
    assert_eq!(requested.last().map(String::as_str), Some("/page/2"));
    assert_eq!(requested.len(), 6);

    // The slow page was written before the run moved on
    assert!(dir.path().join("1-2").join("pages").join("one.html").is_file());
}

#[tokio::test]
async fn test_failed_image_keeps_siblings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/page/1",
        index_page(&[
            item_block("Broken", "/d/broken.html", "/img/broken.jpg"),
            item_block("Fine", "/d/fine.html", "/img/fine.jpg"),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/broken.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_ok(&server, "/img/fine.jpg", "ok").await;
    mount_ok(&server, "/d/broken.html", "page").await;
    mount_ok(&server, "/d/fine.html", "page").await;

    let config = create_test_config(&server, dir.path(), 10);
    let report = crawl(config, PageRange::new(1, 1).unwrap(), CancellationToken::new())
        .await
        .unwrap();

    let root = dir.path().join("1-1");
    assert!(!root.join("images").join("broken.jpg").exists());
    assert!(root.join("pages").join("broken.html").is_file());
    assert!(root.join("images").join("fine.jpg").is_file());
    assert!(root.join("pages").join("fine.html").is_file());

    assert_eq!(report.images_failed, 1);
    assert_eq!(report.images_saved, 1);
    assert_eq!(report.detail_pages_saved, 2);
}

#[tokio::test]
async fn test_existing_run_directory_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("4-6")).unwrap();

    let config = create_test_config(&server, dir.path(), 10);
    let result = crawl(config, PageRange::new(4, 6).unwrap(), CancellationToken::new()).await;

    assert!(matches!(result, Err(CrawlError::Directory { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_base_directory_is_created() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("nested").join("downloads");
    mount_html(&server, "/page/1", index_page(&[])).await;

    let config = create_test_config(&server, &base, 10);
    let coordinator =
        Coordinator::new(config, PageRange::new(1, 1).unwrap(), CancellationToken::new()).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.empty_pages, 1);
    assert!(base.join("1-1").join("pages").is_dir());
    assert!(base.join("1-1").join("images").is_dir());
}

#[tokio::test]
async fn test_cancelled_run_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_html(&server, "/page/1", index_page(&[])).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let config = create_test_config(&server, dir.path(), 10);
    let report = crawl(config, PageRange::new(1, 5).unwrap(), cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.index_pages_attempted(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_mid_run_stops_after_current_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let blocks: Vec<String> = (0..10)
        .map(|i| {
            item_block(
                &format!("Item {}", i),
                &format!("/d/{}.html", i),
                &format!("/img/{}.jpg", i),
            )
        })
        .collect();
    mount_html(&server, "/page/1", index_page(&blocks)).await;
    mount_html(&server, "/page/2", index_page(&[])).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.cancel();
    });

    let config = create_test_config(&server, dir.path(), 100);
    let report = crawl(config, PageRange::new(1, 2).unwrap(), cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.items_extracted, 10);
    assert!(report.items_launched < 10);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert!(!requested.iter().any(|p| p == "/page/2"));
}

#[tokio::test]
async fn test_stray_byte_in_title_keeps_whole_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut body = index_page(&[
        item_block("Cafe", "/d/cafe.html", "/img/cafe.jpg"),
        item_block("Tea", "/d/tea.html", "/img/tea.jpg"),
    ])
    .into_bytes();
    // Swap the first title's "e" for a windows-1252 "\xe9"
    let at = body
        .windows(10)
        .position(|w| w == b"title=\"Caf")
        .map(|p| p + 10)
        .unwrap();
    body[at] = 0xe9;

    Mock::given(method("GET"))
        .and(path("/page/1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), 10);
    let report = crawl(config, PageRange::new(1, 1).unwrap(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.parse_failures, 0);
    assert_eq!(report.items_extracted, 2);
    assert_eq!(report.files_saved(), 5);

    let root = dir.path().join("1-1");
    assert!(root.join("images").join("cafe.jpg").is_file());
    assert!(root.join("pages").join("tea.html").is_file());
}

#[tokio::test]
async fn test_empty_page_and_binary_page_are_counted_apart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_html(&server, "/page/1", index_page(&[])).await;
    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00]),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server, dir.path(), 10);
    let report = crawl(config, PageRange::new(1, 2).unwrap(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.index_pages_saved, 2);
    assert_eq!(report.empty_pages, 1);
    assert_eq!(report.parse_failures, 1);
    assert_eq!(report.items_extracted, 0);

    // The raw page is kept even though it could not be parsed
    assert!(dir.path().join("1-2").join("2.html").is_file());
}

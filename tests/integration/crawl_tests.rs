//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a fake catalog site and drive full
//! crawl invocations end to end.

use async_trait::async_trait;
use folio_harvest::artifact::{
    DisabledRemote, RemoteMetadata, RemoteStore, StorageError, StorageProbe,
};
use folio_harvest::catalog::{Catalog, SqliteCatalog};
use folio_harvest::config::{
    Config, CrawlerConfig, RemoteConfig, SiteConfig, StorageConfig, UserAgentConfig,
};
use folio_harvest::crawler::Coordinator;
use folio_harvest::StorageTier;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock site
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
        },
        crawler: CrawlerConfig {
            delay_ms: 0,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig::default(),
        storage: StorageConfig {
            database_path: dir.path().join("catalog.db").to_string_lossy().into_owned(),
            upload_dir: upload_dir(dir).to_string_lossy().into_owned(),
        },
        remote: RemoteConfig::default(),
    }
}

fn upload_dir(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("uploads")
}

fn uploaded_files(dir: &TempDir) -> usize {
    std::fs::read_dir(upload_dir(dir))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

fn coordinator(server: &MockServer, dir: &TempDir, remote: Arc<dyn RemoteStore>) -> Coordinator {
    Coordinator::new(
        create_test_config(&server.uri(), dir),
        Box::new(SqliteCatalog::new_in_memory().unwrap()),
        remote,
    )
    .unwrap()
}

/// A detail page in the site's markup
fn detail_html(title: &str, download_href: Option<&str>) -> String {
    let download = download_href
        .map(|href| format!(r#"<div id="download" class="content"><a href="{}">Tải PDF</a></div>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><head><title>{title} | site</title></head><body>
        <h2 class="ten_san_pham">{title}</h2>
        <table class="tblChiTietDiDong">
          <tr><td>Tác giả:</td><td><a href="/a">Nguyễn Du</a></td></tr>
          <tr><td>Thể loại:</td><td><a class="label">Thơ</a></td></tr>
        </table>
        <div id="chitiet" class="content"><p>Một tác phẩm kinh điển của văn học Việt Nam được nhiều thế hệ yêu mến.</p></div>
        {download}
        </body></html>"#,
        title = title,
        download = download
    )
}

fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.4\n".to_vec();
    bytes.resize(len, b'0');
    bytes
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

async fn mount_pdf(server: &MockServer, route: &str, len: usize) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(pdf_bytes(len)),
        )
        .mount(server)
        .await;
}

/// In-memory remote store
#[derive(Default)]
struct MemoryRemote {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    quota_exceeded: bool,
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn probe(&self) -> StorageProbe {
        StorageProbe::available("memory remote")
    }

    async fn upload(&self, bytes: Vec<u8>, _name: &str, _mime: &str) -> Result<String, StorageError> {
        if self.quota_exceeded {
            return Err(StorageError::RemoteQuota("storageQuotaExceeded".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        let id = format!("obj-{}", objects.len() + 1);
        objects.insert(id.clone(), bytes);
        Ok(id)
    }

    async fn metadata(&self, id: &str) -> Result<RemoteMetadata, StorageError> {
        let objects = self.objects.lock().unwrap();
        let bytes = objects
            .get(id)
            .ok_or_else(|| StorageError::RemoteUpload(format!("no object {}", id)))?;
        Ok(RemoteMetadata {
            name: format!("{}.pdf", id),
            size_bytes: bytes.len() as u64,
            mime_type: "application/pdf".to_string(),
        })
    }

    async fn download_link(&self, id: &str) -> Result<String, StorageError> {
        Ok(format!("https://remote.example/{}", id))
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(id);
        Ok(())
    }
}

#[tokio::test]
async fn test_detail_crawl_then_rerun_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/truyen-kieu_1.html", detail_html("Truyện Kiều", Some("/files/truyen-kieu.pdf"))).await;
    mount_pdf(&server, "/files/truyen-kieu.pdf", 40_000).await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let url = format!("{}/truyen-kieu_1.html", server.uri());

    let first = coordinator.crawl(&url, 1, true).await;
    assert_eq!(first.success_count, 1, "errors: {:?}", first.errors);
    assert_eq!(first.skipped_count, 0);

    let second = coordinator.crawl(&url, 1, true).await;
    assert_eq!(second.success_count, 0);
    assert_eq!(second.skipped_count, 1);

    let catalog = coordinator.catalog();
    assert_eq!(catalog.stats().unwrap().books, 1);

    let book = catalog.get_book(1).unwrap();
    assert_eq!(book.title, "Truyện Kiều");
    assert_eq!(book.author.as_deref(), Some("Nguyễn Du"));
    assert!(book.categories.contains("Thơ"));
    assert_eq!(book.artifact.tier, StorageTier::Local);
    assert_eq!(book.artifact.display_name, "truyen-kieu.pdf");
    assert_eq!(book.artifact.size_bytes, 40_000);
    assert!(Path::new(&book.artifact.storage_key).exists());
    assert_eq!(catalog.recent_runs(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_title_match_ignores_case_and_whitespace() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a_1.html", detail_html("Số Đỏ", None)).await;
    mount_page(&server, "/b_2.html", detail_html("  số đỏ ", None)).await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));

    let first = coordinator.crawl(&format!("{}/a_1.html", server.uri()), 1, false).await;
    assert_eq!(first.success_count, 1);

    let second = coordinator.crawl(&format!("{}/b_2.html", server.uri()), 1, false).await;
    assert_eq!(second.skipped_count, 1);
    assert_eq!(second.success_count, 0);
}

#[tokio::test]
async fn test_listing_processes_only_max_books() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let links: String = (1..=7)
        .map(|i| format!(r#"<a href="/book-{i}_{i}.html">Book {i}</a><a href="/book-{i}_{i}.html#c">again</a>"#, i = i))
        .collect();
    mount_page(
        &server,
        "/the-loai/tho",
        format!(r#"<html><body><a href="/">Home</a>{}</body></html>"#, links),
    )
    .await;

    for i in 1..=7 {
        let expected = if i <= 3 { 1 } else { 0 };
        Mock::given(method("GET"))
            .and(path(format!("/book-{i}_{i}.html", i = i)))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(detail_html(&format!("Book {}", i), None)),
            )
            .expect(expected)
            .mount(&server)
            .await;
    }

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator
        .crawl(&format!("{}/the-loai/tho", server.uri()), 3, false)
        .await;

    assert_eq!(result.success_count, 3);
    assert_eq!(result.processed(), 3);
    assert_eq!(coordinator.catalog().stats().unwrap().books, 3);
}

#[tokio::test]
async fn test_remote_unavailable_without_retention_saves_detached() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/tat-den_3.html", detail_html("Tắt Đèn", Some("/files/tat-den.pdf"))).await;
    mount_pdf(&server, "/files/tat-den.pdf", 30_000).await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator
        .crawl(&format!("{}/tat-den_3.html", server.uri()), 1, false)
        .await;

    assert_eq!(result.success_count, 1);
    let book = coordinator.catalog().get_book(1).unwrap();
    assert_eq!(book.artifact.tier, StorageTier::None);
    assert_eq!(uploaded_files(&dir), 0);
}

#[tokio::test]
async fn test_remote_unavailable_with_retention_keeps_local() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/tat-den_3.html", detail_html("Tắt Đèn", Some("/files/tat-den.pdf"))).await;
    mount_pdf(&server, "/files/tat-den.pdf", 30_000).await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    coordinator
        .crawl(&format!("{}/tat-den_3.html", server.uri()), 1, true)
        .await;

    let book = coordinator.catalog().get_book(1).unwrap();
    assert_eq!(book.artifact.tier, StorageTier::Local);
    assert!(Path::new(&book.artifact.storage_key).exists());
    assert_eq!(uploaded_files(&dir), 1);
}

#[tokio::test]
async fn test_small_artifact_never_attached() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/mong_4.html", detail_html("Mỏng", Some("/files/mong.pdf"))).await;
    mount_pdf(&server, "/files/mong.pdf", 2_000).await;

    let remote = Arc::new(MemoryRemote::default());
    let mut coordinator = coordinator(&server, &dir, remote.clone());
    let result = coordinator
        .crawl(&format!("{}/mong_4.html", server.uri()), 1, true)
        .await;

    assert_eq!(result.success_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("too small"));

    let book = coordinator.catalog().get_book(1).unwrap();
    assert_eq!(book.artifact.tier, StorageTier::None);
    assert_eq!(uploaded_files(&dir), 0);
    assert!(remote.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_remote_upload_discards_local_copy() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/vo-nhat_5.html", detail_html("Vợ Nhặt", Some("/files/vo-nhat.pdf"))).await;
    mount_pdf(&server, "/files/vo-nhat.pdf", 25_000).await;

    let remote = Arc::new(MemoryRemote::default());
    let mut coordinator = coordinator(&server, &dir, remote.clone());
    let result = coordinator
        .crawl(&format!("{}/vo-nhat_5.html", server.uri()), 1, false)
        .await;

    assert_eq!(result.success_count, 1);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);

    let book = coordinator.catalog().get_book(1).unwrap();
    assert_eq!(book.artifact.tier, StorageTier::Remote);
    assert_eq!(book.artifact.storage_key, "obj-1");
    assert_eq!(book.artifact.display_name, "vo-nhat.pdf");
    assert_eq!(book.artifact.size_bytes, 25_000);
    assert_eq!(uploaded_files(&dir), 0);
    assert_eq!(remote.objects.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_remote_quota_falls_back_to_local() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/chi-pheo_6.html", detail_html("Chí Phèo", Some("/files/chi-pheo.pdf"))).await;
    mount_pdf(&server, "/files/chi-pheo.pdf", 25_000).await;

    let remote = Arc::new(MemoryRemote {
        quota_exceeded: true,
        ..MemoryRemote::default()
    });
    let mut coordinator = coordinator(&server, &dir, remote);
    let result = coordinator
        .crawl(&format!("{}/chi-pheo_6.html", server.uri()), 1, false)
        .await;

    assert_eq!(result.success_count, 1);
    assert!(result.errors.iter().any(|e| e.contains("quota")));

    let book = coordinator.catalog().get_book(1).unwrap();
    assert_eq!(book.artifact.tier, StorageTier::Local);
    assert_eq!(uploaded_files(&dir), 1);
}

#[tokio::test]
async fn test_missing_title_counts_as_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/khong-ten_7.html",
        "<html><head><title></title></head><body><p>no heading</p></body></html>".to_string(),
    )
    .await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator
        .crawl(&format!("{}/khong-ten_7.html", server.uri()), 1, false)
        .await;

    assert_eq!(result.failed_count, 1);
    assert_eq!(result.success_count, 0);
    assert_eq!(result.skipped_count, 0);
    assert!(result.errors[0].contains("title"));
}

#[tokio::test]
async fn test_listing_fetch_failure_aborts_with_one_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/the-loai/loi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator
        .crawl(&format!("{}/the-loai/loi", server.uri()), 5, false)
        .await;

    assert_eq!(result.processed(), 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("500"));
}

#[tokio::test]
async fn test_listing_without_detail_links_explains() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/trong", r#"<a href="/gioi-thieu">About</a>"#.to_string()).await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator.crawl(&format!("{}/trong", server.uri()), 5, false).await;

    assert_eq!(result.processed(), 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("No detail page links"));
}

#[tokio::test]
async fn test_excluded_format_link_never_selected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let html = r#"<html><body><h2 class="ten_san_pham">Lục Vân Tiên</h2>
        <div id="download" class="content">
          <a href="/files/luc-van-tien.epub">Tải PDF (epub)</a>
          <a href="/files/luc-van-tien.pdf">Tải EPUB</a>
        </div></body></html>"#;
    mount_page(&server, "/luc-van-tien_8.html", html.to_string()).await;

    Mock::given(method("GET"))
        .and(path("/files/luc-van-tien.epub"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf_bytes(30_000)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/luc-van-tien.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf_bytes(30_000)))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator
        .crawl(&format!("{}/luc-van-tien_8.html", server.uri()), 1, true)
        .await;

    assert_eq!(result.success_count, 1);
    let book = coordinator.catalog().get_book(1).unwrap();
    assert!(book.download_url.is_none());
    assert_eq!(book.artifact.tier, StorageTier::None);
}

#[tokio::test]
async fn test_interstitial_page_not_attached() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/canh-bao_9.html", detail_html("Cảnh Báo", Some("/files/canh-bao.pdf"))).await;
    let mut warning = b"<!DOCTYPE html><html><body>Google Drive can't scan this file for viruses.</body></html>".to_vec();
    warning.resize(20_000, b' ');
    Mock::given(method("GET"))
        .and(path("/files/canh-bao.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(warning),
        )
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&server, &dir, Arc::new(DisabledRemote));
    let result = coordinator
        .crawl(&format!("{}/canh-bao_9.html", server.uri()), 1, true)
        .await;

    assert_eq!(result.success_count, 1);
    assert!(result.errors[0].contains("HTML page"));
    assert_eq!(coordinator.catalog().get_book(1).unwrap().artifact.tier, StorageTier::None);
    assert_eq!(uploaded_files(&dir), 0);
}

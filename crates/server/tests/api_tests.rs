use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{DateTime, Utc};
use tower::ServiceExt;

use mediadrop_blob::{BlobContent, BlobError, BlobStore, BlobUpload, StoredBlob};
use mediadrop_blob_local::LocalDiskBackend;
use mediadrop_blob_memory::MemoryBlobStore;
use mediadrop_catalog::{CatalogError, MediaCatalog, MediaPage};
use mediadrop_catalog_memory::MemoryMediaCatalog;
use mediadrop_core::{BackendKind, MediaRecord, PageRequest, StorageLocator};
use mediadrop_server::api::{AppState, router};
use mediadrop_server::config::UploadConfig;

// -- Failing backends -----------------------------------------------------

/// Catalog whose `insert` fails from the `fail_from`-th call on (1-based).
struct FlakyCatalog {
    inner: MemoryMediaCatalog,
    inserts: AtomicUsize,
    fail_from: usize,
}

impl FlakyCatalog {
    fn failing_from(fail_from: usize) -> Self {
        Self {
            inner: MemoryMediaCatalog::new(),
            inserts: AtomicUsize::new(0),
            fail_from,
        }
    }
}

#[async_trait]
impl MediaCatalog for FlakyCatalog {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn insert(&self, record: MediaRecord) -> Result<(), CatalogError> {
        let call = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_from {
            return Err(CatalogError::Storage("disk full".into()));
        }
        self.inner.insert(record).await
    }

    async fn get(&self, id: &str) -> Result<Option<MediaRecord>, CatalogError> {
        self.inner.get(id).await
    }

    async fn list(&self, page: &PageRequest) -> Result<MediaPage, CatalogError> {
        self.inner.list(page).await
    }

    async fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        self.inner.delete(id).await
    }

    async fn remove_expired(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MediaRecord>, CatalogError> {
        self.inner.remove_expired(cutoff).await
    }
}

/// Blob store that fails `put` from the `fail_put_from`-th call on, and
/// optionally every `delete`.
struct FlakyBlobStore {
    inner: Arc<MemoryBlobStore>,
    puts: AtomicUsize,
    fail_put_from: usize,
    fail_delete: bool,
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    fn backend(&self) -> BackendKind {
        self.inner.backend()
    }

    async fn put(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        let call = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_put_from {
            return Err(BlobError::Storage("bucket unavailable".into()));
        }
        self.inner.put(upload).await
    }

    async fn open(&self, locator: &StorageLocator) -> Result<Option<BlobContent>, BlobError> {
        self.inner.open(locator).await
    }

    async fn delete(&self, locator: &StorageLocator) -> Result<bool, BlobError> {
        if self.fail_delete {
            return Err(BlobError::Storage("bucket unavailable".into()));
        }
        self.inner.delete(locator).await
    }
}

// -- Helpers --------------------------------------------------------------

const BOUNDARY: &str = "mediadrop-test-boundary";

enum Part<'a> {
    File {
        field: &'a str,
        name: &'a str,
        mime: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn image(name: &str) -> Part<'_> {
    Part::File {
        field: "media",
        name,
        mime: "image/png",
        data: b"\x89PNG fake image bytes",
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                field,
                name,
                mime,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

struct Harness {
    app: Router,
    blobs: Arc<MemoryBlobStore>,
    catalog: Arc<MemoryMediaCatalog>,
}

fn harness_with(blobs: MemoryBlobStore, upload: UploadConfig) -> Harness {
    let blobs = Arc::new(blobs);
    let catalog = Arc::new(MemoryMediaCatalog::new());
    let state = AppState::new(
        Arc::clone(&blobs) as Arc<dyn BlobStore>,
        Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
    )
    .with_upload_config(upload);
    Harness {
        app: router(state),
        blobs,
        catalog,
    }
}

fn harness() -> Harness {
    harness_with(MemoryBlobStore::new(), UploadConfig::default())
}

async fn upload_one(app: &Router, name: &str) -> serde_json::Value {
    let (status, json) = send_json(app, upload_request(&[image(name)])).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {json}");
    json["data"]["files"][0].clone()
}

// -- Upload ---------------------------------------------------------------

#[tokio::test]
async fn upload_stores_files_and_returns_summaries() {
    let h = harness();

    let (status, json) = send_json(
        &h.app,
        upload_request(&[
            image("cat.png"),
            Part::File {
                field: "media",
                name: "clip.mp4",
                mime: "video/mp4",
                data: b"not really a video",
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Files uploaded successfully");

    let files = json["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["originalName"], "cat.png");
    assert_eq!(files[0]["mimetype"], "image/png");
    assert_eq!(files[0]["size"], 21);
    assert_eq!(files[0]["storage"]["backend"], "local");
    assert_eq!(files[1]["originalName"], "clip.mp4");
    assert_eq!(files[1]["mimetype"], "video/mp4");
    assert_ne!(files[0]["filename"], files[1]["filename"]);
    assert!(files[0]["filename"].as_str().unwrap().ends_with(".png"));

    assert_eq!(h.blobs.len(), 2);
    assert_eq!(h.catalog.len(), 2);
}

#[tokio::test]
async fn upload_shares_uploader_and_message() {
    let h = harness();

    let (status, _) = send_json(
        &h.app,
        upload_request(&[
            Part::Text {
                name: "uploader",
                value: "Ada",
            },
            Part::Text {
                name: "message",
                value: "holiday",
            },
            image("a.png"),
            image("b.png"),
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send_json(&h.app, get("/media")).await;
    let media = json["data"]["media"].as_array().unwrap();
    assert_eq!(media.len(), 2);
    for record in media {
        assert_eq!(record["uploader"], "Ada");
        assert_eq!(record["message"], "holiday");
    }
    assert_eq!(media[0]["uploadedAt"], media[1]["uploadedAt"]);
}

#[tokio::test]
async fn blank_uploader_becomes_guest() {
    let h = harness();

    let (status, _) = send_json(
        &h.app,
        upload_request(&[
            Part::Text {
                name: "uploader",
                value: "   ",
            },
            image("a.png"),
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send_json(&h.app, get("/media")).await;
    assert_eq!(json["data"]["media"][0]["uploader"], "Guest");
    assert_eq!(json["data"]["media"][0]["message"], "");
}

#[tokio::test]
async fn upload_without_files_is_rejected() {
    let h = harness();

    let (status, json) = send_json(
        &h.app,
        upload_request(&[Part::Text {
            name: "uploader",
            value: "Ada",
        }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No files uploaded");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn non_media_file_is_rejected_before_anything_is_stored() {
    let h = harness();

    let (status, json) = send_json(
        &h.app,
        upload_request(&[
            image("ok.png"),
            Part::File {
                field: "media",
                name: "notes.txt",
                mime: "text/plain",
                data: b"hello",
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["message"], "Only image and video files are allowed!");
    assert!(h.blobs.is_empty());
    assert!(h.catalog.is_empty());
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let upload = UploadConfig {
        max_file_size_mb: 1,
        ..UploadConfig::default()
    };
    let h = harness_with(MemoryBlobStore::new(), upload);
    let big = vec![0_u8; 1024 * 1024 + 1];

    let (status, json) = send_json(
        &h.app,
        upload_request(&[
            image("small.png"),
            Part::File {
                field: "media",
                name: "big.png",
                mime: "image/png",
                data: &big,
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["success"], false);
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn too_many_files_are_rejected() {
    let h = harness();
    let names: Vec<String> = (0..11).map(|i| format!("f{i}.png")).collect();
    let parts: Vec<Part<'_>> = names.iter().map(|n| image(n)).collect();

    let (status, _) = send_json(&h.app, upload_request(&parts)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(h.blobs.is_empty());
    assert!(h.catalog.is_empty());
}

#[tokio::test]
async fn ten_files_are_accepted() {
    let h = harness();
    let names: Vec<String> = (0..10).map(|i| format!("f{i}.png")).collect();
    let parts: Vec<Part<'_>> = names.iter().map(|n| image(n)).collect();

    let (status, json) = send_json(&h.app, upload_request(&parts)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["files"].as_array().unwrap().len(), 10);
    assert_eq!(h.catalog.len(), 10);
}

#[tokio::test]
async fn file_under_wrong_field_is_rejected() {
    let h = harness();

    let (status, json) = send_json(
        &h.app,
        upload_request(&[Part::File {
            field: "photos",
            name: "a.png",
            mime: "image/png",
            data: b"x",
        }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("photos"));
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn long_message_is_rejected() {
    let h = harness();
    let message = "x".repeat(501);

    let (status, _) = send_json(
        &h.app,
        upload_request(&[
            Part::Text {
                name: "message",
                value: &message,
            },
            image("a.png"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.blobs.is_empty());
    assert!(h.catalog.is_empty());
}

#[tokio::test]
async fn extension_allow_list_is_enforced() {
    let upload = UploadConfig {
        allowed_extensions: vec!["png".into()],
        ..UploadConfig::default()
    };
    let h = harness_with(MemoryBlobStore::new(), upload);

    let (status, _) = send_json(
        &h.app,
        upload_request(&[Part::File {
            field: "media",
            name: "clip.mp4",
            mime: "video/mp4",
            data: b"x",
        }]),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, _) = send_json(&h.app, upload_request(&[image("A.PNG")])).await;
    assert_eq!(status, StatusCode::OK);
}

// -- Listing --------------------------------------------------------------

#[tokio::test]
async fn list_is_paginated_newest_first() {
    let h = harness();
    for name in ["a.png", "b.png", "c.png"] {
        upload_one(&h.app, name).await;
    }

    let (status, json) = send_json(&h.app, get("/media?page=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let media = json["data"]["media"].as_array().unwrap();
    assert_eq!(media.len(), 2);
    assert_eq!(media[0]["originalName"], "c.png");
    assert_eq!(media[1]["originalName"], "b.png");
    assert_eq!(
        json["data"]["pagination"],
        serde_json::json!({"page": 1, "limit": 2, "total": 3, "pages": 2})
    );

    let (_, json) = send_json(&h.app, get("/media?page=2&limit=2")).await;
    let media = json["data"]["media"].as_array().unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0]["originalName"], "a.png");

    let (_, json) = send_json(&h.app, get("/media?page=9&limit=2")).await;
    assert!(json["data"]["media"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["pagination"]["total"], 3);
}

#[tokio::test]
async fn list_query_values_are_clamped() {
    let h = harness();
    upload_one(&h.app, "a.png").await;

    let (_, json) = send_json(&h.app, get("/media")).await;
    assert_eq!(json["data"]["pagination"]["page"], 1);
    assert_eq!(json["data"]["pagination"]["limit"], 20);

    let (status, json) = send_json(&h.app, get("/media?page=0&limit=-3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pagination"]["page"], 1);
    assert_eq!(json["data"]["pagination"]["limit"], 1);

    let (_, json) = send_json(&h.app, get("/media?limit=5000")).await;
    assert_eq!(json["data"]["pagination"]["limit"], 100);

    let (status, json) = send_json(&h.app, get("/media?page=abc&limit=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pagination"]["page"], 1);
    assert_eq!(json["data"]["pagination"]["limit"], 20);
}

#[tokio::test]
async fn empty_catalog_lists_nothing() {
    let h = harness();

    let (status, json) = send_json(&h.app, get("/media")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["media"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["pagination"]["total"], 0);
    assert_eq!(json["data"]["pagination"]["pages"], 0);
}

// -- Serving --------------------------------------------------------------

#[tokio::test]
async fn local_media_is_streamed() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(LocalDiskBackend::new(dir.path()).await.unwrap());
    let catalog = Arc::new(MemoryMediaCatalog::new());
    let app = router(AppState::new(blobs, catalog));

    let summary = upload_one(&app, "cat.png").await;
    let id = summary["id"].as_str().unwrap();

    let (status, headers, body) = send(&app, get(&format!("/media/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(headers[header::CONTENT_LENGTH], "21");
    assert_eq!(&body[..], b"\x89PNG fake image bytes");
}

#[tokio::test]
async fn remote_media_redirects() {
    let h = harness_with(
        MemoryBlobStore::remote("https://cdn.example.com/media"),
        UploadConfig::default(),
    );
    let summary = upload_one(&h.app, "cat.png").await;
    let id = summary["id"].as_str().unwrap();
    assert_eq!(summary["storage"]["backend"], "remote");

    let (status, headers, _) = send(&h.app, get(&format!("/media/{id}"))).await;

    assert_eq!(status, StatusCode::FOUND);
    let location = headers[header::LOCATION].to_str().unwrap();
    assert_eq!(location, summary["storage"]["url"].as_str().unwrap());
    assert!(location.starts_with("https://cdn.example.com/media/"));
}

#[tokio::test]
async fn unknown_media_is_not_found() {
    let h = harness();

    let (status, json) = send_json(&h.app, get("/media/does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Media not found");
}

#[tokio::test]
async fn missing_bytes_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(LocalDiskBackend::new(dir.path()).await.unwrap());
    let catalog = Arc::new(MemoryMediaCatalog::new());
    let app = router(AppState::new(blobs, catalog));

    let summary = upload_one(&app, "cat.png").await;
    let id = summary["id"].as_str().unwrap();
    let filename = summary["filename"].as_str().unwrap();
    std::fs::remove_file(dir.path().join(filename)).unwrap();

    let (status, json) = send_json(&app, get(&format!("/media/{id}"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Media not found");
}

// -- Deletion -------------------------------------------------------------

#[tokio::test]
async fn delete_removes_record_and_bytes() {
    let h = harness();
    let summary = upload_one(&h.app, "cat.png").await;
    let id = summary["id"].as_str().unwrap();

    let (status, json) = send_json(&h.app, delete(&format!("/media/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Media deleted successfully");
    assert!(h.blobs.is_empty());
    assert!(h.catalog.is_empty());

    let (status, _) = send_json(&h.app, get(&format!("/media/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send_json(&h.app, delete(&format!("/media/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Media not found");
}

#[tokio::test]
async fn delete_succeeds_when_bytes_cannot_be_removed() {
    let inner = Arc::new(MemoryBlobStore::new());
    let blobs = Arc::new(FlakyBlobStore {
        inner: Arc::clone(&inner),
        puts: AtomicUsize::new(0),
        fail_put_from: usize::MAX,
        fail_delete: true,
    });
    let catalog = Arc::new(MemoryMediaCatalog::new());
    let app = router(AppState::new(
        blobs,
        Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
    ));

    let summary = upload_one(&app, "cat.png").await;
    let id = summary["id"].as_str().unwrap();

    let (status, _) = send_json(&app, delete(&format!("/media/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(catalog.is_empty());
    assert_eq!(inner.len(), 1, "bytes are left behind as an orphan");
}

// -- Backend failures -----------------------------------------------------

#[tokio::test]
async fn catalog_failure_rolls_back_the_whole_upload() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let catalog = Arc::new(FlakyCatalog::failing_from(2));
    let app = router(AppState::new(
        Arc::clone(&blobs) as Arc<dyn BlobStore>,
        Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
    ));

    let (status, json) = send_json(
        &app,
        upload_request(&[image("a.png"), image("b.png"), image("c.png")]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Error uploading files");
    assert_eq!(json["error"], "Internal server error");
    assert!(blobs.is_empty());
    assert!(catalog.inner.is_empty());
}

#[tokio::test]
async fn development_mode_exposes_error_detail() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let catalog = Arc::new(FlakyCatalog::failing_from(1));
    let app = router(AppState::new(blobs, catalog).with_expose_errors(true));

    let (status, json) = send_json(&app, upload_request(&[image("a.png")])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("disk full"));
}

#[tokio::test]
async fn blob_failure_removes_files_already_written() {
    let inner = Arc::new(MemoryBlobStore::new());
    let blobs = Arc::new(FlakyBlobStore {
        inner: Arc::clone(&inner),
        puts: AtomicUsize::new(0),
        fail_put_from: 2,
        fail_delete: false,
    });
    let catalog = Arc::new(MemoryMediaCatalog::new());
    let app = router(AppState::new(
        blobs,
        Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
    ));

    let (status, json) = send_json(&app, upload_request(&[image("a.png"), image("b.png")])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Error uploading files");
    assert!(inner.is_empty());
    assert!(catalog.is_empty());
}

// -- Health and docs ------------------------------------------------------

#[tokio::test]
async fn health_reports_backends() {
    let h = harness();

    let (status, json) = send_json(&h.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "local");
    assert_eq!(json["catalog"], "memory");
}

#[tokio::test]
async fn openapi_json_lists_media_routes() {
    let h = harness();

    let (status, spec) = send_json(&h.app, get("/api-doc/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(spec["openapi"].as_str().unwrap().starts_with("3.1"));
    let paths = spec["paths"].as_object().expect("paths should be an object");
    for path in ["/health", "/upload", "/media", "/media/{id}"] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(paths["/media/{id}"].get("delete").is_some());
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let h = harness();

    let (status, _, body) = send(&h.app, get("/swagger-ui/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("swagger"));
}

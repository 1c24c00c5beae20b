//! Integration tests for single-DOI retrieval against mock services.

mod support;
use support::socket_guard::start_mock_server_or_skip;

use std::sync::Arc;
use std::time::Duration;

use paperfetch_core::resolver::UnpaywallResolver;
use paperfetch_core::{FailureKind, FetchError, HttpClient, HttpTimeouts, OpenAccessFetcher};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "tester@example.org";

fn fetcher(server: &MockServer) -> OpenAccessFetcher {
    fetcher_with_timeouts(server, HttpTimeouts::default())
}

fn fetcher_with_timeouts(server: &MockServer, timeouts: HttpTimeouts) -> OpenAccessFetcher {
    let locator = UnpaywallResolver::with_base_url(EMAIL, server.uri(), timeouts).unwrap();
    OpenAccessFetcher::new(Arc::new(locator), HttpClient::new(timeouts).unwrap())
}

async fn mount_lookup(server: &MockServer, doi: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{doi}")))
        .and(query_param("email", EMAIL))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_doi_saves_exact_bytes() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let pdf = b"%PDF-1.7\n\x00\x01binary body\n%%EOF".to_vec();
    mount_lookup(
        &server,
        "10.1/xyz",
        json!({
            "is_oa": true,
            "best_oa_location": { "url_for_pdf": format!("{}/files/xyz.pdf", server.uri()) }
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/xyz.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf.clone())
                .insert_header("Content-Type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("Smith2020.pdf");
    let saved = fetcher(&server)
        .resolve_and_save("10.1/xyz", &dest)
        .await
        .unwrap();

    assert_eq!(saved.path, dest);
    assert_eq!(saved.bytes, pdf.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), pdf);
    assert!(!dir.path().join("Smith2020.pdf.part").exists());
}

#[tokio::test]
async fn test_existing_file_is_overwritten() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_lookup(
        &server,
        "10.1/new",
        json!({ "best_oa_location": { "url_for_pdf": format!("{}/new.pdf", server.uri()) } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/new.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-new".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("A.pdf");
    std::fs::write(&dest, b"old contents that are longer").unwrap();

    fetcher(&server)
        .resolve_and_save("10.1/new", &dest)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-new");
}

#[tokio::test]
async fn test_unknown_doi_is_lookup_failure_without_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/v2/10.1/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("X.pdf");
    let err = fetcher(&server)
        .resolve_and_save("10.1/missing", &dest)
        .await
        .unwrap_err();

    match &err {
        FetchError::MetadataLookupFailed { doi, status, .. } => {
            assert_eq!(doi, "10.1/missing");
            assert_eq!(*status, Some(404));
        }
        other => panic!("expected MetadataLookupFailed, got {other:?}"),
    }
    assert!(!dest.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_pdf_url_is_no_open_access_without_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_lookup(
        &server,
        "10.1/closed",
        json!({ "is_oa": false, "best_oa_location": null }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("X.pdf");
    let err = fetcher(&server)
        .resolve_and_save("10.1/closed", &dest)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::NoOpenAccessCopy);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_pdf_server_error_is_download_failure_without_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_lookup(
        &server,
        "10.1/gone",
        json!({ "best_oa_location": { "url_for_pdf": format!("{}/gone.pdf", server.uri()) } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("X.pdf");
    let err = fetcher(&server)
        .resolve_and_save("10.1/gone", &dest)
        .await
        .unwrap_err();

    match &err {
        FetchError::DownloadFailed { status, url, .. } => {
            assert_eq!(*status, Some(503));
            assert!(url.ends_with("/gone.pdf"));
        }
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_html_landing_page_is_download_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_lookup(
        &server,
        "10.1/html",
        json!({ "best_oa_location": { "url_for_pdf": format!("{}/landing", server.uri()) } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>Sign in</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("X.pdf");
    let err = fetcher(&server)
        .resolve_and_save("10.1/html", &dest)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::DownloadFailed);
    assert!(err.to_string().contains("not a PDF"), "got {err}");
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_missing_parent_directory_is_write_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_lookup(
        &server,
        "10.1/ok",
        json!({ "best_oa_location": { "url_for_pdf": format!("{}/ok.pdf", server.uri()) } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ok.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("absent").join("X.pdf");
    let err = fetcher(&server)
        .resolve_and_save("10.1/ok", &dest)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::WriteFailed);
    assert!(!dest.exists());
}

const SHORT_TIMEOUTS: HttpTimeouts = HttpTimeouts {
    connect_secs: 1,
    request_secs: 1,
};

#[tokio::test]
async fn test_slow_lookup_times_out_as_lookup_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/v2/10.1/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "best_oa_location": { "url_for_pdf": "http://unused/x.pdf" }
                }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("Slow.pdf");
    let err = fetcher_with_timeouts(&server, SHORT_TIMEOUTS)
        .resolve_and_save("10.1/slow", &dest)
        .await
        .unwrap_err();

    match &err {
        FetchError::MetadataLookupFailed { status, detail, .. } => {
            assert_eq!(*status, None);
            assert!(detail.contains("timed out"), "got {detail}");
        }
        other => panic!("expected MetadataLookupFailed, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_slow_pdf_server_times_out_as_download_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_lookup(
        &server,
        "10.1/stall",
        json!({ "best_oa_location": { "url_for_pdf": format!("{}/stall.pdf", server.uri()) } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/stall.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.7 late".to_vec())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("Stall.pdf");
    let err = fetcher_with_timeouts(&server, SHORT_TIMEOUTS)
        .resolve_and_save("10.1/stall", &dest)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::DownloadFailed);
    assert!(err.to_string().contains("timed out"), "got {err}");
    assert!(!dest.exists());
}

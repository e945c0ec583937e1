//! Integration tests for the HTTP surface, run against a stub converter so
//! no external engine is needed.
//!
//! The two properties that matter most here:
//! * the zip archive contains exactly the successfully converted files, and
//! * each download's body equals the corresponding result's content.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docrelay::converter::{ConvertedDocument, DocumentConverter};
use docrelay::web::{router, AppState, DEFAULT_BODY_LIMIT};
use docrelay::{ConvertConfig, InputFormat, OutputFormat, ProgressRelay, RelayError};
use http_body_util::BodyExt;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

// ── Stub converter ───────────────────────────────────────────────────────

/// Succeeds with canned content; fails for filenames containing "fail".
struct StubConverter;

#[async_trait::async_trait]
impl DocumentConverter for StubConverter {
    async fn convert(
        &self,
        input: &Path,
        _input_format: InputFormat,
        _output: OutputFormat,
        _config: &ConvertConfig,
        relay: &ProgressRelay,
    ) -> Result<ConvertedDocument, RelayError> {
        let name = input.file_name().unwrap().to_string_lossy().into_owned();
        if name.contains("fail") {
            return Err(RelayError::EngineFailed {
                status: "exit status: 1".into(),
                stderr_tail: "synthetic engine failure".into(),
            });
        }
        // Behave like the real engine's log stream.
        relay.observe_line("Finished converting pages 2/2 time=0.01");
        Ok(ConvertedDocument {
            content: format!("# Converted {name}\n\nbody text\n"),
            pages: 2,
        })
    }
}

fn app() -> Router {
    let state = AppState::with_converter(Arc::new(StubConverter), ConvertConfig::default());
    router(state, DEFAULT_BODY_LIMIT)
}

// ── Multipart helpers ────────────────────────────────────────────────────

const BOUNDARY: &str = "------docrelay-test-boundary";

enum Part<'a> {
    File { filename: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
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

fn convert_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json_of(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_the_embedded_page() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("/api/convert"));
}

#[tokio::test]
async fn formats_lists_the_supported_table() {
    let response = app()
        .oneshot(Request::get("/api/formats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_of(response).await;
    let entries = json.as_array().unwrap();
    let labels: Vec<&str> = entries.iter().map(|e| e["label"].as_str().unwrap()).collect();
    assert!(labels.contains(&"PDF"));
    assert!(labels.contains(&"Word"));
    assert!(labels.contains(&"VTT"));
    assert!(labels.contains(&"JSON"));

    let group_of = |label: &str| {
        entries
            .iter()
            .find(|e| e["label"] == label)
            .unwrap()["group"]
            .as_str()
            .unwrap()
            .to_string()
    };
    assert_eq!(group_of("PDF"), "Documents");
    assert_eq!(group_of("Image"), "Images");
    assert_eq!(group_of("Audio/Video"), "Audio & Video");
    assert_eq!(group_of("VTT"), "Other");
    assert_eq!(group_of("JSON"), "Other");
}

#[tokio::test]
async fn progress_is_idle_between_batches() {
    let response = app()
        .oneshot(Request::get("/api/progress").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = json_of(response).await;
    assert_eq!(json["active"], false);
    assert_eq!(json["total_files"], 0);
}

#[tokio::test]
async fn convert_reports_per_file_results() {
    let response = app()
        .oneshot(convert_request(&[
            Part::File { filename: "a.pdf", bytes: b"%PDF-1.4" },
            Part::File { filename: "fail.docx", bytes: b"PK" },
            Part::Text { name: "output_format", value: "markdown" },
            Part::Text { name: "ocr", value: "true" },
            Part::Text { name: "table_structure", value: "false" },
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_of(response).await;

    assert_eq!(json["total"], 2);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["failed"], 1);
    assert!(json["batch_id"].is_string());
    assert!(json["archive_url"].is_string());

    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["filename"], "a.pdf");
    assert_eq!(results[0]["output_name"], "a.md");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["pages"], 2);
    assert!(results[0]["preview"].as_str().unwrap().contains("Converted a.pdf"));
    assert!(results[0]["download_url"].as_str().unwrap().ends_with("/files/0/download"));

    assert_eq!(results[1]["success"], false);
    assert!(results[1]["message"]
        .as_str()
        .unwrap()
        .contains("synthetic engine failure"));
    assert!(results[1].get("download_url").is_none());
}

#[tokio::test]
async fn convert_without_files_is_a_bad_request() {
    let response = app()
        .oneshot(convert_request(&[Part::Text {
            name: "output_format",
            value: "markdown",
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_of(response).await;
    assert!(json["error"].as_str().unwrap().contains("no files"));
}

#[tokio::test]
async fn convert_rejects_unknown_output_format() {
    let response = app()
        .oneshot(convert_request(&[
            Part::File { filename: "a.pdf", bytes: b"%PDF" },
            Part::Text { name: "output_format", value: "docx" },
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_body_equals_result_content() {
    let app = app();

    let response = app
        .clone()
        .oneshot(convert_request(&[
            Part::File { filename: "report.pdf", bytes: b"%PDF" },
            Part::Text { name: "output_format", value: "html" },
        ]))
        .await
        .unwrap();
    let json = json_of(response).await;
    let url = json["results"][0]["download_url"].as_str().unwrap().to_string();

    let response = app
        .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("report.html"));
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, "# Converted report.pdf\n\nbody text\n");
}

#[tokio::test]
async fn archive_contains_exactly_the_successes() {
    let app = app();

    let response = app
        .clone()
        .oneshot(convert_request(&[
            Part::File { filename: "a.pdf", bytes: b"%PDF" },
            Part::File { filename: "fail.pdf", bytes: b"%PDF" },
            Part::File { filename: "b.md", bytes: b"# hi" },
        ]))
        .await
        .unwrap();
    let json = json_of(response).await;
    let url = json["archive_url"].as_str().unwrap().to_string();

    let response = app
        .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.md".to_string(), "b.md".to_string()]);

    let mut content = String::new();
    archive.by_name("a.md").unwrap().read_to_string(&mut content).unwrap();
    assert_eq!(content, "# Converted a.pdf\n\nbody text\n");
}

#[tokio::test]
async fn failed_file_download_is_not_found() {
    let app = app();

    let response = app
        .clone()
        .oneshot(convert_request(&[Part::File {
            filename: "fail.pdf",
            bytes: b"%PDF",
        }]))
        .await
        .unwrap();
    let json = json_of(response).await;
    let batch_id = json["batch_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::get(format!("/api/batches/{batch_id}/files/0/download"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_batch_is_not_found() {
    let id = uuid::Uuid::new_v4();
    for uri in [
        format!("/api/batches/{id}/archive"),
        format!("/api/batches/{id}/files/0/download"),
    ] {
        let response = app()
            .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn unsupported_upload_fails_that_file_only() {
    let response = app()
        .oneshot(convert_request(&[
            Part::File { filename: "weird.xyz", bytes: b"???" },
            Part::File { filename: "ok.csv", bytes: b"a,b" },
        ]))
        .await
        .unwrap();
    let json = json_of(response).await;
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["failed"], 1);
    assert!(json["results"][0]["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported file format"));
    assert_eq!(json["results"][1]["success"], true);
}

#[tokio::test]
async fn transcript_and_json_uploads_are_accepted() {
    let response = app()
        .oneshot(convert_request(&[
            Part::File { filename: "captions.vtt", bytes: b"WEBVTT\n" },
            Part::File { filename: "export.json", bytes: b"{}" },
        ]))
        .await
        .unwrap();
    let json = json_of(response).await;
    assert_eq!(json["succeeded"], 2);
    assert_eq!(json["failed"], 0);
}

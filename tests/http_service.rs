//! `ClovaHttpService` against a local one-shot HTTP server.
//!
//! The server accepts a single connection, captures the raw request and
//! answers with a fixed status and body, which is enough to check the wire
//! format (secret header, multipart parts) and the error mapping.

use clova_ocr::pipeline::request::build_request;
use clova_ocr::{ClovaHttpService, ClovaOcrError, OcrClient, OcrService};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const OK_BODY: &str = r#"{"version":"V2","requestId":"r","timestamp":1,
  "images":[{"inferResult":"SUCCESS","fields":[
    {"inferText":"hello","inferConfidence":0.98,"type":"NORMAL","lineBreak":true}]}]}"#;

/// Serve one request; the handle resolves to the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/general", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }

        let reply = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).into_owned()
    });

    (url, handle)
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let body_len = buf.len() - header_end - 4;

    if let Some(len) = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
    {
        return body_len >= len;
    }
    if head.contains("transfer-encoding: chunked") {
        return buf.ends_with(b"0\r\n\r\n");
    }
    true
}

fn scan_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("scan.png");
    std::fs::write(&path, b"\x89PNG fake bytes").unwrap();
    path
}

#[tokio::test]
async fn sends_secret_header_and_multipart_parts() {
    let (url, server) = serve_once("200 OK", OK_BODY).await;
    let dir = TempDir::new().unwrap();
    let path = scan_file(&dir);

    let service = ClovaHttpService::new(&url, "secret-123", 5).unwrap();
    let request = build_request(&path, "ja", true).await.unwrap();
    let response = service.recognize(request).await.unwrap();

    assert_eq!(response.page_count(), 1);
    assert_eq!(response.images[0].fields[0].infer_text, "hello");
    let served: serde_json::Value = serde_json::from_str(OK_BODY).unwrap();
    assert_eq!(response.raw.as_deref(), Some(&served));

    let raw = server.await.unwrap();
    let lower = raw.to_lowercase();
    assert!(lower.starts_with("post /general "), "got: {raw}");
    assert!(lower.contains("x-ocr-secret: secret-123"));
    assert!(lower.contains("content-type: multipart/form-data; boundary="));
    assert!(raw.contains(r#"name="message""#));
    assert!(raw.contains(r#"name="file"; filename="scan.png""#));
    assert!(raw.contains(r#""version":"V2""#));
    assert!(raw.contains(r#""lang":"ja""#));
    assert!(raw.contains(r#""enableTableDetection":true"#));
    assert!(raw.contains(r#""images":[{"format":"png","name":"scan"}]"#));
    assert!(raw.contains("PNG fake bytes"));
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let (url, server) = serve_once("401 Unauthorized", r#"{"code":"0002","message":"bad secret"}"#).await;
    let dir = TempDir::new().unwrap();
    let path = scan_file(&dir);

    let service = ClovaHttpService::new(&url, "wrong", 5).unwrap();
    let request = build_request(&path, "ko", false).await.unwrap();
    let err = service.recognize(request).await.unwrap_err();
    server.await.unwrap();

    match err {
        ClovaOcrError::ApiError { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("bad secret"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_body_is_an_invalid_response() {
    let (url, server) = serve_once("200 OK", "<html>gateway</html>").await;
    let dir = TempDir::new().unwrap();
    let path = scan_file(&dir);

    let service = ClovaHttpService::new(&url, "k", 5).unwrap();
    let request = build_request(&path, "ko", false).await.unwrap();
    let err = service.recognize(request).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ClovaOcrError::InvalidResponse { .. }));
}

#[tokio::test]
async fn failed_request_is_not_cached() {
    let (url, server) = serve_once("500 Internal Server Error", "boom").await;
    let dir = TempDir::new().unwrap();
    let path = scan_file(&dir);

    let service: Arc<dyn OcrService> = Arc::new(ClovaHttpService::new(&url, "k", 5).unwrap());
    let mut client = OcrClient::with_service(service);
    let err = client.ocr_from_file(&path, "ko", false).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ClovaOcrError::ApiError { status: 500, .. }));
    assert!(client.cache().is_empty());
}

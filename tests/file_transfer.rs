//! File upload and download through the helper.

mod common;

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::Level;
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use maxemail::{Client, Credentials, DownloadOptions, DownloadType, ErrorKind};
use common::{client_for, RecordingLogger};

const CSV: &[u8] = b"email,name\r\nrecipient@example.com,Recipient\r\n";
const LATIN1_CSV: &[u8] = b"email,name\r\njose@example.com,Jos\xe9\r\n";
const PDF: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

async fn serve_download(server: &MockServer, url_path: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .and(header("Accept", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(server)
        .await;
}

fn dir_entries(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn in_dir(dir: &TempDir) -> DownloadOptions {
    DownloadOptions::default().with_dir(dir.path())
}

#[tokio::test]
async fn test_upload_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("recipients.csv");
    std::fs::write(&file, CSV).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/json/file_upload"))
        .and(body_string("method=initialise"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"key":"abc123"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/json/file_upload"))
        .and(body_string_contains("filename=\"recipients.csv\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let logger = RecordingLogger::new();
    client.set_logger(logger.clone());

    let key = client.helper().unwrap().upload_file(&file).await.unwrap();
    assert_eq!(key, "abc123");

    let requests = server.received_requests().await.unwrap();
    let upload = &requests[1];
    let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"method\"\r\n\r\nhandle"), "{body}");
    assert!(body.contains("name=\"key\"\r\n\r\nabc123"), "{body}");
    assert!(body.contains("recipient@example.com,Recipient"), "{body}");

    let entries = logger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, Level::DEBUG);
    assert_eq!(entries[0].message, "Upload file: abc123");
    assert_eq!(entries[1].message, "Upload complete: abc123");
    assert_eq!(
        entries[0].context[0],
        ("fileKey".to_string(), "abc123".to_string())
    );
}

#[tokio::test]
async fn test_upload_unreadable_path() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");

    let client = client_for(&server);
    let err = client.helper().unwrap().upload_file(&missing).await.unwrap_err();

    match err.kind {
        ErrorKind::InvalidArgument(message) => {
            assert!(message.starts_with("File path is not readable: "), "{message}");
        }
        other => panic!("expected invalid argument, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());

    // A directory is not a readable file either.
    let err = client.helper().unwrap().upload_file(dir.path()).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidArgument(_)));
}

#[tokio::test]
async fn test_upload_without_key_is_unexpected_value() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("recipients.csv");
    std::fs::write(&file, CSV).unwrap();

    Mock::given(body_string("method=initialise"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1}"#))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.helper().unwrap().upload_file(&file).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedValue(_)));
}

#[tokio::test]
async fn test_download_csv() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_download(&server, "/download/file/key/abc123", CSV.to_vec()).await;

    let client = client_for(&server);
    let logger = RecordingLogger::new();
    client.set_logger(logger.clone());

    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::File, "abc123", in_dir(&dir))
        .await
        .unwrap();

    assert_eq!(downloaded.parent(), Some(dir.path()));
    let name = downloaded.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("mxm-file-abc123-"), "{name}");
    assert!(name.ends_with(".csv"), "{name}");
    assert_eq!(std::fs::read(&downloaded).unwrap(), CSV);
    assert_eq!(dir_entries(dir.path()), vec![name]);

    assert_eq!(
        logger.messages_at(Level::DEBUG),
        vec![
            "Download file 'file': abc123",
            "Download complete 'file': abc123"
        ]
    );
}

#[tokio::test]
async fn test_download_pdf() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_download(&server, "/download/file/key/report", PDF.to_vec()).await;

    let client = client_for(&server);
    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::File, "report", in_dir(&dir))
        .await
        .unwrap();

    assert_eq!(downloaded.extension().unwrap(), "pdf");
    assert_eq!(std::fs::read(&downloaded).unwrap(), PDF);
}

#[tokio::test]
async fn test_download_zip_extracts_single_csv() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_download(
        &server,
        "/download/listexport/id/123",
        zip_bytes(&[("export.csv", CSV)]),
    )
    .await;

    let client = client_for(&server);
    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::ListExport, 123, in_dir(&dir))
        .await
        .unwrap();

    let name = downloaded.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("mxm-listexport-123-"), "{name}");
    assert!(name.ends_with(".csv"), "{name}");
    assert_eq!(std::fs::read(&downloaded).unwrap(), CSV);
    // Archive removed once extracted
    assert_eq!(dir_entries(dir.path()), vec![name]);
}

#[tokio::test]
async fn test_download_zip_without_extraction() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let archive = zip_bytes(&[("export.csv", CSV)]);
    serve_download(&server, "/download/dataexport/id/77", archive.clone()).await;

    let client = client_for(&server);
    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::DataExport, 77, in_dir(&dir).with_extract(false))
        .await
        .unwrap();

    assert_eq!(downloaded.extension().unwrap(), "zip");
    assert_eq!(std::fs::read(&downloaded).unwrap(), archive);
}

#[tokio::test]
async fn test_download_zip_with_several_entries_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_download(
        &server,
        "/download/dataexport/id/9",
        zip_bytes(&[("a.csv", CSV), ("b.csv", CSV)]),
    )
    .await;

    let client = client_for(&server);
    let err = client
        .helper()
        .unwrap()
        .download_file(DownloadType::DataExport, 9, in_dir(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Runtime(_)));
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_download_binary_keeps_name() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec();
    serve_download(&server, "/download/file/key/logo", png.clone()).await;

    let client = client_for(&server);
    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::File, "logo", in_dir(&dir))
        .await
        .unwrap();

    assert!(downloaded.extension().is_none());
    assert_eq!(std::fs::read(&downloaded).unwrap(), png);
}

#[tokio::test]
async fn test_download_latin1_csv() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_download(&server, "/download/listexport/id/5", LATIN1_CSV.to_vec()).await;

    let client = client_for(&server);
    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::ListExport, 5, in_dir(&dir))
        .await
        .unwrap();

    assert_eq!(downloaded.extension().unwrap(), "csv");
    assert_eq!(std::fs::read(&downloaded).unwrap(), LATIN1_CSV);
}

#[tokio::test]
async fn test_download_html_page_keeps_name() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let page = b"<!DOCTYPE html>\n<html><body>Maintenance</body></html>\n".to_vec();
    serve_download(&server, "/download/file/key/page", page.clone()).await;

    let client = client_for(&server);
    let downloaded = client
        .helper()
        .unwrap()
        .download_file(DownloadType::File, "page", in_dir(&dir))
        .await
        .unwrap();

    assert!(downloaded.extension().is_none());
    assert_eq!(std::fs::read(&downloaded).unwrap(), page);
}

#[tokio::test]
async fn test_download_into_missing_dir() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("not-there");

    let client = client_for(&server);
    let err = client
        .helper()
        .unwrap()
        .download_file(
            DownloadType::File,
            "abc",
            DownloadOptions::default().with_dir(&missing),
        )
        .await
        .unwrap_err();

    match err.kind {
        ErrorKind::Runtime(message) => {
            assert!(message.starts_with("Unable to open local file: "), "{message}");
        }
        other => panic!("expected runtime error, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!missing.exists());
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_truncated_download_removes_temp_file() {
    // Announces more body than it sends, then hangs up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8192];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  Content-Type: text/csv\r\n\
                  Content-Length: 4096\r\n\
                  \r\n\
                  email,name\r\nrecipient@example.com,Recipient\r\n",
            )
            .await;
        let _ = socket.shutdown().await;
    });

    let dir = TempDir::new().unwrap();
    let client = Client::builder()
        .credentials(Credentials::token("apitoken"))
        .uri(format!("http://{}", addr))
        .build()
        .unwrap();

    let result = client
        .helper()
        .unwrap()
        .download_file(DownloadType::File, "cut", in_dir(&dir))
        .await;

    assert!(result.is_err(), "{result:?}");
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_failed_download_removes_temp_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/download/file/key/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .helper()
        .unwrap()
        .download_file(DownloadType::File, "gone", in_dir(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Http { status: 404, .. }));
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_unknown_download_type() {
    let err = "report".parse::<DownloadType>().unwrap_err();
    match err.kind {
        ErrorKind::InvalidArgument(message) => {
            assert_eq!(message, "Invalid download type specified")
        }
        other => panic!("expected invalid argument, got {other:?}"),
    }
}

#[tokio::test]
async fn test_log_level_is_configurable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_download(&server, "/download/file/key/abc", CSV.to_vec()).await;

    let client = client_for(&server);
    let logger = RecordingLogger::new();
    client.set_logger(logger.clone());

    let helper = client.helper().unwrap();
    helper.set_log_level(Level::INFO);
    helper
        .download_file(DownloadType::File, "abc", in_dir(&dir))
        .await
        .unwrap();

    assert_eq!(logger.messages_at(Level::INFO).len(), 2);
    assert!(logger.messages_at(Level::DEBUG).is_empty());
}

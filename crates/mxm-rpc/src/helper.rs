//! File upload and download helpers.
//!
//! Uploads go through the `file_upload` service: an `initialise` call hands out
//! a file key, then the file is posted as multipart under that key. Downloads
//! stream `/download/<type>/<param>/<id>` into a temp file, which is renamed
//! (or unzipped) according to its sniffed content.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tempfile::TempPath;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tracing::{instrument, Level};

use maxemail_client::{Error, ErrorKind, LogContext, LoggerHandle, MxmHttpClient, Result};

use crate::service::Service;

const WRITE_BUFFER: usize = 101_400;
const SNIFF_LEN: u64 = 8192;

/// Kind of downloadable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadType {
    /// Stored file, addressed by key.
    File,
    ListExport,
    DataExport,
}

impl DownloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadType::File => "file",
            DownloadType::ListExport => "listexport",
            DownloadType::DataExport => "dataexport",
        }
    }

    /// Name of the identifying path segment.
    pub fn primary_param(&self) -> &'static str {
        match self {
            DownloadType::File => "key",
            DownloadType::ListExport | DownloadType::DataExport => "id",
        }
    }
}

impl fmt::Display for DownloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(DownloadType::File),
            "listexport" => Ok(DownloadType::ListExport),
            "dataexport" => Ok(DownloadType::DataExport),
            _ => Err(Error::invalid_argument("Invalid download type specified")),
        }
    }
}

/// Options for [`FileTransfer::download_file`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Target directory, default the system temp dir.
    pub dir: Option<PathBuf>,
    /// Unzip compressed downloads, default true.
    pub extract: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            dir: None,
            extract: true,
        }
    }
}

impl DownloadOptions {
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_extract(mut self, extract: bool) -> Self {
        self.extract = extract;
        self
    }
}

/// Content kinds recognised from a file's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sniffed {
    Zip,
    Pdf,
    /// Plain text in any 8-bit encoding (UTF-8, Latin-1, Windows-1252).
    Text,
    /// Textual but clearly not a data export: JSON, HTML, XML.
    Structured,
    Empty,
    Binary,
}

const STRUCTURED_PREFIXES: [&[u8]; 5] = [b"{", b"[", b"<?xml", b"<!doctype", b"<html"];

fn sniff(head: &[u8]) -> Sniffed {
    if head.is_empty() {
        return Sniffed::Empty;
    }
    if head.starts_with(b"PK\x03\x04") || head.starts_with(b"PK\x05\x06") {
        return Sniffed::Zip;
    }
    if head.starts_with(b"%PDF-") {
        return Sniffed::Pdf;
    }

    // High-bit bytes are fine; NUL and other control bytes are not.
    let textual = head
        .iter()
        .all(|b| !b.is_ascii_control() || matches!(b, b'\t' | b'\n' | b'\r' | 0x0c));
    if !textual {
        return Sniffed::Binary;
    }

    let start = head.trim_ascii_start();
    let structured = STRUCTURED_PREFIXES.iter().any(|prefix| {
        start
            .get(..prefix.len())
            .is_some_and(|lead| lead.eq_ignore_ascii_case(prefix))
    });
    if structured {
        Sniffed::Structured
    } else {
        Sniffed::Text
    }
}

fn runtime(message: String, source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::with_source(ErrorKind::Runtime(message), source)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Upload and download of files.
///
/// Obtained from [`Client::helper`](crate::Client::helper).
#[derive(Debug)]
pub struct FileTransfer {
    http: Arc<MxmHttpClient>,
    file_upload: Arc<Service>,
    logger: LoggerHandle,
    log_level: RwLock<Level>,
}

impl FileTransfer {
    pub(crate) fn new(http: Arc<MxmHttpClient>, file_upload: Arc<Service>, logger: LoggerHandle) -> Self {
        Self {
            http,
            file_upload,
            logger,
            log_level: RwLock::new(Level::DEBUG),
        }
    }

    /// Level of the helper's progress messages (default debug).
    pub fn set_log_level(&self, level: Level) -> &Self {
        *self.log_level.write().unwrap_or_else(PoisonError::into_inner) = level;
        self
    }

    fn log(&self, message: &str, context: LogContext<'_>) {
        let level = *self.log_level.read().unwrap_or_else(PoisonError::into_inner);
        self.logger.get().log(level, message, context);
    }

    /// Upload a local file, returning the key to reference it in other calls
    /// (list import, email content, ...).
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let readable = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !readable {
            return Err(Error::invalid_argument(format!(
                "File path is not readable: {}",
                display
            )));
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| runtime(format!("Unable to open local file: {}", e), e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| runtime(format!("Unable to open local file: {}", e), e))?
            .len();

        let initialised = self.file_upload.invoke("initialise", &[]).await?;
        let key = initialised
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::new(ErrorKind::UnexpectedValue(format!(
                    "file_upload.initialise returned no key: {}",
                    initialised
                )))
            })?
            .to_string();

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let form = Form::new()
            .text("method", "handle")
            .text("key", key.clone())
            .part(
                "file",
                Part::stream_with_length(reqwest::Body::from(file), length).file_name(file_name),
            );

        let context = [("fileKey", key.as_str()), ("path", display.as_str())];
        self.log(&format!("Upload file: {}", key), &context);

        let request = self.http.post(self.file_upload.name()).multipart(form);
        self.http.execute(request).await?;

        self.log(&format!("Upload complete: {}", key), &context);
        Ok(key)
    }

    /// Download a file or export into `options.dir`, returning its path.
    ///
    /// The extension is chosen from the content: `.csv` for text (including
    /// unzipped archives), `.pdf`, or `.zip` when extraction is disabled.
    /// JSON, HTML and unrecognised binary content keep the bare temp name.
    #[instrument(skip(self, download_type, primary_id, options), fields(download_type = %download_type))]
    pub async fn download_file(
        &self,
        download_type: DownloadType,
        primary_id: impl fmt::Display,
        options: DownloadOptions,
    ) -> Result<PathBuf> {
        let id = primary_id.to_string();
        let dir = options.dir.clone().unwrap_or_else(std::env::temp_dir);

        let (file, temp_path) = tempfile::Builder::new()
            .prefix(&format!("mxm-{}-{}-", download_type, id))
            .tempfile_in(&dir)
            .map_err(|e| runtime(format!("Unable to open local file: {}", e), e))?
            .into_parts();

        let path_display = temp_path.display().to_string();
        let type_name = download_type.as_str();
        let context = [
            ("type", type_name),
            ("primaryId", id.as_str()),
            ("path", path_display.as_str()),
        ];
        self.log(&format!("Download file '{}': {}", download_type, id), &context);

        let request = self
            .http
            .get(format!(
                "/download/{}/{}/{}",
                download_type,
                download_type.primary_param(),
                urlencoding::encode(&id)
            ))
            .accept("*");
        let mut response = self.http.execute(request).await?;

        let mut writer = BufWriter::with_capacity(WRITE_BUFFER, tokio::fs::File::from_std(file));
        while let Some(chunk) = response.chunk().await? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| runtime(format!("Unable to write to local file: {}", e), e))?;
        }
        writer
            .flush()
            .await
            .map_err(|e| runtime(format!("Unable to write to local file: {}", e), e))?;
        drop(writer);

        self.log(&format!("Download complete '{}': {}", download_type, id), &context);

        let kind = match read_head(&temp_path).await {
            Ok(head) => sniff(&head),
            Err(e) => return Err(runtime("MIME type could not be determined".to_string(), e)),
        };

        match kind {
            Sniffed::Zip if options.extract => extract_single(temp_path).await,
            Sniffed::Zip => persist(temp_path, ".zip"),
            Sniffed::Pdf => persist(temp_path, ".pdf"),
            Sniffed::Text => persist(temp_path, ".csv"),
            Sniffed::Structured | Sniffed::Empty | Sniffed::Binary => temp_path
                .keep()
                .map_err(|e| runtime(format!("Unable to keep local file: {}", e.error), e)),
        }
    }
}

async fn read_head(path: &Path) -> io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN).read_to_end(&mut head).await?;
    Ok(head)
}

fn persist(temp_path: TempPath, suffix: &str) -> Result<PathBuf> {
    let target = with_suffix(&temp_path, suffix);
    temp_path
        .persist(&target)
        .map_err(|e| runtime(format!("Unable to rename local file: {}", e.error), e))?;
    Ok(target)
}

/// Unpack the only entry of `archive` to `<archive>.csv`; the archive is removed.
async fn extract_single(archive: TempPath) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        let target = with_suffix(&archive, ".csv");
        let dir = archive.parent().unwrap_or_else(|| Path::new("."));

        let file = std::fs::File::open(&archive)
            .map_err(|e| runtime(format!("Unable to open local file: {}", e), e))?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| runtime(format!("Unable to read archive: {}", e), e))?;
        if zip.len() != 1 {
            return Err(Error::runtime(format!(
                "Expected exactly one file in archive, found {}",
                zip.len()
            )));
        }

        let mut entry = zip
            .by_index(0)
            .map_err(|e| runtime(format!("Unable to read archive: {}", e), e))?;
        let mut extracted = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| runtime(format!("Unable to open local file: {}", e), e))?;
        copy(&mut entry, extracted.as_file_mut())?;
        extracted
            .persist(&target)
            .map_err(|e| runtime(format!("Unable to rename local file: {}", e.error), e))?;

        Ok(target)
    })
    .await
    .map_err(|e| runtime(format!("Archive extraction failed: {}", e), e))?
}

fn copy(reader: &mut impl Read, writer: &mut std::fs::File) -> Result<()> {
    io::copy(reader, writer)
        .map(|_| ())
        .map_err(|e| runtime(format!("Unable to write to local file: {}", e), e))
}

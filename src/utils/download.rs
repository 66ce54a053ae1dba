use crate::error::InstallError;
use crate::options::verbose;
use crate::utils::report::Reporter;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, ClientBuilder};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

pub const CHUNK_SIZE: usize = 1024;

/// Blocking clients default to a 30s timeout; the archive download has none.
pub fn client_builder() -> ClientBuilder {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(None)
}

pub fn http_client() -> Result<Client> {
    client_builder()
        .build()
        .context("Failed to build HTTP client")
}

/// Streams `url` into `dest_path`, reporting progress per chunk. Returns the
/// number of bytes written. A non-success status leaves `dest_path` untouched.
pub fn download_file(
    client: &Client,
    url: &str,
    dest_path: &Path,
    reporter: &dyn Reporter,
) -> Result<u64> {
    reporter.info(&format!("Downloading from {}", url));

    let mut resp = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to send request to {}", url))?;

    let status = resp.status();
    verbose::log(&format!("GET {} -> {}", url, status));
    if !status.is_success() {
        return Err(InstallError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let total_size = resp.content_length().unwrap_or(0);

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut file = File::create(dest_path)
        .with_context(|| format!("Failed to create {}", dest_path.display()))?;

    reporter.begin_transfer(total_size);
    let copied = copy_chunked(&mut resp, &mut file, reporter);
    reporter.finish_transfer();
    let written = copied.with_context(|| format!("Download of {} interrupted", url))?;

    verbose::log(&format!(
        "Wrote {} bytes to {} (expected {})",
        written,
        dest_path.display(),
        total_size
    ));
    Ok(written)
}

fn copy_chunked(
    reader: &mut impl Read,
    writer: &mut impl Write,
    reporter: &dyn Reporter,
) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        written += n as u64;
        reporter.advance(n as u64);
    }

    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{http_client, serve_once, serve_with_stall, RecordingReporter};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn writes_exact_body_and_reports_progress() {
        let body: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let url = serve_once("200 OK", body.clone(), true);
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested").join("spark.tgz");
        let reporter = RecordingReporter::default();

        let written = download_file(&http_client(), &url, &dest, &reporter).unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), body);
        assert_eq!(reporter.total.get(), Some(body.len() as u64));
        assert_eq!(reporter.transferred.get(), body.len() as u64);
        assert!(reporter.finished.get());
    }

    #[test]
    fn missing_content_length_is_indeterminate() {
        let body = b"no length header here".to_vec();
        let url = serve_once("200 OK", body.clone(), false);
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("spark.tgz");
        let reporter = RecordingReporter::default();

        download_file(&http_client(), &url, &dest, &reporter).unwrap();

        assert_eq!(reporter.total.get(), Some(0));
        assert_eq!(reporter.transferred.get(), body.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn survives_a_stall_longer_than_thirty_seconds() {
        let body = b"spark-archive-bytes".to_vec();
        let url = serve_with_stall(body.clone(), 6, Duration::from_secs(32));
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("spark.tgz");
        let reporter = RecordingReporter::default();

        let written = download_file(&http_client(), &url, &dest, &reporter).unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn error_status_fails_without_creating_file() {
        let url = serve_once("404 Not Found", b"gone".to_vec(), true);
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("spark.tgz");
        let reporter = RecordingReporter::default();

        let err = download_file(&http_client(), &url, &dest, &reporter).unwrap_err();

        match err.downcast_ref::<InstallError>() {
            Some(InstallError::HttpStatus { status, .. }) => assert_eq!(*status, 404),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dest.exists());
        assert_eq!(reporter.total.get(), None);
    }

    #[test]
    fn copies_in_fixed_chunks() {
        struct Chunks(std::cell::RefCell<Vec<u64>>);
        impl Reporter for Chunks {
            fn log(&self, _: crate::utils::report::Level, _: &str) {}
            fn advance(&self, bytes: u64) {
                self.0.borrow_mut().push(bytes);
            }
        }

        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut out = Vec::new();
        let reporter = Chunks(Default::default());
        let n = copy_chunked(&mut data.as_slice(), &mut out, &reporter).unwrap();

        assert_eq!(n, data.len() as u64);
        assert_eq!(out, data);
        assert_eq!(*reporter.0.borrow(), vec![1024, 1024, 10]);
    }
}

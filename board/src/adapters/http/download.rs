//! Download navigator
//!
//! A terminal has nowhere to "navigate" to, so downloads are fetched and
//! saved into a directory under the name the backend suggests. Existing
//! files are never overwritten; a numbered name is picked instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;

use super::client::api_error;
use crate::domain::ports::Navigator;
use crate::error::BackendError;

const FALLBACK_NAME: &str = "download.csv";

pub struct FileDownloader {
    http: Client,
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            http: Client::new(),
            dir: dir.into(),
        }
    }
}

/// `filename="x.csv"` (or bare `filename=x.csv`) from a Content-Disposition value
fn disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Name derived from the URL: path segments other than `api`/`download`,
/// then the query values, joined with `_`. Per-feed and date-range exports
/// thus get distinct names.
fn url_filename(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = rest.split('#').next().unwrap_or(rest);
    let (location, query) = rest.split_once('?').unwrap_or((rest, ""));
    let path = location.split_once('/').map_or("", |(_, path)| path);

    let mut parts: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "api" && *segment != "download")
        .map(str::to_string)
        .collect();
    parts.extend(
        query
            .split('&')
            .filter_map(|pair| pair.split_once('=').map(|(_, value)| value))
            .filter(|value| !value.is_empty())
            .map(|value| {
                urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string())
            }),
    );

    if parts.is_empty() {
        None
    } else {
        Some(format!("{}.csv", parts.join("_")))
    }
}

/// `dir/name`, or `dir/stem-N.ext` with the first free N when taken
async fn unused_path(dir: &Path, name: &str) -> Result<PathBuf, BackendError> {
    let path = dir.join(name);
    if !tokio::fs::try_exists(&path).await? {
        return Ok(path);
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 1;
    loop {
        let numbered = match ext {
            Some(ext) => format!("{}-{}.{}", stem, n, ext),
            None => format!("{}-{}", stem, n),
        };
        let path = dir.join(numbered);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }
        n += 1;
    }
}

/// Keep only a plain file name: no directories, no control characters
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').trim();

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl Navigator for FileDownloader {
    async fn navigate(&self, url: &str) -> Result<String, BackendError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), resp).await);
        }

        let name = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .or_else(|| url_filename(url))
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        let body = resp.bytes().await?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = unused_path(&self.dir, &sanitize(&name)).await?;
        tokio::fs::write(&path, &body).await?;

        tracing::info!(path = %path.display(), bytes = body.len(), "Saved download");
        Ok(path.display().to_string())
    }
}

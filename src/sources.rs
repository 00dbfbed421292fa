//! Record sources: the polygon document and the status sheet.
//!
//! Each source is a local path or an `http(s)://` URL. The two are fetched
//! concurrently and fail independently; a failed source is logged and treated
//! as empty so the other one still renders.

use std::path::PathBuf;

use overlay::records::{RawPolygon, SheetColumns, StatusMap, parse_polygon_document, parse_status_sheet};

use crate::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Fetch a source's body as text.
pub async fn fetch_text(client: &reqwest::Client, source: &Source) -> Result<String, CliError> {
    match source {
        Source::Path(path) => {
            tokio::fs::read_to_string(path).await.map_err(|source| CliError::Io { path: path.clone(), source })
        }
        Source::Url(url) => {
            let resp = client.get(url).send().await?.error_for_status()?;
            Ok(resp.text().await?)
        }
    }
}

pub async fn fetch_polygons(client: &reqwest::Client, source: &Source) -> Result<Vec<RawPolygon>, CliError> {
    let text = fetch_text(client, source).await?;
    Ok(parse_polygon_document(&text)?)
}

pub async fn fetch_statuses(
    client: &reqwest::Client,
    source: &Source,
    columns: &SheetColumns,
) -> Result<StatusMap, CliError> {
    let text = fetch_text(client, source).await?;
    Ok(parse_status_sheet(&text, columns)?)
}

/// Polygons, or an empty list when the source is unavailable.
pub async fn load_polygons(client: &reqwest::Client, source: &Source) -> Vec<RawPolygon> {
    match fetch_polygons(client, source).await {
        Ok(polygons) => polygons,
        Err(e) => {
            tracing::warn!(%source, error = %e, "polygon source unavailable; overlay will be empty");
            Vec::new()
        }
    }
}

/// Status rows, or an empty map when the source is unavailable.
pub async fn load_statuses(client: &reqwest::Client, source: &Source, columns: &SheetColumns) -> StatusMap {
    match fetch_statuses(client, source, columns).await {
        Ok(statuses) => statuses,
        Err(e) => {
            tracing::warn!(%source, error = %e, "status source unavailable; shapes render as unknown");
            StatusMap::new()
        }
    }
}

/// Load both sources concurrently.
pub async fn load_records(
    client: &reqwest::Client,
    polygons: &Source,
    statuses: &Source,
    columns: &SheetColumns,
) -> (Vec<RawPolygon>, StatusMap) {
    tokio::join!(load_polygons(client, polygons), load_statuses(client, statuses, columns))
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod sources_test;

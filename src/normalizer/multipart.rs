//! Multipart form and file extraction.
//!
//! # Design Decisions
//! - The stream is capped at the request body limit. Uploads share an
//!   in-memory budget; a file that would overrun it spills to an anonymous
//!   temp file instead of failing the form
//! - Files are inlined as base64 data URIs using their declared content type
//! - A repeated file field keeps only the last file read under that name.
//!   Multi-file fields are a known gap, kept pending product review.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::io;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::stream;
use multer::{Constraints, Field, Multipart, SizeLimit};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use super::extract::{extract_headers, human_bytes};
use super::snapshot::{collapse, FieldMap, FileEntry};

/// Why a body produced no form data.
#[derive(Debug, thiserror::Error)]
pub enum MultipartError {
    #[error("No Form Data Found")]
    NotMultipart,

    #[error("malformed multipart body: {0}")]
    Malformed(#[from] multer::Error),

    #[error("failed to spill upload to disk: {0}")]
    Spill(#[from] io::Error),
}

/// Values and files of a parsed multipart body.
#[derive(Debug, Default)]
pub struct MultipartData {
    pub form: FieldMap,
    pub files: BTreeMap<String, FileEntry>,
}

/// `true` when the content type announces a multipart form.
pub fn is_multipart(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

/// Parse a buffered multipart body into form values and files.
///
/// `stream_limit` bounds the whole body; `memory_limit` bounds how many
/// upload bytes are held in memory across all files.
pub async fn extract_multipart(
    content_type: Option<&str>,
    body: Bytes,
    stream_limit: u64,
    memory_limit: u64,
) -> Result<MultipartData, MultipartError> {
    let content_type = content_type.ok_or(MultipartError::NotMultipart)?;
    let boundary =
        multer::parse_boundary(content_type).map_err(|_| MultipartError::NotMultipart)?;

    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(stream_limit));
    let stream = stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let mut values = Vec::new();
    let mut files = BTreeMap::new();
    let mut budget = memory_limit;

    while let Some(mut field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        let Some(filename) = field.file_name().map(str::to_owned) else {
            match field.text().await {
                Ok(text) => values.push((name, text)),
                Err(e) => tracing::warn!(field = %name, error = %e, "Failed to read form value"),
            }
            continue;
        };

        let headers = extract_headers(field.headers());
        let declared_type = field
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();

        match read_file(&mut field, &mut budget).await {
            Ok(content) => {
                let size = content.len() as u64;
                let entry = FileEntry {
                    filename,
                    headers,
                    size,
                    human_size: human_bytes(size),
                    content: format!("data:{};base64,{}", declared_type, BASE64.encode(&content)),
                };
                files.insert(name, entry);
            }
            Err(e) => {
                tracing::warn!(
                    field = %name,
                    filename = %filename,
                    error = %e,
                    "Failed to read uploaded file"
                );
            }
        }
    }

    Ok(MultipartData {
        form: collapse(values),
        files,
    })
}

/// Read one file field. Bytes are buffered while `budget` allows; past
/// that the field continues in a temp file and releases its share of the
/// budget.
async fn read_file(field: &mut Field<'_>, budget: &mut u64) -> Result<Vec<u8>, MultipartError> {
    let mut buffered = Vec::new();
    let mut spill: Option<File> = None;

    while let Some(chunk) = field.chunk().await? {
        if let Some(file) = spill.as_mut() {
            file.write_all(&chunk).await?;
            continue;
        }

        let len = chunk.len() as u64;
        if len <= *budget {
            *budget -= len;
            buffered.extend_from_slice(&chunk);
            continue;
        }

        tracing::debug!(
            field = field.name().unwrap_or_default(),
            buffered = buffered.len(),
            "Upload exceeds memory budget, spilling to disk"
        );
        let mut file = File::from_std(tempfile::tempfile()?);
        file.write_all(&buffered).await?;
        file.write_all(&chunk).await?;
        *budget += buffered.len() as u64;
        buffered = Vec::new();
        spill = Some(file);
    }

    match spill {
        None => Ok(buffered),
        Some(mut file) => {
            file.flush().await?;
            file.rewind().await?;
            let mut content = Vec::new();
            file.read_to_end(&mut content).await?;
            Ok(content)
        }
    }
}

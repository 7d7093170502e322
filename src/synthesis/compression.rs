//! Compressed JSON representations.
//!
//! The payload is serialized straight into the codec's writer. The encoder
//! is finished even when serialization fails, so a codec never leaks a
//! half-open stream.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use serde::Serialize;

use super::{EncodeError, Representation, SynthesisError};

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 6;
const BROTLI_WINDOW: u32 = 22;
const ZSTD_BEST_LEVEL: i32 = 19;

/// Compression codecs offered by `/gzip`, `/brotli`, `/deflate` and `/zstd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Gzip,
    Brotli,
    Deflate,
    Zstd,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Gzip, Codec::Brotli, Codec::Deflate, Codec::Zstd];

    pub fn as_str(self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Brotli => "brotli",
            Codec::Deflate => "deflate",
            Codec::Zstd => "zstd",
        }
    }

    /// Value of the `Content-Encoding` response header.
    pub fn content_encoding(self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Brotli => "br",
            Codec::Deflate => "deflate",
            Codec::Zstd => "zstd",
        }
    }

    /// Boolean key added to the echoed payload.
    pub fn flag_name(self) -> &'static str {
        match self {
            Codec::Gzip => "gzipped",
            Codec::Deflate => "deflated",
            Codec::Brotli | Codec::Zstd => "compressed",
        }
    }

    fn encode<T: Serialize>(self, payload: &T) -> Result<Vec<u8>, EncodeError> {
        match self {
            Codec::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                write_then_finish(&mut encoder, payload, |e| e.try_finish())?;
                Ok(encoder.finish()?)
            }
            Codec::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
                write_then_finish(&mut encoder, payload, |e| e.try_finish())?;
                Ok(encoder.finish()?)
            }
            Codec::Brotli => {
                let mut encoder = brotli::CompressorWriter::new(
                    Vec::new(),
                    BROTLI_BUFFER,
                    BROTLI_QUALITY,
                    BROTLI_WINDOW,
                );
                write_then_finish(&mut encoder, payload, |e| e.flush())?;
                Ok(encoder.into_inner())
            }
            Codec::Zstd => {
                let mut encoder = zstd::stream::write::Encoder::new(Vec::new(), ZSTD_BEST_LEVEL)?;
                write_then_finish(&mut encoder, payload, |e| e.flush())?;
                Ok(encoder.finish()?)
            }
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Codec::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown codec: {}", s))
    }
}

/// Serialize `payload` plus a trailing newline into `writer`, then run
/// `finish` regardless of the outcome. The first error wins.
fn write_then_finish<W, T, F>(writer: &mut W, payload: &T, finish: F) -> Result<(), EncodeError>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&mut W) -> io::Result<()>,
{
    let written = serde_json::to_writer(&mut *writer, payload)
        .map_err(EncodeError::from)
        .and_then(|()| writer.write_all(b"\n").map_err(EncodeError::from));
    let finished = finish(writer).map_err(EncodeError::from);
    written.and(finished)
}

/// Serialize `payload` as JSON and compress it with `codec`.
pub fn wrap_compressed<T: Serialize>(
    codec: Codec,
    payload: &T,
) -> Result<Representation, SynthesisError> {
    let body = codec.encode(payload).map_err(|source| {
        tracing::error!(codec = %codec, error = %source, "Compressed payload failed");
        SynthesisError::Compression { codec, source }
    })?;

    Ok(Representation {
        body: body.into(),
        content_type: "application/json",
        content_encoding: Some(codec.content_encoding()),
        disposition: None,
    })
}

//! Image format table and content negotiation.

use std::fmt;

use chrono::{DateTime, Utc};

use super::image::{self as encoders, ImageSynthesizer};
use super::{EncodeError, SynthesisError};

/// Every image representation the service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Svg,
    Gif,
    Jpeg,
    Webp,
    Tiff,
    Bmp,
    Apng,
    Avif,
    Ico,
}

type EncodeFn = fn(&ImageSynthesizer, DateTime<Utc>) -> Result<Vec<u8>, EncodeError>;

/// One row of the dispatch table.
struct FormatSpec {
    /// Path segment selecting the format (`/image/<token>`).
    token: &'static str,
    /// Media type matched against `Accept` and sent as `Content-Type`.
    media_type: &'static str,
    label: &'static str,
    encode: EncodeFn,
}

static PNG: FormatSpec = FormatSpec {
    token: "png",
    media_type: "image/png",
    label: "PNG",
    encode: encoders::encode_png,
};
static SVG: FormatSpec = FormatSpec {
    token: "svg",
    media_type: "image/svg+xml",
    label: "SVG",
    encode: encoders::encode_svg,
};
static GIF: FormatSpec = FormatSpec {
    token: "gif",
    media_type: "image/gif",
    label: "GIF",
    encode: encoders::encode_gif,
};
static JPEG: FormatSpec = FormatSpec {
    token: "jpeg",
    media_type: "image/jpeg",
    label: "JPEG",
    encode: encoders::encode_jpeg,
};
static WEBP: FormatSpec = FormatSpec {
    token: "webp",
    media_type: "image/webp",
    label: "WEBP",
    encode: encoders::encode_webp,
};
static TIFF: FormatSpec = FormatSpec {
    token: "tiff",
    media_type: "image/tiff",
    label: "TIFF",
    encode: encoders::encode_tiff,
};
static BMP: FormatSpec = FormatSpec {
    token: "bmp",
    media_type: "image/bmp",
    label: "BMP",
    encode: encoders::encode_bmp,
};
static APNG: FormatSpec = FormatSpec {
    token: "apng",
    media_type: "image/apng",
    label: "APNG",
    encode: encoders::encode_apng,
};
static AVIF: FormatSpec = FormatSpec {
    token: "avif",
    media_type: "image/avif",
    label: "AVIF",
    encode: encoders::encode_avif,
};
static ICO: FormatSpec = FormatSpec {
    token: "ico",
    media_type: "image/x-icon",
    label: "ICO",
    encode: encoders::encode_ico,
};

impl ImageFormat {
    pub const ALL: [ImageFormat; 10] = [
        ImageFormat::Png,
        ImageFormat::Svg,
        ImageFormat::Gif,
        ImageFormat::Jpeg,
        ImageFormat::Webp,
        ImageFormat::Tiff,
        ImageFormat::Bmp,
        ImageFormat::Apng,
        ImageFormat::Avif,
        ImageFormat::Ico,
    ];

    /// Served whenever `Accept` names nothing we recognise.
    pub const FALLBACK: ImageFormat = ImageFormat::Png;

    fn spec(self) -> &'static FormatSpec {
        match self {
            ImageFormat::Png => &PNG,
            ImageFormat::Svg => &SVG,
            ImageFormat::Gif => &GIF,
            ImageFormat::Jpeg => &JPEG,
            ImageFormat::Webp => &WEBP,
            ImageFormat::Tiff => &TIFF,
            ImageFormat::Bmp => &BMP,
            ImageFormat::Apng => &APNG,
            ImageFormat::Avif => &AVIF,
            ImageFormat::Ico => &ICO,
        }
    }

    pub fn token(self) -> &'static str {
        self.spec().token
    }

    pub fn content_type(self) -> &'static str {
        self.spec().media_type
    }

    /// `inline; filename=image.<token>`
    pub fn disposition(self) -> String {
        format!("inline; filename=image.{}", self.token())
    }

    pub(crate) fn encoder(self) -> EncodeFn {
        self.spec().encode
    }

    /// Exact, case-sensitive match on a path token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.content_type().eq_ignore_ascii_case(media_type))
    }

    /// Pick a format from the first media type listed in `Accept`.
    pub fn from_accept(accept: Option<&str>) -> Self {
        accept
            .and_then(first_media_type)
            .and_then(Self::from_media_type)
            .unwrap_or(Self::FALLBACK)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().label)
    }
}

fn first_media_type(accept: &str) -> Option<&str> {
    let first = accept.split(',').next()?;
    let media_type = first.split(';').next()?.trim();
    (!media_type.is_empty()).then_some(media_type)
}

/// Resolve the output format for an image request.
///
/// A path token, when present, must name a known format; there is no
/// fallback for it. Without a token the `Accept` header decides, defaulting
/// to PNG.
pub fn negotiate(
    format_token: Option<&str>,
    accept: Option<&str>,
) -> Result<ImageFormat, SynthesisError> {
    match format_token.filter(|t| !t.is_empty()) {
        Some(token) => ImageFormat::from_token(token)
            .ok_or_else(|| SynthesisError::NotAcceptable(token.to_string())),
        None => Ok(ImageFormat::from_accept(accept)),
    }
}

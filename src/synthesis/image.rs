//! Per-format image encoders.
//!
//! Every raster format starts from the same [`render_canvas`] output; only
//! the background and the container differ. Animated formats stamp ten
//! consecutive seconds, one frame each.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{
    imageops::FilterType, Delay, DynamicImage, Frame, ImageFormat as RasterFormat, RgbaImage,
};

use super::avif::{AvifEncoder, CommandAvifEncoder};
use super::canvas::{render_canvas, render_svg, CanvasOptions, CANVAS_HEIGHT, CANVAS_WIDTH, WHITE};
use super::format::{negotiate, ImageFormat};
use super::{EncodeError, Representation, SynthesisError};
use crate::config::ImageConfig;

pub const ANIMATION_FRAMES: u32 = 10;
const FRAME_DELAY_MS: u32 = 100;
const GIF_SPEED: i32 = 10;
const ICO_MAX_DIMENSION: u32 = 256;

/// Renders time-stamp images in any [`ImageFormat`].
#[derive(Clone)]
pub struct ImageSynthesizer {
    avif: Arc<dyn AvifEncoder>,
    ico_source: PathBuf,
}

impl std::fmt::Debug for ImageSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSynthesizer")
            .field("ico_source", &self.ico_source)
            .finish_non_exhaustive()
    }
}

impl ImageSynthesizer {
    pub fn new(avif: Arc<dyn AvifEncoder>, ico_source: impl Into<PathBuf>) -> Self {
        Self {
            avif,
            ico_source: ico_source.into(),
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(
            Arc::new(CommandAvifEncoder::from_config(config)),
            &config.ico_source,
        )
    }

    /// Negotiate a format and render the current time in it.
    pub fn generate(
        &self,
        format_token: Option<&str>,
        accept: Option<&str>,
    ) -> Result<Representation, SynthesisError> {
        let format = negotiate(format_token, accept)?;
        self.render(format, Utc::now())
    }

    pub fn render(
        &self,
        format: ImageFormat,
        at: DateTime<Utc>,
    ) -> Result<Representation, SynthesisError> {
        let bytes = (format.encoder())(self, at).map_err(|source| {
            tracing::error!(format = %format, error = %source, "Image encoding failed");
            SynthesisError::Image { format, source }
        })?;
        Ok(Representation::image(format, bytes))
    }
}

fn write_still(image: DynamicImage, format: RasterFormat) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), format)?;
    Ok(buf)
}

fn transparent(at: DateTime<Utc>) -> DynamicImage {
    DynamicImage::ImageRgba8(render_canvas(&CanvasOptions::at(at)))
}

fn opaque(at: DateTime<Utc>) -> DynamicImage {
    let canvas = render_canvas(&CanvasOptions::at(at).on(WHITE));
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

fn frame_times(at: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> {
    (0..ANIMATION_FRAMES).map(move |i| at + TimeDelta::seconds(i64::from(i)))
}

fn animation_frames(at: DateTime<Utc>) -> Vec<RgbaImage> {
    frame_times(at)
        .map(|t| render_canvas(&CanvasOptions::at(t).on(WHITE)))
        .collect()
}

pub(crate) fn encode_png(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    write_still(transparent(at), RasterFormat::Png)
}

pub(crate) fn encode_svg(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    Ok(render_svg(at).into_bytes())
}

pub(crate) fn encode_jpeg(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    write_still(opaque(at), RasterFormat::Jpeg)
}

pub(crate) fn encode_bmp(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    write_still(opaque(at), RasterFormat::Bmp)
}

pub(crate) fn encode_webp(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    write_still(transparent(at), RasterFormat::WebP)
}

pub(crate) fn encode_tiff(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    write_still(transparent(at), RasterFormat::Tiff)
}

pub(crate) fn encode_gif(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1);
        encoder.encode_frames(
            animation_frames(at)
                .into_iter()
                .map(|canvas| Frame::from_parts(canvas, 0, 0, delay)),
        )?;
    }
    Ok(buf)
}

pub(crate) fn encode_apng(_: &ImageSynthesizer, at: DateTime<Utc>) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, CANVAS_WIDTH, CANVAS_HEIGHT);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(ANIMATION_FRAMES, 0)?;
        encoder.set_frame_delay(FRAME_DELAY_MS as u16, 1000)?;

        let mut writer = encoder.write_header()?;
        for canvas in animation_frames(at) {
            writer.write_image_data(canvas.as_raw())?;
        }
        writer.finish()?;
    }
    Ok(buf)
}

pub(crate) fn encode_avif(
    synthesizer: &ImageSynthesizer,
    at: DateTime<Utc>,
) -> Result<Vec<u8>, EncodeError> {
    let png = write_still(transparent(at), RasterFormat::Png)?;
    synthesizer.avif.encode(&png)
}

/// Re-encodes the bundled sample image; the time stamp is not drawn.
pub(crate) fn encode_ico(
    synthesizer: &ImageSynthesizer,
    _: DateTime<Utc>,
) -> Result<Vec<u8>, EncodeError> {
    let mut source = image::open(&synthesizer.ico_source)?;
    if source.width() > ICO_MAX_DIMENSION || source.height() > ICO_MAX_DIMENSION {
        source = source.resize(ICO_MAX_DIMENSION, ICO_MAX_DIMENSION, FilterType::Triangle);
    }
    write_still(DynamicImage::ImageRgba8(source.to_rgba8()), RasterFormat::Ico)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::AnimationDecoder;

    struct EchoAvif;

    impl AvifEncoder for EchoAvif {
        fn encode(&self, png: &[u8]) -> Result<Vec<u8>, EncodeError> {
            let mut out = b"AVIF".to_vec();
            out.extend_from_slice(png);
            Ok(out)
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn synthesizer() -> ImageSynthesizer {
        ImageSynthesizer::new(Arc::new(EchoAvif), "does/not/exist.png")
    }

    fn render(format: ImageFormat) -> Representation {
        synthesizer().render(format, at()).unwrap()
    }

    #[test]
    fn still_formats_carry_their_signature() {
        assert!(render(ImageFormat::Png).body.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(render(ImageFormat::Jpeg).body.starts_with(&[0xFF, 0xD8, 0xFF]));
        assert!(render(ImageFormat::Bmp).body.starts_with(b"BM"));
        assert!(render(ImageFormat::Gif).body.starts_with(b"GIF89a"));
        assert!(render(ImageFormat::Svg).body.starts_with(b"<svg"));

        let tiff = render(ImageFormat::Tiff).body;
        assert!(tiff.starts_with(b"II*\0") || tiff.starts_with(b"MM\0*"));

        let webp = render(ImageFormat::Webp).body;
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn representation_headers_follow_format() {
        let rep = render(ImageFormat::Jpeg);
        assert_eq!(rep.content_type, "image/jpeg");
        assert_eq!(rep.disposition.as_deref(), Some("inline; filename=image.jpeg"));
        assert_eq!(rep.content_encoding, None);
    }

    #[test]
    fn png_is_decodable_at_canvas_size() {
        let decoded = image::load_from_memory(&render(ImageFormat::Png).body).unwrap();
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }

    #[test]
    fn gif_has_ten_frames() {
        let body = render(ImageFormat::Gif).body;
        let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(body.to_vec())).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), ANIMATION_FRAMES as usize);
    }

    #[test]
    fn apng_declares_animation_control() {
        let body = render(ImageFormat::Apng).body;
        let decoder = png::Decoder::new(Cursor::new(body.to_vec()));
        let reader = decoder.read_info().unwrap();
        let control = reader.info().animation_control.unwrap();
        assert_eq!(control.num_frames, ANIMATION_FRAMES);
    }

    #[test]
    fn avif_goes_through_the_encoder_with_png_input() {
        let body = render(ImageFormat::Avif).body;
        assert!(body.starts_with(b"AVIF\x89PNG"));
    }

    #[test]
    fn ico_reencodes_source_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sample.png");
        RgbaImage::from_pixel(512, 300, WHITE).save(&source).unwrap();

        let synthesizer = ImageSynthesizer::new(Arc::new(EchoAvif), &source);
        let body = synthesizer.render(ImageFormat::Ico, at()).unwrap().body;
        assert_eq!(&body[0..4], &[0, 0, 1, 0]);

        let decoded = image::load_from_memory_with_format(&body, RasterFormat::Ico).unwrap();
        assert!(decoded.width() <= ICO_MAX_DIMENSION);
    }

    #[test]
    fn missing_ico_source_is_an_image_error() {
        match synthesizer().render(ImageFormat::Ico, at()) {
            Err(err @ SynthesisError::Image { .. }) => {
                assert!(err.to_string().starts_with("Failed to generate ICO: "));
            }
            other => panic!("expected image error, got {:?}", other),
        }
    }

    #[test]
    fn generate_rejects_unknown_token() {
        assert!(matches!(
            synthesizer().generate(Some("tga"), None),
            Err(SynthesisError::NotAcceptable(_))
        ));
        let rep = synthesizer().generate(None, Some("image/bmp")).unwrap();
        assert_eq!(rep.content_type, "image/bmp");
    }
}

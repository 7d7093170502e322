//! The shared time-stamp canvas every raster format is rendered from.

use chrono::{DateTime, Utc};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

pub const CANVAS_WIDTH: u32 = 300;
pub const CANVAS_HEIGHT: u32 = 70;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

const GLYPH_SIZE: u32 = 8;
const TEXT_LEFT: u32 = 100;
const TIME_BASELINE: u32 = 30;
const DATE_BASELINE: u32 = 50;

/// Canvas rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasOptions {
    /// Fill colour. Defaults to fully transparent.
    pub background: Option<Rgba<u8>>,
    /// Moment to stamp. Defaults to the current UTC time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl CanvasOptions {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            background: None,
            timestamp: Some(timestamp),
        }
    }

    pub fn on(mut self, background: Rgba<u8>) -> Self {
        self.background = Some(background);
        self
    }
}

/// `("03:04:05 PM UTC", "02 January 2006")`
pub fn stamp_lines(timestamp: DateTime<Utc>) -> (String, String) {
    (
        timestamp.format("%I:%M:%S %p %Z").to_string(),
        timestamp.format("%d %B %Y").to_string(),
    )
}

/// Render the two-line time stamp onto a fresh canvas.
pub fn render_canvas(options: &CanvasOptions) -> RgbaImage {
    let background = options.background.unwrap_or(TRANSPARENT);
    let timestamp = options.timestamp.unwrap_or_else(Utc::now);

    let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, background);
    let (time, date) = stamp_lines(timestamp);
    draw_text(&mut canvas, TEXT_LEFT, TIME_BASELINE, &time);
    draw_text(&mut canvas, TEXT_LEFT, DATE_BASELINE, &date);
    canvas
}

/// Vector rendition of the same stamp.
pub fn render_svg(timestamp: DateTime<Utc>) -> String {
    let (time, date) = stamp_lines(timestamp);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
    <text x="10" y="30" font-family="Arial" font-size="20" fill="black">{time}</text>
    <text x="10" y="60" font-family="Arial" font-size="20" fill="black">{date}</text>
</svg>"#,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
        time = time,
        date = date,
    )
}

// Glyph rows are LSB-first: bit 0 is the leftmost pixel.
fn draw_text(canvas: &mut RgbaImage, left: u32, baseline: u32, text: &str) {
    let top = baseline.saturating_sub(GLYPH_SIZE);
    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let origin_x = left + index as u32 * GLYPH_SIZE;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x = origin_x + col;
                let y = top + row as u32;
                if x < canvas.width() && y < canvas.height() {
                    canvas.put_pixel(x, y, INK);
                }
            }
        }
    }
}

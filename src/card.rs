// The greeting card itself: what hides under the foil, what is shown after the
// reveal, and what gets exported. It lays itself out from the target buffer size,
// so the same view fills the 320x320 scratch area or the 360x300 standalone card.

use std::path::Path;

use image::RgbaImage;

use crate::draw::{draw_text_centered, fill_rect, fill_rect_alpha, vertical_gradient};
use crate::error::Error;
use crate::font;
use crate::gamma::GammaLut;
use crate::icons::{Icon, draw_icon};
use crate::quotes::Quote;
use crate::theme::{self, pack, rgb};
use crate::types::FrameBuffer;

pub const CARD_WIDTH: f32 = 360.0;
pub const CARD_HEIGHT: f32 = 300.0;

pub struct CardView {
    quote: Quote,
    background: Option<RgbaImage>,
}

impl CardView {
    pub fn new(quote: Quote, background: Option<RgbaImage>) -> Self {
        Self { quote, background }
    }

    /// Decode a background picture (PNG / JPEG).
    pub fn load_background(path: &Path) -> Result<RgbaImage, Error> {
        Ok(image::open(path)?.to_rgba8())
    }

    /// Paint the card over all of `fb`. `scale` is device pixels per logical pixel.
    pub fn render(&self, fb: &mut FrameBuffer, scale: f32, lut: &GammaLut) {
        let s = scale.max(0.01);
        let (dw, dh) = (fb.width as i32, fb.height as i32);
        let w = fb.width as f32 / s;
        let h = fb.height as f32 / s;
        let cx = w / 2.0;
        let cell = |c: f32| (c * s).round().max(1.0) as i32;
        let at = |v: f32| (v * s).round() as i32;

        // Background picture (cover-fit) or the red fallback gradient
        match &self.background {
            Some(img) => cover(fb, img),
            None => vertical_gradient(fb, 0, 0, dw, dh, rgb(theme::CHRISTMAS_RED), rgb(theme::CHRISTMAS_RED_DARK), lut),
        }

        // Dark overlay so white text reads on any picture
        fill_rect_alpha(fb, 0, 0, dw, dh, 0x0000_0000, 0.35, lut);

        // Gold border
        let b = cell(2.0);
        let gold = rgb(theme::GOLD);
        fill_rect_alpha(fb, 0, 0, dw, b, gold, 0.3, lut);
        fill_rect_alpha(fb, 0, dh - b, dw, b, gold, 0.3, lut);
        fill_rect_alpha(fb, 0, b, b, dh - 2 * b, gold, 0.3, lut);
        fill_rect_alpha(fb, dw - b, b, b, dh - 2 * b, gold, 0.3, lut);

        draw_icon(fb, Icon::Sparkle, cx * s, 40.0 * s, 40.0 * s, 1.0, lut);

        // Quote, wrapped to the card width
        let quoted = format!("\u{201C}{}\u{201D}", self.quote.text);
        let max_chars = ((w - 48.0) / (2.0 * font::ADVANCE as f32)).floor().max(1.0) as usize;
        for (i, line) in font::wrap(&quoted, max_chars).iter().enumerate() {
            draw_text_centered(fb, at(cx), at(72.0 + i as f32 * 20.0), line, cell(2.0), rgb(theme::WHITE));
        }

        // "* Praise the Lord! Ave Maria *"
        let motto = "Praise the Lord! Ave Maria";
        let half = font::text_cells(motto) as f32 / 2.0;
        draw_text_centered(fb, at(cx), at(h - 88.0), motto, cell(1.0), rgb(theme::WHITE));
        draw_icon(fb, Icon::Star, (cx - half - 14.0) * s, (h - 85.0) * s, 12.0 * s, 1.0, lut);
        draw_icon(fb, Icon::Star, (cx + half + 14.0) * s, (h - 85.0) * s, 12.0 * s, 1.0, lut);

        draw_text_centered(fb, at(cx), at(h - 62.0), "Lourdes", cell(2.0), gold);
        draw_text_centered(fb, at(cx), at(h - 34.0), "A R Sugir\u{2019}s Greetings", cell(1.0), rgb(theme::WHITE));
    }

    /// Render into a fresh buffer of `width` x `height` logical pixels at `scale`.
    pub fn render_sized(&self, width: f32, height: f32, scale: f32, lut: &GammaLut) -> FrameBuffer {
        let mut fb = FrameBuffer::new(
            (width * scale).round().max(1.0) as usize,
            (height * scale).round().max(1.0) as usize,
        );
        self.render(&mut fb, scale, lut);
        fb
    }
}

/// Nearest-neighbour "background-size: cover; background-position: center".
fn cover(fb: &mut FrameBuffer, img: &RgbaImage) {
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 {
        fill_rect(fb, 0, 0, fb.width as i32, fb.height as i32, 0);
        return;
    }
    let k = (fb.width as f32 / iw as f32).max(fb.height as f32 / ih as f32);
    let off_x = (iw as f32 * k - fb.width as f32) / 2.0;
    let off_y = (ih as f32 * k - fb.height as f32) / 2.0;
    for y in 0..fb.height {
        let sy = (((y as f32 + 0.5 + off_y) / k) as u32).min(ih - 1);
        for x in 0..fb.width {
            let sx = (((x as f32 + 0.5 + off_x) / k) as u32).min(iw - 1);
            let [r, g, b, _] = img.get_pixel(sx, sy).0;
            fb.pixels[y * fb.width + x] = pack(r, g, b);
        }
    }
}

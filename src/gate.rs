// QR landing gate.
// Visual: Santa, a call to action, and a glowing card holding a QR code whose URL
// carries the `scanned=true` marker. Opening that URL (or pressing Enter here) opens the gift.

use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;
use url::Url;

use crate::compose::{add_glow, box_blur_rgb};
use crate::draw::{draw_text_centered, fill_rect};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::icons::{Icon, draw_icon};
use crate::theme::{self, rgb};
use crate::types::{FrameBuffer, Rect};

pub const SCAN_PARAM: &str = "scanned";
pub const SCAN_VALUE: &str = "true";
/// Logical edge length of the rendered code.
pub const QR_SIZE: f32 = 200.0;
const QR_PADDING: f32 = 24.0;

/// The page URL with its query (and fragment) replaced by the scan marker.
pub fn scan_url(page: &Url) -> Url {
    let mut url = page.clone();
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair(SCAN_PARAM, SCAN_VALUE);
    url
}

/// True when the page was opened through the QR code.
pub fn has_scanned(page: &Url) -> bool {
    page.query_pairs().any(|(k, v)| k == SCAN_PARAM && v == SCAN_VALUE)
}

/// Encoded QR modules, row-major, `true` = dark.
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode with the highest error-correction level.
    pub fn encode(data: &str) -> Result<Self, Error> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
            .map_err(|e| Error::Qr(e.to_string()))?;
        let width = code.width();
        let dark = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
        Ok(Self { width, dark })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Draw the modules (no quiet zone) centered in a `size` x `size` box at (x, y).
    /// Modules are whole device pixels so the code stays crisp and scannable.
    pub fn render(&self, fb: &mut FrameBuffer, x: i32, y: i32, size: i32, color: u32) {
        if self.width == 0 { return; }
        let module = (size / self.width as i32).max(1);
        let inset = (size - module * self.width as i32) / 2;
        for my in 0..self.width {
            for mx in 0..self.width {
                if self.is_dark(mx, my) {
                    fill_rect(fb, x + inset + mx as i32 * module, y + inset + my as i32 * module, module, module, color);
                }
            }
        }
    }
}

pub struct Gate {
    page: Url,
    matrix: QrMatrix,
    glow: FrameBuffer,
    scale: f32,
}

impl Gate {
    pub fn new(page: Url, scale: f32) -> Result<Self, Error> {
        let scan = scan_url(&page);
        let matrix = QrMatrix::encode(scan.as_str())?;
        debug!(url = %scan, modules = matrix.width(), "gate QR encoded");

        // Soft red/gold halo behind the card, blurred once up front.
        let card = Self::card_size() * scale;
        let margin = 24.0 * scale;
        let side = (card + 2.0 * margin).round().max(1.0) as usize;
        let mut src = FrameBuffer::new(side, side);
        let half = side as i32 / 2;
        let m = margin as i32;
        fill_rect(&mut src, m, m, side as i32 - 2 * m, half - m, rgb(theme::CHRISTMAS_RED));
        fill_rect(&mut src, m, half, side as i32 - 2 * m, half - m, rgb(theme::GOLD));
        let mut tmp = FrameBuffer::new(side, side);
        let mut glow = FrameBuffer::new(side, side);
        box_blur_rgb(&src, &mut tmp, &mut glow, (16.0 * scale).round().max(1.0) as usize)?;
        for p in &mut glow.pixels {
            let (r, g, b) = theme::unpack(*p);
            *p = theme::pack(r / 2, g / 2, b / 2);
        }

        Ok(Self { page, matrix, glow, scale })
    }

    fn card_size() -> f32 {
        QR_SIZE + 2.0 * QR_PADDING
    }

    pub fn is_passed(&self) -> bool {
        has_scanned(&self.page)
    }

    /// Draw the gate centered in `view` (logical). `t` is seconds since start for the gentle motion.
    pub fn render(&self, fb: &mut FrameBuffer, view: Rect, t: f32, lut: &GammaLut) {
        let s = self.scale;
        let cx = view.left + view.width / 2.0;
        let top = view.top;
        let text = |v: f32| (v * s).round().max(1.0) as i32;

        // Santa floats; the title bounces a little
        let float = (t * 2.0).sin() * 6.0;
        draw_icon(fb, Icon::Santa, cx * s, (top + 50.0 + float) * s, 64.0 * s, 1.0, lut);
        let bounce = ((t * 3.0).sin().abs()) * -4.0;
        draw_text_centered(fb, (cx * s) as i32, ((top + 100.0 + bounce) * s) as i32, "Scan to get your gift", text(3.0), rgb(theme::LIGHT_RED));
        draw_text_centered(fb, (cx * s) as i32, ((top + 130.0) * s) as i32, "Scan QR code with your phone camera", text(1.0), rgb(theme::WHITE));

        // Glowing frame + card
        let card = Self::card_size();
        let card_left = cx - card / 2.0;
        let card_top = top + 160.0;
        let glow_off = (24.0 * s) as i32;
        add_glow(fb, &self.glow, (card_left * s) as i32 - glow_off, (card_top * s) as i32 - glow_off);
        fill_rect(fb, (card_left * s) as i32, (card_top * s) as i32, (card * s) as i32, ((card + 30.0) * s) as i32, rgb(theme::CARD));
        self.matrix.render(
            fb,
            ((card_left + QR_PADDING) * s) as i32,
            ((card_top + QR_PADDING) * s) as i32,
            (QR_SIZE * s) as i32,
            rgb(theme::CHRISTMAS_RED),
        );
        draw_text_centered(fb, (cx * s) as i32, ((card_top + card + 6.0) * s) as i32, "Point camera here", text(1.0), rgb(theme::MUTED));

        // Corner sparkles, twinkling out of phase
        for (i, (dx, dy)) in [(0.0, 0.0), (card, 0.0), (0.0, card + 30.0), (card, card + 30.0)].into_iter().enumerate() {
            let phase = [0.0, 0.5, 0.3, 0.7][i];
            let a = 0.5 + 0.5 * ((t - phase) * 4.0).sin();
            draw_icon(fb, Icon::Sparkle, (card_left + dx) * s, (card_top + dy) * s, 28.0 * s, a.clamp(0.2, 1.0), lut);
        }

        // Wiggling tree and the desktop hint
        let wiggle = (t * 5.0).sin() * 3.0;
        draw_icon(fb, Icon::Tree, (cx + wiggle) * s, (card_top + card + 80.0) * s, 48.0 * s, 1.0, lut);
        draw_text_centered(fb, (cx * s) as i32, ((card_top + card + 118.0) * s) as i32, "Press Enter to open your gift", text(1.0), rgb(theme::LIGHT_GOLD));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn scan_url_replaces_query_with_the_marker() {
        let u = scan_url(&page("https://lourdes.greetings/card?ref=poster&scanned=false#top"));
        assert_eq!(u.as_str(), "https://lourdes.greetings/card?scanned=true");
        assert!(has_scanned(&u));
    }

    #[test]
    fn marker_detection() {
        assert!(!has_scanned(&page("https://lourdes.greetings/")));
        assert!(!has_scanned(&page("https://lourdes.greetings/?scanned=yes")));
        assert!(has_scanned(&page("https://lourdes.greetings/?utm=x&scanned=true")));
    }

    #[test]
    fn qr_matrix_has_finder_patterns_and_renders() {
        let m = QrMatrix::encode("https://lourdes.greetings/?scanned=true").unwrap();
        assert!(m.width() >= 21);
        // Top-left finder: dark corner, light separator ring inside.
        assert!(m.is_dark(0, 0));
        assert!(m.is_dark(6, 6));
        assert!(!m.is_dark(1, 1));
        assert!(m.is_dark(3, 3));

        let mut fb = FrameBuffer::new(200, 200);
        m.render(&mut fb, 0, 0, 200, 0x00FF_0000);
        let module = 200 / m.width() as i32;
        let inset = (200 - module * m.width() as i32) / 2;
        assert_eq!(fb.get(inset as usize, inset as usize), Some(0x00FF_0000));
    }

    #[test]
    fn gate_passes_only_with_the_marker() {
        let g = Gate::new(page("https://lourdes.greetings/"), 1.0).unwrap();
        assert!(!g.is_passed());
        let g = Gate::new(page("https://lourdes.greetings/?scanned=true"), 1.0).unwrap();
        assert!(g.is_passed());

        let lut = GammaLut::new();
        let mut fb = FrameBuffer::new(480, 720);
        g.render(&mut fb, Rect::new(0.0, 60.0, 480.0, 580.0), 0.0, &lut);
        assert!(fb.pixels.iter().any(|p| *p == rgb(theme::CHRISTMAS_RED)));
    }
}

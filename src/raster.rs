//! The scratch canvas: an owned RGBA raster at device pixel density.
//!
//! All drawing calls take logical (device-independent) coordinates; the canvas
//! applies its pixel-ratio transform the way a 2D context with
//! `setTransform(dpr, 0, 0, dpr, 0, 0)` would. A device pixel is covered by a
//! shape when its center lies inside the shape.

use crate::error::Error;
use crate::font;
use crate::theme::{self, rgba};
use crate::types::Stamp;
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Largest canvas we agree to allocate, in device pixels (what browsers cap a 2D canvas at).
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// Byte stride of the transparency scan: the alpha byte of every 4th pixel.
pub const SAMPLE_STRIDE: usize = 16;

pub struct ScratchCanvas {
    image: RgbaImage,
    logical_width: f32,
    logical_height: f32,
    scale: f32,
}

impl ScratchCanvas {
    /// Allocate a fully transparent canvas for a `width` x `height` logical surface.
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Result<Self, Error> {
        if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
            return Err(Error::CanvasUnavailable(format!("pixel ratio {pixel_ratio}")));
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::CanvasUnavailable(format!("surface {width}x{height}")));
        }
        let dw = (width * pixel_ratio).round().max(1.0) as u64;
        let dh = (height * pixel_ratio).round().max(1.0) as u64;
        if dw * dh > MAX_CANVAS_AREA || dw > u32::MAX as u64 || dh > u32::MAX as u64 {
            return Err(Error::CanvasUnavailable(format!("{dw}x{dh} device pixels")));
        }
        debug!(dw, dh, pixel_ratio, "allocated scratch canvas");
        Ok(Self {
            image: RgbaImage::new(dw as u32, dh as u32),
            logical_width: width,
            logical_height: height,
            scale: pixel_ratio,
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[cfg(test)]
    pub fn device_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Alpha of the device pixel under logical point (x, y); None outside the canvas.
    #[cfg(test)]
    pub fn alpha_at(&self, x: f32, y: f32) -> Option<u8> {
        if x < 0.0 || y < 0.0 { return None; }
        let px = (x * self.scale).floor() as u32;
        let py = (y * self.scale).floor() as u32;
        self.image.get_pixel_checked(px, py).map(|p| p.0[3])
    }

    /// Solid rectangle (source-over with an opaque colour is a plain overwrite).
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        let (dw, dh) = self.image.dimensions();
        let x0 = ((x * self.scale).round().max(0.0) as u32).min(dw);
        let y0 = ((y * self.scale).round().max(0.0) as u32).min(dh);
        let x1 = (((x + w) * self.scale).round().max(0.0) as u32).min(dw);
        let y1 = (((y + h) * self.scale).round().max(0.0) as u32).min(dh);
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgba(color));
            }
        }
    }

    /// Solid disc of logical radius `r`.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: [u8; 4]) {
        self.for_each_in_circle(cx, cy, r, |px| *px = Rgba(color));
    }

    /// Destination-out disc: every covered sample becomes fully transparent.
    /// Overlapping cuts never bring opacity back.
    #[cfg(test)]
    pub fn erase_circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.for_each_in_circle(cx, cy, r, |px| *px = Rgba([0, 0, 0, 0]));
    }

    /// Destination-out with a precomputed device-space stamp centered on logical (cx, cy).
    /// Every sample under a lit stamp cell becomes fully transparent.
    pub fn erase_stamp(&mut self, cx: f32, cy: f32, stamp: &Stamp) {
        let (dw, dh) = self.image.dimensions();
        let ccx = (cx * self.scale).floor() as i64;
        let ccy = (cy * self.scale).floor() as i64;
        let r = stamp.radius as i64;
        let d = stamp.side() as i64;
        for ky in 0..d {
            for kx in 0..d {
                let sx = ccx + kx - r;
                let sy = ccy + ky - r;
                if sx < 0 || sy < 0 || sx >= dw as i64 || sy >= dh as i64 { continue; }
                if stamp.weights[(ky * d + kx) as usize] > 0.0 {
                    self.image.put_pixel(sx as u32, sy as u32, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }

    /// Text in the 5x7 font; `cell` is the logical size of one glyph cell.
    /// `baseline_y` is the bottom of the glyph box, like canvas `fillText`.
    pub fn fill_text_centered(&mut self, text: &str, cx: f32, baseline_y: f32, cell: f32, color: [u8; 4]) {
        let w = font::text_cells(text) as f32 * cell;
        let x0 = cx - w / 2.0;
        let y0 = baseline_y - font::GLYPH_H as f32 * cell;
        let mut cells = Vec::new();
        font::for_each_cell(text, |col, row| cells.push((col, row)));
        for (col, row) in cells {
            self.fill_rect(x0 + col as f32 * cell, y0 + row as f32 * cell, cell, cell, color);
        }
    }

    /// Paint the foil pattern over the whole canvas, replacing whatever was there.
    /// Visual: red wrapping paper, gold ribbon cross, a bow disc, dots, two lines of text.
    pub fn paint_foil(&mut self) {
        let (w, h) = (self.logical_width, self.logical_height);
        let (cx, cy) = (w / 2.0, h / 2.0);

        // Background
        self.fill_rect(0.0, 0.0, w, h, rgba(theme::CHRISTMAS_RED));

        // Ribbon bands
        let ribbon = rgba(theme::GOLD);
        self.fill_rect(cx - 20.0, 0.0, 40.0, h, ribbon);
        self.fill_rect(0.0, cy - 20.0, w, 40.0, ribbon);

        // Bow
        self.fill_circle(cx, cy, 35.0, rgba(theme::BOW_GOLD));

        // Dots, keeping clear of the ribbon cross
        let dot = rgba(theme::DOT_RED);
        let mut i = 0.0;
        while i < w {
            let mut j = 0.0;
            while j < h {
                if (i - cx).abs() > 25.0 && (j - cy).abs() > 25.0 {
                    self.fill_circle(i, j, 4.0, dot);
                }
                j += 30.0;
            }
            i += 30.0;
        }

        // Text (24px bold in the stylesheet; 3px glyph cells come close)
        let white = rgba(theme::WHITE);
        self.fill_text_centered("Scratch to", cx, cy - 60.0, 3.0, white);
        self.fill_text_centered("Reveal!", cx, cy + 80.0, 3.0, white);
    }

    /// Fraction of sampled alpha bytes that are zero.
    /// Samples start at byte 3 (first alpha) and step by `stride` bytes;
    /// the denominator is the number of samples actually examined.
    pub fn transparent_fraction(&self, stride: usize) -> f32 {
        let raw: &[u8] = self.image.as_raw();
        let mut seen = 0usize;
        let mut clear = 0usize;
        for a in raw.iter().skip(3).step_by(stride.max(1)) {
            seen += 1;
            if *a == 0 { clear += 1; }
        }
        if seen == 0 { 0.0 } else { clear as f32 / seen as f32 }
    }

    fn for_each_in_circle(&mut self, cx: f32, cy: f32, r: f32, mut f: impl FnMut(&mut Rgba<u8>)) {
        if r <= 0.0 { return; }
        let s = self.scale;
        let (dw, dh) = self.image.dimensions();
        let (dcx, dcy, dr) = (cx * s, cy * s, r * s);
        let r2 = dr * dr;
        let x0 = (dcx - dr).floor().max(0.0) as u32;
        let y0 = (dcy - dr).floor().max(0.0) as u32;
        let x1 = ((dcx + dr).ceil().max(0.0) as u32).min(dw);
        let y1 = ((dcy + dr).ceil().max(0.0) as u32).min(dh);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - dcx;
                let dy = py as f32 + 0.5 - dcy;
                if dx * dx + dy * dy <= r2 {
                    f(self.image.get_pixel_mut(px, py));
                }
            }
        }
    }
}

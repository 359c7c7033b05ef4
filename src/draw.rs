// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the greeting page.
// 2) Solid / translucent rects, discs, rings, triangles and lines.
// 3) Text in the tiny 5x7 bitmap font, scaled to any integer size.

use crate::error::Error;
use crate::font;
use crate::gamma::GammaLut;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window of `width` x `height` device pixels.
    /// Visual: a new empty window appears with your chosen title.
    /// The buffer is shown 1:1 from the top-left, so mouse and buffer pixels line up.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, scale_mode: ScaleMode::UpperLeft, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Current inner size in device pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Mouse position in window pixels, or None while the pointer is outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Edge-triggered key press (no auto-repeat).
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

/* ---------- Software drawing: pixels and shapes ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Mix `color` into the pixel at (x,y) with coverage `alpha`.
#[inline]
pub fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32, alpha: f32, lut: &GammaLut) {
    if x < 0 || y < 0 || x as usize >= fb.width || y as usize >= fb.height {
        return;
    }
    let idx = y as usize * fb.width + x as usize;
    fb.pixels[idx] = lut.mix(fb.pixels[idx], color, alpha);
}

/// Opaque rectangle, clipped to the buffer.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(fb.width as i32);
    let y1 = (y + h).min(fb.height as i32);
    for py in y0..y1 {
        let row = py as usize * fb.width;
        for px in x0..x1 {
            fb.pixels[row + px as usize] = color;
        }
    }
}

/// Translucent rectangle. Visual: the dark card overlay, the reveal flash.
pub fn fill_rect_alpha(
    fb: &mut FrameBuffer,
    x: i32, y: i32, w: i32, h: i32,
    color: u32, alpha: f32, lut: &GammaLut,
) {
    for py in y.max(0)..(y + h).min(fb.height as i32) {
        for px in x.max(0)..(x + w).min(fb.width as i32) {
            blend_pixel(fb, px, py, color, alpha, lut);
        }
    }
}

/// Filled disc; a device pixel is covered when its center lies within `r`.
pub fn fill_disc(fb: &mut FrameBuffer, cx: f32, cy: f32, r: f32, color: u32, alpha: f32, lut: &GammaLut) {
    if r <= 0.0 { return; }
    let r2 = r * r;
    for py in (cy - r).floor() as i32..=(cy + r).ceil() as i32 {
        for px in (cx - r).floor() as i32..=(cx + r).ceil() as i32 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend_pixel(fb, px, py, color, alpha, lut);
            }
        }
    }
}

/// Circle outline of the given thickness. Visual: explosion rings.
pub fn draw_ring(
    fb: &mut FrameBuffer,
    cx: f32, cy: f32, r: f32, thickness: f32,
    color: u32, alpha: f32, lut: &GammaLut,
) {
    if r <= 0.0 || thickness <= 0.0 { return; }
    let outer = r + thickness * 0.5;
    let inner = (r - thickness * 0.5).max(0.0);
    let (o2, i2) = (outer * outer, inner * inner);
    for py in (cy - outer).floor() as i32..=(cy + outer).ceil() as i32 {
        for px in (cx - outer).floor() as i32..=(cx + outer).ceil() as i32 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let d2 = dx * dx + dy * dy;
            if d2 <= o2 && d2 >= i2 {
                blend_pixel(fb, px, py, color, alpha, lut);
            }
        }
    }
}

/// Filled triangle via edge functions over its bounding box.
pub fn fill_triangle(
    fb: &mut FrameBuffer,
    a: (f32, f32), b: (f32, f32), c: (f32, f32),
    color: u32, alpha: f32, lut: &GammaLut,
) {
    let edge = |p: (f32, f32), q: (f32, f32), x: f32, y: f32| (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0);
    let area = edge(a, b, c.0, c.1);
    if area == 0.0 { return; }
    let min_x = a.0.min(b.0).min(c.0).floor() as i32;
    let max_x = a.0.max(b.0).max(c.0).ceil() as i32;
    let min_y = a.1.min(b.1).min(c.1).floor() as i32;
    let max_y = a.1.max(b.1).max(c.1).ceil() as i32;
    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(b, c, x, y) * area.signum();
            let w1 = edge(c, a, x, y) * area.signum();
            let w2 = edge(a, b, x, y) * area.signum();
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                blend_pixel(fb, px, py, color, alpha, lut);
            }
        }
    }
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Draw a small crosshair centered at (cx,cy).
/// Visual: a "+" (with a gap at the center) follows the pointer over the foil.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// Vertical two-stop gradient over a rect, interpolated in linear light.
/// Visual: night sky, card fallback background.
pub fn vertical_gradient(
    fb: &mut FrameBuffer,
    x: i32, y: i32, w: i32, h: i32,
    top: u32, bottom: u32, lut: &GammaLut,
) {
    if h <= 0 { return; }
    for py in y.max(0)..(y + h).min(fb.height as i32) {
        let t = (py - y) as f32 / (h - 1).max(1) as f32;
        let color = lut.mix(top, bottom, t);
        fill_rect(fb, x, py, w, 1, color);
    }
}

/* ---------- Text ---------- */

/// Draw `text` with its top-left at (x,y); every glyph cell becomes a `scale`x`scale` block.
/// Visual: white glyphs get a 1-cell dark shadow so they read on the foil and the sky.
pub fn draw_text(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, scale: i32, color: u32) {
    let s = scale.max(1);
    let shadow = (s / 2).max(1);
    // Shadow pass first, then the glyph itself
    font::for_each_cell(text, |cx, cy| {
        fill_rect(fb, x + cx * s + shadow, y + cy * s + shadow, s, s, 0x00000000);
    });
    font::for_each_cell(text, |cx, cy| {
        fill_rect(fb, x + cx * s, y + cy * s, s, s, color);
    });
}

/// Same as `draw_text` but horizontally centered on `cx`.
pub fn draw_text_centered(fb: &mut FrameBuffer, cx: i32, y: i32, text: &str, scale: i32, color: u32) {
    let w = font::text_cells(text) * scale.max(1);
    draw_text(fb, cx - w / 2, y, text, scale, color);
}

// Compositing helpers: box blur for soft glows, additive glow stamping,
// and laying the RGBA scratch canvas over the page in linear light.

use crate::error::Error;
use crate::gamma::GammaLut;
use crate::theme::{pack, unpack};
use crate::types::FrameBuffer;
use image::RgbaImage;

/// Separable box blur (horizontal into `tmp`, vertical into `dst`), edges extended.
/// Visual: the moon halo and the glow behind the QR frame.
pub fn box_blur_rgb(
    src: &FrameBuffer,
    tmp: &mut FrameBuffer,
    dst: &mut FrameBuffer,
    radius: usize,
) -> Result<(), Error> {
    if src.width != dst.width || src.height != dst.height {
        return Err(Error::SizeMismatch("box_blur: src vs dst".into()));
    }
    if tmp.width != src.width || tmp.height != src.height {
        return Err(Error::SizeMismatch("box_blur: tmp".into()));
    }
    if src.width == 0 || src.height == 0 {
        return Ok(());
    }
    let (w, h) = (src.width, src.height);
    blur_pass(&src.pixels, &mut tmp.pixels, w, h, radius, 1, w);
    blur_pass(&tmp.pixels, &mut dst.pixels, h, w, radius, w, 1);
    Ok(())
}

/// One sliding-window pass. `len` samples per line with `step` between samples,
/// `lines` lines with `line_step` between line starts.
fn blur_pass(src: &[u32], dst: &mut [u32], len: usize, lines: usize, radius: usize, step: usize, line_step: usize) {
    let r = radius as i64;
    let win = (2 * r + 1) as u32;
    let last = len as i64 - 1;
    for line in 0..lines {
        let base = line * line_step;
        let at = |i: i64| src[base + i.clamp(0, last) as usize * step];

        let mut sum = [0u32; 3];
        for i in -r..=r {
            let (cr, cg, cb) = unpack(at(i));
            sum[0] += cr as u32;
            sum[1] += cg as u32;
            sum[2] += cb as u32;
        }
        for i in 0..len as i64 {
            dst[base + i as usize * step] =
                pack((sum[0] / win) as u8, (sum[1] / win) as u8, (sum[2] / win) as u8);
            let (ar, ag, ab) = unpack(at(i + r + 1));
            let (sr, sg, sb) = unpack(at(i - r));
            sum[0] = sum[0] + ar as u32 - sr as u32;
            sum[1] = sum[1] + ag as u32 - sg as u32;
            sum[2] = sum[2] + ab as u32 - sb as u32;
        }
    }
}

/// Add `glow` onto `fb` at (ox, oy), saturating each channel at 255.
/// Visual: black in `glow` changes nothing; bright parts light up the sky.
pub fn add_glow(fb: &mut FrameBuffer, glow: &FrameBuffer, ox: i32, oy: i32) {
    for gy in 0..glow.height {
        let y = oy + gy as i32;
        if y < 0 || y as usize >= fb.height { continue; }
        for gx in 0..glow.width {
            let x = ox + gx as i32;
            if x < 0 || x as usize >= fb.width { continue; }
            let idx = y as usize * fb.width + x as usize;
            fb.pixels[idx] = add_saturating(fb.pixels[idx], glow.pixels[gy * glow.width + gx]);
        }
    }
}

#[inline]
pub fn add_saturating(a: u32, b: u32) -> u32 {
    let (ar, ag, ab) = unpack(a);
    let (br, bg, bb) = unpack(b);
    pack(ar.saturating_add(br), ag.saturating_add(bg), ab.saturating_add(bb))
}

/// Copy `src` onto `fb` with its top-left at (ox, oy), clipped.
pub fn blit(fb: &mut FrameBuffer, src: &FrameBuffer, ox: i32, oy: i32) {
    for sy in 0..src.height {
        let y = oy + sy as i32;
        if y < 0 || y as usize >= fb.height { continue; }
        for sx in 0..src.width {
            let x = ox + sx as i32;
            if x < 0 || x as usize >= fb.width { continue; }
            fb.pixels[y as usize * fb.width + x as usize] = src.pixels[sy * src.width + sx];
        }
    }
}

/// Lay an RGBA canvas over `fb` at (ox, oy) using its alpha channel (source-over).
/// Visual: foil stays opaque, erased samples show the card underneath.
pub fn composite_rgba(fb: &mut FrameBuffer, canvas: &RgbaImage, ox: i32, oy: i32, lut: &GammaLut) {
    for (cx, cy, px) in canvas.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        if a == 0 { continue; }
        let x = ox + cx as i32;
        let y = oy + cy as i32;
        if x < 0 || y < 0 || x as usize >= fb.width || y as usize >= fb.height { continue; }
        let idx = y as usize * fb.width + x as usize;
        fb.pixels[idx] = lut.mix(fb.pixels[idx], pack(r, g, b), a as f32 / 255.0);
    }
}

// Festive pictograms built from discs, rects and triangles.
// Each icon is drawn centered on (cx, cy) and fits inside a `size` x `size` box.

use crate::draw::{fill_disc, fill_rect_alpha, fill_triangle};
use crate::gamma::GammaLut;
use crate::theme::{self, rgb};
use crate::types::FrameBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Santa,
    Gift,
    Tree,
    Snowman,
    Star,
    Sparkle,
    Heart,
}

pub fn draw_icon(fb: &mut FrameBuffer, icon: Icon, cx: f32, cy: f32, size: f32, alpha: f32, lut: &GammaLut) {
    let s = size * 0.5;
    match icon {
        Icon::Santa => {
            let red = rgb(theme::CHRISTMAS_RED);
            let white = rgb(theme::WHITE);
            let skin = rgb((25.0, 80.0, 80.0));
            // hat, face, beard, pompom
            fill_triangle(fb, (cx - s * 0.6, cy - s * 0.2), (cx + s * 0.6, cy - s * 0.2), (cx + s * 0.2, cy - s), red, alpha, lut);
            fill_disc(fb, cx, cy + s * 0.05, s * 0.45, skin, alpha, lut);
            fill_disc(fb, cx, cy + s * 0.5, s * 0.45, white, alpha, lut);
            fill_rect_alpha(fb, (cx - s * 0.65) as i32, (cy - s * 0.3) as i32, (s * 1.3) as i32, (s * 0.2).max(1.0) as i32, white, alpha, lut);
            fill_disc(fb, cx + s * 0.2, cy - s, s * 0.15, white, alpha, lut);
        }
        Icon::Gift => {
            let box_c = rgb(theme::CHRISTMAS_RED);
            let ribbon = rgb(theme::GOLD);
            fill_rect_alpha(fb, (cx - s * 0.8) as i32, (cy - s * 0.4) as i32, (s * 1.6) as i32, (s * 1.3) as i32, box_c, alpha, lut);
            fill_rect_alpha(fb, (cx - s * 0.15) as i32, (cy - s * 0.4) as i32, (s * 0.3).max(1.0) as i32, (s * 1.3) as i32, ribbon, alpha, lut);
            fill_rect_alpha(fb, (cx - s * 0.8) as i32, (cy + s * 0.05) as i32, (s * 1.6) as i32, (s * 0.25).max(1.0) as i32, ribbon, alpha, lut);
            fill_disc(fb, cx - s * 0.25, cy - s * 0.55, s * 0.22, ribbon, alpha, lut);
            fill_disc(fb, cx + s * 0.25, cy - s * 0.55, s * 0.22, ribbon, alpha, lut);
        }
        Icon::Tree => {
            let green = rgb(theme::GREEN);
            let trunk = rgb((25.0, 60.0, 30.0));
            fill_triangle(fb, (cx, cy - s), (cx - s * 0.55, cy - s * 0.1), (cx + s * 0.55, cy - s * 0.1), green, alpha, lut);
            fill_triangle(fb, (cx, cy - s * 0.5), (cx - s * 0.8, cy + s * 0.6), (cx + s * 0.8, cy + s * 0.6), green, alpha, lut);
            fill_rect_alpha(fb, (cx - s * 0.12) as i32, (cy + s * 0.6) as i32, (s * 0.24).max(1.0) as i32, (s * 0.4).max(1.0) as i32, trunk, alpha, lut);
            fill_disc(fb, cx, cy - s, s * 0.12, rgb(theme::GOLD), alpha, lut);
        }
        Icon::Snowman => {
            let white = rgb(theme::WHITE);
            fill_disc(fb, cx, cy + s * 0.4, s * 0.55, white, alpha, lut);
            fill_disc(fb, cx, cy - s * 0.45, s * 0.38, white, alpha, lut);
            fill_disc(fb, cx, cy - s * 0.4, s * 0.08, rgb(theme::CHRISTMAS_RED), alpha, lut);
        }
        Icon::Star => draw_star(fb, cx, cy, s, rgb(theme::GOLD), alpha, lut),
        Icon::Sparkle => draw_sparkle(fb, cx, cy, s, rgb(theme::LIGHT_GOLD), alpha, lut),
        Icon::Heart => {
            let red = rgb(theme::LIGHT_RED);
            fill_disc(fb, cx - s * 0.45, cy - s * 0.25, s * 0.5, red, alpha, lut);
            fill_disc(fb, cx + s * 0.45, cy - s * 0.25, s * 0.5, red, alpha, lut);
            fill_triangle(fb, (cx - s * 0.93, cy - s * 0.05), (cx + s * 0.93, cy - s * 0.05), (cx, cy + s), red, alpha, lut);
        }
    }
}

/// Five-pointed star of outer radius `r`.
pub fn draw_star(fb: &mut FrameBuffer, cx: f32, cy: f32, r: f32, color: u32, alpha: f32, lut: &GammaLut) {
    let inner = r * 0.42;
    let point = |i: usize, radius: f32| {
        let a = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
        (cx + radius * a.cos(), cy + radius * a.sin())
    };
    for i in 0..5 {
        let tip = point(2 * i, r);
        let left = point(2 * i + 9, inner);
        let right = point(2 * i + 1, inner);
        fill_triangle(fb, tip, left, right, color, alpha, lut);
        fill_triangle(fb, (cx, cy), left, right, color, alpha, lut);
    }
}

/// Four-pointed twinkle: two thin diamonds crossed.
pub fn draw_sparkle(fb: &mut FrameBuffer, cx: f32, cy: f32, r: f32, color: u32, alpha: f32, lut: &GammaLut) {
    let w = r * 0.22;
    fill_triangle(fb, (cx, cy - r), (cx - w, cy), (cx + w, cy), color, alpha, lut);
    fill_triangle(fb, (cx, cy + r), (cx - w, cy), (cx + w, cy), color, alpha, lut);
    fill_triangle(fb, (cx - r, cy), (cx, cy - w), (cx, cy + w), color, alpha, lut);
    fill_triangle(fb, (cx + r, cy), (cx, cy - w), (cx, cy + w), color, alpha, lut);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_icon_stays_inside_its_box() {
        let lut = GammaLut::new();
        for icon in [Icon::Santa, Icon::Gift, Icon::Tree, Icon::Snowman, Icon::Star, Icon::Sparkle, Icon::Heart] {
            let mut fb = FrameBuffer::new(64, 64);
            draw_icon(&mut fb, icon, 32.0, 32.0, 32.0, 1.0, &lut);
            let mut lit = 0;
            for y in 0..64 {
                for x in 0..64 {
                    if fb.pixels[y * 64 + x] != 0 {
                        lit += 1;
                        assert!((14..=50).contains(&x) && (14..=50).contains(&y), "{icon:?} at {x},{y}");
                    }
                }
            }
            assert!(lit > 0, "{icon:?} drew nothing");
        }
    }
}

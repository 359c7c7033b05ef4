// Festive palette, written the way the stylesheet writes it: hsl(hue, sat%, light%).

use palette::{FromColor, Hsl, Srgb};

/// (hue degrees, saturation %, lightness %)
pub type HslColor = (f32, f32, f32);

pub const CHRISTMAS_RED: HslColor = (350.0, 75.0, 45.0);
pub const CHRISTMAS_RED_DARK: HslColor = (350.0, 70.0, 30.0);
pub const LIGHT_RED: HslColor = (350.0, 80.0, 60.0);
pub const DOT_RED: HslColor = (350.0, 80.0, 50.0);
pub const GOLD: HslColor = (45.0, 93.0, 58.0);
pub const BOW_GOLD: HslColor = (45.0, 93.0, 65.0);
pub const LIGHT_GOLD: HslColor = (45.0, 90.0, 70.0);
pub const MOON: HslColor = (45.0, 93.0, 80.0);
pub const GREEN: HslColor = (142.0, 70.0, 45.0);
pub const BRIGHT_GREEN: HslColor = (142.0, 70.0, 50.0);
pub const PURPLE: HslColor = (280.0, 70.0, 60.0);
pub const BLUE: HslColor = (200.0, 80.0, 60.0);
pub const WHITE: HslColor = (0.0, 0.0, 100.0);
pub const NIGHT_DARK: HslColor = (225.0, 50.0, 6.0);
pub const NIGHT: HslColor = (225.0, 45.0, 14.0);
pub const CARD: HslColor = (0.0, 0.0, 98.0);
pub const MUTED: HslColor = (220.0, 10.0, 45.0);

/// CSS hsl() -> [r, g, b] bytes.
pub fn rgb8(color: HslColor) -> [u8; 3] {
    let (h, s, l) = color;
    let hsl: Hsl = Hsl::new(h, s / 100.0, l / 100.0);
    let rgb: Srgb = Srgb::from_color(hsl);
    let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(rgb.red), q(rgb.green), q(rgb.blue)]
}

/// CSS hsl() -> 0x00RRGGBB for the window buffer.
pub fn rgb(color: HslColor) -> u32 {
    let [r, g, b] = rgb8(color);
    pack(r, g, b)
}

/// CSS hsl() -> opaque RGBA for the scratch canvas.
pub fn rgba(color: HslColor) -> [u8; 4] {
    let [r, g, b] = rgb8(color);
    [r, g, b, 255]
}

#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack(c: u32) -> (u8, u8, u8) {
    (((c >> 16) & 0xFF) as u8, ((c >> 8) & 0xFF) as u8, (c & 0xFF) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_primary_hues_convert() {
        assert_eq!(rgb(WHITE), 0x00FF_FFFF);
        assert_eq!(rgb8((0.0, 100.0, 50.0)), [255, 0, 0]);
    }

    #[test]
    fn christmas_red_is_red_dominant() {
        let [r, g, b] = rgb8(CHRISTMAS_RED);
        assert!(r > 180 && g < 60 && b < 80, "{r} {g} {b}");
    }
}

// Night-sky backdrop behind both stages.
// Visual: deep blue gradient, twinkling stars, a few big glowing stars, festive icons
// drifting upward, a soft moon glow in the corner, snow falling, and (on wide views)
// trees and gifts along the sides.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compose::{add_glow, box_blur_rgb};
use crate::draw::{fill_disc, vertical_gradient};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::icons::{Icon, draw_icon, draw_sparkle, draw_star};
use crate::theme::{self, rgb};
use crate::types::FrameBuffer;

pub const STAR_COUNT: usize = 100;
pub const BIG_STAR_COUNT: usize = 8;
pub const FLOATING_ICON_COUNT: usize = 12;
pub const SNOWFLAKE_COUNT: usize = 60;
/// Side trees and gifts only show up on views at least this wide (logical px).
pub const WIDE_VIEW: f32 = 768.0;

const FLOATING_ICONS: [Icon; 4] = [Icon::Santa, Icon::Gift, Icon::Tree, Icon::Snowman];
const MOON_RADIUS: f32 = 28.0;
const MOON_GLOW_MARGIN: f32 = 40.0;

#[derive(Clone, Debug)]
pub struct Star {
    pub left: f32,      // %
    pub top: f32,       // %
    pub size: f32,      // px, [1, 4)
    pub delay: f32,     // s, [0, 3)
    pub duration: f32,  // s, [1, 3)
}

#[derive(Clone, Debug)]
pub struct BigStar {
    pub left: f32,      // %
    pub top: f32,       // %, [0, 60)
    pub delay: f32,     // s
}

#[derive(Clone, Debug)]
pub struct FloatingIcon {
    pub left: f32,      // %, [5, 95)
    pub delay: f32,     // s, [0, 5)
    pub duration: f32,  // s, [15, 25)
    pub icon: Icon,
}

/// 0..1 pulse, phase-shifted by `delay`, one cycle per `duration`.
fn twinkle(t: f32, delay: f32, duration: f32) -> f32 {
    ((t - delay) * PI / duration.max(0.01)).sin().abs()
}

pub struct StarryBackground {
    stars: Vec<Star>,
    big_stars: Vec<BigStar>,
    icons: Vec<FloatingIcon>,
    moon_glow: FrameBuffer,
    scale: f32,
}

impl StarryBackground {
    pub fn new(seed: u64, scale: f32) -> Result<Self, Error> {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                left: rng.random_range(0.0..100.0),
                top: rng.random_range(0.0..100.0),
                size: rng.random_range(1.0..4.0),
                delay: rng.random_range(0.0..3.0),
                duration: rng.random_range(1.0..3.0),
            })
            .collect();
        let big_stars = (0..BIG_STAR_COUNT)
            .map(|_| BigStar {
                left: rng.random_range(0.0..100.0),
                top: rng.random_range(0.0..60.0),
                delay: rng.random_range(0.0..3.0),
            })
            .collect();
        let icons = (0..FLOATING_ICON_COUNT)
            .map(|_| FloatingIcon {
                left: rng.random_range(5.0..95.0),
                delay: rng.random_range(0.0..5.0),
                duration: rng.random_range(15.0..25.0),
                icon: FLOATING_ICONS[rng.random_range(0..FLOATING_ICONS.len())],
            })
            .collect();

        // Moon halo: a bright disc blurred once, added every frame.
        let side = (2.0 * (MOON_RADIUS + MOON_GLOW_MARGIN) * scale).round().max(1.0) as usize;
        let mut src = FrameBuffer::new(side, side);
        let lut = GammaLut::new();
        let c = side as f32 / 2.0;
        fill_disc(&mut src, c, c, MOON_RADIUS * 1.3 * scale, rgb(theme::MOON), 0.6, &lut);
        let mut tmp = FrameBuffer::new(side, side);
        let mut moon_glow = FrameBuffer::new(side, side);
        box_blur_rgb(&src, &mut tmp, &mut moon_glow, (MOON_GLOW_MARGIN * 0.5 * scale).round().max(1.0) as usize)?;

        Ok(Self { stars, big_stars, icons, moon_glow, scale })
    }

    #[cfg(test)]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    #[cfg(test)]
    pub fn big_stars(&self) -> &[BigStar] {
        &self.big_stars
    }

    #[cfg(test)]
    pub fn floating_icons(&self) -> &[FloatingIcon] {
        &self.icons
    }

    /// Paint the whole frame. `t` is seconds since start.
    pub fn render(&self, fb: &mut FrameBuffer, t: f32, lut: &GammaLut) {
        let s = self.scale;
        let (w, h) = (fb.width as f32, fb.height as f32);
        vertical_gradient(fb, 0, 0, fb.width as i32, fb.height as i32, rgb(theme::NIGHT_DARK), rgb(theme::NIGHT), lut);

        // Moon + glow, top right
        let (mx, my) = (w - 70.0 * s, 70.0 * s);
        let half = self.moon_glow.width as i32 / 2;
        add_glow(fb, &self.moon_glow, mx as i32 - half, my as i32 - half);
        fill_disc(fb, mx, my, MOON_RADIUS * s, rgb(theme::MOON), 0.95, lut);

        let white = rgb(theme::WHITE);
        for star in &self.stars {
            let a = 0.3 + 0.7 * twinkle(t, star.delay, star.duration);
            fill_disc(fb, star.left / 100.0 * w, star.top / 100.0 * h, star.size * 0.5 * s, white, a, lut);
        }

        let gold = rgb(theme::LIGHT_GOLD);
        for star in &self.big_stars {
            let a = 0.5 + 0.5 * twinkle(t, star.delay, 2.0);
            draw_star(fb, star.left / 100.0 * w, star.top / 100.0 * h, 8.0 * s, gold, a, lut);
        }

        // Icons rise from below the bottom edge to above the top, then loop
        for icon in &self.icons {
            if t < icon.delay { continue; }
            let phase = ((t - icon.delay) / icon.duration).fract();
            let size = 32.0 * s;
            let y = h + size - phase * (h + 2.0 * size);
            let sway = ((t - icon.delay) * 0.8).sin() * 10.0 * s;
            let a = 0.25 * (phase * PI).sin();
            draw_icon(fb, icon.icon, icon.left / 100.0 * w + sway, y, size, a, lut);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Snowflake {
    pub left: f32,      // %
    pub size: f32,      // px, [2, 5)
    pub duration: f32,  // s, [6, 14)
    pub delay: f32,     // s
    pub sway: f32,      // px of sideways drift
}

pub struct Snowfall {
    flakes: Vec<Snowflake>,
}

impl Snowfall {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let flakes = (0..SNOWFLAKE_COUNT)
            .map(|_| Snowflake {
                left: rng.random_range(0.0..100.0),
                size: rng.random_range(2.0..5.0),
                duration: rng.random_range(6.0..14.0),
                delay: rng.random_range(0.0..10.0),
                sway: rng.random_range(10.0..30.0),
            })
            .collect();
        Self { flakes }
    }

    #[cfg(test)]
    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    pub fn render(&self, fb: &mut FrameBuffer, t: f32, scale: f32, lut: &GammaLut) {
        let (w, h) = (fb.width as f32, fb.height as f32);
        let white = rgb(theme::WHITE);
        for f in &self.flakes {
            // Negative delay semantics: every flake is already mid-fall at t = 0
            let phase = ((t + f.delay) / f.duration).fract();
            let x = f.left / 100.0 * w + (phase * 2.0 * PI * 2.0).sin() * f.sway * scale;
            let y = -10.0 * scale + phase * (h + 20.0 * scale);
            fill_disc(fb, x, y, f.size * 0.5 * scale, white, 0.8, lut);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    pub icon: Icon,
    pub left: f32,  // %
    pub top: f32,   // %
    pub size: f32,  // px
}

const DECORATIONS: [Decoration; 8] = [
    Decoration { icon: Icon::Tree, left: 4.0, top: 78.0, size: 72.0 },
    Decoration { icon: Icon::Tree, left: 94.0, top: 74.0, size: 64.0 },
    Decoration { icon: Icon::Gift, left: 9.0, top: 90.0, size: 36.0 },
    Decoration { icon: Icon::Gift, left: 89.0, top: 88.0, size: 40.0 },
    Decoration { icon: Icon::Sparkle, left: 12.0, top: 20.0, size: 24.0 },
    Decoration { icon: Icon::Sparkle, left: 86.0, top: 34.0, size: 20.0 },
    Decoration { icon: Icon::Star, left: 20.0, top: 8.0, size: 18.0 },
    Decoration { icon: Icon::Star, left: 70.0, top: 14.0, size: 14.0 },
];

/// Fixed ornaments around the edges of the view.
pub struct FestiveDecorations;

impl FestiveDecorations {
    /// What shows at a given logical view width.
    pub fn visible(view_width: f32) -> Vec<Decoration> {
        let wide = view_width >= WIDE_VIEW;
        DECORATIONS
            .iter()
            .copied()
            .filter(|d| wide || !matches!(d.icon, Icon::Tree | Icon::Gift))
            .collect()
    }

    pub fn render(fb: &mut FrameBuffer, t: f32, scale: f32, lut: &GammaLut) {
        let (w, h) = (fb.width as f32, fb.height as f32);
        for (i, d) in Self::visible(w / scale).into_iter().enumerate() {
            let (x, y) = (d.left / 100.0 * w, d.top / 100.0 * h);
            match d.icon {
                Icon::Sparkle => {
                    let a = 0.4 + 0.6 * twinkle(t, i as f32 * 0.4, 1.5);
                    draw_sparkle(fb, x, y, d.size * 0.5 * scale, rgb(theme::GOLD), a, lut);
                }
                icon => draw_icon(fb, icon, x, y, d.size * scale, 0.7, lut),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starry_layers_have_fixed_counts_and_bounded_parameters() {
        let bg = StarryBackground::new(3, 1.0).unwrap();
        assert_eq!(bg.stars().len(), STAR_COUNT);
        assert_eq!(bg.big_stars().len(), BIG_STAR_COUNT);
        assert_eq!(bg.floating_icons().len(), FLOATING_ICON_COUNT);
        for s in bg.stars() {
            assert!((0.0..100.0).contains(&s.left) && (0.0..100.0).contains(&s.top));
            assert!((1.0..4.0).contains(&s.size));
            assert!((0.0..3.0).contains(&s.delay));
            assert!((1.0..3.0).contains(&s.duration));
        }
        assert!(bg.big_stars().iter().all(|s| (0.0..60.0).contains(&s.top)));
        for i in bg.floating_icons() {
            assert!((5.0..95.0).contains(&i.left));
            assert!((0.0..5.0).contains(&i.delay));
            assert!((15.0..25.0).contains(&i.duration));
            assert!(FLOATING_ICONS.contains(&i.icon));
        }
    }

    #[test]
    fn snowfall_bounds() {
        let snow = Snowfall::new(11);
        assert_eq!(snow.flakes().len(), SNOWFLAKE_COUNT);
        for f in snow.flakes() {
            assert!((2.0..5.0).contains(&f.size));
            assert!((6.0..14.0).contains(&f.duration));
        }
    }

    #[test]
    fn side_trees_and_gifts_need_a_wide_view() {
        let narrow = FestiveDecorations::visible(480.0);
        assert!(narrow.iter().all(|d| !matches!(d.icon, Icon::Tree | Icon::Gift)));
        assert!(!narrow.is_empty());
        let wide = FestiveDecorations::visible(768.0);
        assert_eq!(wide.len(), DECORATIONS.len());
    }

    #[test]
    fn background_paints_the_whole_frame() {
        let lut = GammaLut::new();
        let bg = StarryBackground::new(1, 1.0).unwrap();
        let mut fb = FrameBuffer::new(240, 360);
        bg.render(&mut fb, 1.5, &lut);
        Snowfall::new(1).render(&mut fb, 1.5, 1.0, &lut);
        // Gradient reaches every row; nothing is left at pure black.
        assert!(fb.pixels.iter().all(|p| *p != 0));
    }
}

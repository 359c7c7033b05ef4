// FX: brush sparkles, the reveal celebration burst, and confetti.
// Visual outcomes:
// - Warm sparkles spawn under the pointer while the foil is being scratched and fade quickly.
// - On reveal: a gold flash, three expanding rings, 150 particles flying out from the
//   center, and "Merry Christmas" text; all of it is gone after 7 seconds.
// - Confetti rains from the top edge for 4 seconds.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::compose::add_saturating;
use crate::draw::{draw_ring, draw_text_centered, fill_disc, fill_rect_alpha, fill_triangle};
use crate::gamma::GammaLut;
use crate::icons::{draw_sparkle, draw_star, Icon, draw_icon};
use crate::theme::{self, pack, rgb};
use crate::timer::Deferred;
use crate::types::FrameBuffer;

// ----------------------------- brush sparkles ------------------------------------------

/// One sparkle. Visual: small glowing dot that moves a bit and fades out.
pub struct Particle {
    pub x: f32, pub y: f32,        // position in device pixels
    pub vx: f32, pub vy: f32,      // velocity in px/sec
    pub life: f32,                 // remaining lifetime in seconds
    pub max_life: f32,             // initial lifetime (for fade)
    pub energy: f32,               // brightness multiplier (0..1)
}

impl Particle {
    #[inline] fn alive(&self) -> bool { self.life > 0.0 }
}

/// Additive warm glows following the brush.
pub struct Sparkles {
    rng: StdRng,
    particles: Vec<Particle>,
    max_particles: usize,
}

impl Sparkles {
    pub fn new(max_particles: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            particles: Vec::with_capacity(max_particles),
            max_particles,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Spawn up to `count` sparkles at (x,y), never exceeding the cap.
    pub fn spawn(&mut self, x: f32, y: f32, count: usize) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles { break; }
            let speed = self.rng.random_range(30.0..90.0);
            let angle = self.rng.random_range(0.0..TAU);
            let max_life = self.rng.random_range(0.35..0.75);
            self.particles.push(Particle {
                x, y,
                vx: speed * angle.cos(),
                vy: speed * angle.sin() - self.rng.random_range(0.0..20.0), // slight upward bias
                life: max_life,
                max_life,
                energy: self.rng.random_range(0.6..1.0),
            });
        }
    }

    /// Step the simulation by `dt` seconds and draw what is still alive.
    pub fn update_and_render(&mut self, fb: &mut FrameBuffer, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vx *= 0.98;
            p.vy = p.vy * 0.98 + 10.0 * dt; // gravity-ish
            p.life -= dt;

            if p.alive() {
                let life01 = (p.life / p.max_life).clamp(0.0, 1.0);
                let radius = (6.0 * life01 + 2.0) as i32;            // 2..8 px
                let strength = (0.9 * p.energy * life01).clamp(0.0, 1.0);
                additive_disc(fb, p.x as i32, p.y as i32, radius, (255, 200, 80), strength);
                i += 1;
            } else {
                self.particles.swap_remove(i);
            }
        }
    }
}

/// Soft round glow with Gaussian falloff, added onto the frame.
fn additive_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, base: (u8, u8, u8), strength: f32) {
    if radius <= 0 { return; }
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;
    for y in (cy - radius)..=(cy + radius) {
        if y < 0 || y as usize >= fb.height { continue; }
        for x in (cx - radius)..=(cx + radius) {
            if x < 0 || x as usize >= fb.width { continue; }
            let (dx, dy) = ((x - cx) as f32, (y - cy) as f32);
            let d2 = dx * dx + dy * dy;
            if d2 > r2 { continue; }
            let w = (-d2 / denom).exp() * strength;
            let q = |c: u8| (c as f32 * w).round().clamp(0.0, 255.0) as u8;
            let idx = y as usize * fb.width + x as usize;
            fb.pixels[idx] = add_saturating(fb.pixels[idx], pack(q(base.0), q(base.1), q(base.2)));
        }
    }
}

// ----------------------------- celebration burst ---------------------------------------

pub const BURST_COUNT: usize = 150;
pub const BURST_LIFETIME: Duration = Duration::from_secs(7);
pub const FLASH_DURATION: Duration = Duration::from_millis(400);
const RING_COUNT: usize = 3;
const RING_DURATION: f32 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstShape {
    Circle,
    Star,
    Heart,
    Sparkle,
}

#[derive(Clone, Debug)]
pub struct BurstParticle {
    pub angle: f32,     // radians, [0, TAU)
    pub velocity: f32,  // travel in vw, [6, 12)
    pub size: f32,      // px, [5, 20)
    pub duration: f32,  // seconds, [2.5, 4.5)
    pub color: u32,
    pub shape: BurstShape,
}

fn burst_palette() -> [u32; 7] {
    [
        rgb((350.0, 75.0, 55.0)),
        rgb(theme::GOLD),
        rgb(theme::BRIGHT_GREEN),
        rgb(theme::WHITE),
        rgb(theme::PURPLE),
        rgb(theme::BLUE),
        rgb(theme::LIGHT_GOLD),
    ]
}

pub struct Celebration {
    rng: StdRng,
    particles: Vec<BurstParticle>,
    started: Option<Instant>,
    flash: Option<Deferred>,
    clear: Option<Deferred>,
    rings: usize,
}

impl Celebration {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), particles: Vec::new(), started: None, flash: None, clear: None, rings: 0 }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.as_ref().is_some_and(Deferred::is_pending)
    }

    #[cfg(test)]
    pub fn rings(&self) -> usize {
        self.rings
    }

    /// Boom. Visual: flash, rings and a fresh set of particles from the center.
    pub fn trigger(&mut self, now: Instant) {
        let palette = burst_palette();
        let shapes = [BurstShape::Circle, BurstShape::Star, BurstShape::Heart, BurstShape::Sparkle];
        self.particles = (0..BURST_COUNT)
            .map(|_| BurstParticle {
                angle: self.rng.random_range(0.0..TAU),
                velocity: self.rng.random_range(6.0..12.0),
                size: self.rng.random_range(5.0..20.0),
                duration: self.rng.random_range(2.5..4.5),
                color: palette[self.rng.random_range(0..palette.len())],
                shape: shapes[self.rng.random_range(0..shapes.len())],
            })
            .collect();
        self.rings = RING_COUNT;
        self.started = Some(now);
        self.flash = Some(Deferred::after(now, FLASH_DURATION));
        self.clear = Some(Deferred::after(now, BURST_LIFETIME));
        debug!(particles = self.particles.len(), "celebration triggered");
    }

    /// Retire the flash and, after the lifetime, everything else.
    pub fn update(&mut self, now: Instant) {
        if let Some(f) = self.flash.as_mut() {
            f.fire(now);
        }
        if self.clear.as_mut().is_some_and(|c| c.fire(now)) {
            self.particles.clear();
            self.rings = 0;
            self.started = None;
            self.flash = None;
            self.clear = None;
            debug!("celebration cleared");
        }
    }

    /// Draw over the whole frame. `scale` is device px per logical px.
    pub fn render(&self, fb: &mut FrameBuffer, now: Instant, scale: f32, lut: &GammaLut) {
        let Some(started) = self.started else { return };
        let t = now.saturating_duration_since(started).as_secs_f32();
        let (w, h) = (fb.width as f32, fb.height as f32);
        let (cx, cy) = (w / 2.0, h / 2.0);

        if self.is_flashing() {
            fill_rect_alpha(fb, 0, 0, fb.width as i32, fb.height as i32, rgb(theme::GOLD), 0.3, lut);
        }

        let palette = burst_palette();
        for i in 0..self.rings {
            let rt = ((t - i as f32 * 0.1) / RING_DURATION).clamp(0.0, 1.0);
            if rt <= 0.0 || rt >= 1.0 { continue; }
            let radius = rt * w.max(h) * 0.6;
            draw_ring(fb, cx, cy, radius, 4.0 * scale, palette[i % palette.len()], 1.0 - rt, lut);
        }

        for p in &self.particles {
            let pt = (t / p.duration).clamp(0.0, 1.0);
            if pt >= 1.0 { continue; }
            let eased = 1.0 - (1.0 - pt).powi(3);
            let dist = p.velocity / 100.0 * w * 4.0 * eased;
            let x = cx + p.angle.cos() * dist;
            let y = cy + p.angle.sin() * dist + 0.5 * 60.0 * scale * t * t * pt; // drifts down as it slows
            let alpha = 1.0 - pt;
            let size = p.size * scale;
            match p.shape {
                BurstShape::Circle => {
                    fill_disc(fb, x, y, size * 0.9, p.color, alpha * 0.35, lut);
                    fill_disc(fb, x, y, size * 0.5, p.color, alpha, lut);
                }
                BurstShape::Star => draw_star(fb, x, y, size * 0.5, rgb(theme::GOLD), alpha, lut),
                BurstShape::Heart => draw_icon(fb, Icon::Heart, x, y, size, alpha, lut),
                BurstShape::Sparkle => draw_sparkle(fb, x, y, size * 0.5, rgb(theme::LIGHT_GOLD), alpha, lut),
            }
        }

        let text_scale = (3.0 * scale).round().max(1.0) as i32;
        let ty = (h * 0.25) as i32;
        let pop = (t / 0.6).clamp(0.0, 1.0);
        if pop > 0.3 {
            let gold = rgb(theme::GOLD);
            draw_text_centered(fb, cx as i32, ty, "Merry Christmas!", text_scale, gold);
            draw_text_centered(fb, cx as i32, ty + text_scale * 10, "& Happy New Year", text_scale, gold);
        }
    }
}

// ----------------------------- confetti -------------------------------------------------

pub const CONFETTI_COUNT: usize = 100;
pub const CONFETTI_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Clone, Debug)]
pub struct ConfettiPiece {
    pub left: f32,      // % of view width, [0, 100)
    pub size: f32,      // px, [6, 18)
    pub duration: f32,  // seconds, [2, 4)
    pub delay: f32,     // seconds, [0, 0.5)
    pub rotation: f32,  // degrees, [0, 360)
    pub round: bool,
    pub color: u32,
}

fn confetti_palette() -> [u32; 6] {
    [
        rgb(theme::CHRISTMAS_RED),
        rgb(theme::GOLD),
        rgb(theme::GREEN),
        rgb(theme::WHITE),
        rgb(theme::LIGHT_RED),
        rgb(theme::LIGHT_GOLD),
    ]
}

pub struct Confetti {
    rng: StdRng,
    pieces: Vec<ConfettiPiece>,
    started: Option<Instant>,
    clear: Option<Deferred>,
}

impl Confetti {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), pieces: Vec::new(), started: None, clear: None }
    }

    #[cfg(test)]
    pub fn pieces(&self) -> &[ConfettiPiece] {
        &self.pieces
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    pub fn trigger(&mut self, now: Instant) {
        let palette = confetti_palette();
        self.pieces = (0..CONFETTI_COUNT)
            .map(|_| ConfettiPiece {
                left: self.rng.random_range(0.0..100.0),
                size: self.rng.random_range(6.0..18.0),
                duration: self.rng.random_range(2.0..4.0),
                delay: self.rng.random_range(0.0..0.5),
                rotation: self.rng.random_range(0.0..360.0),
                round: self.rng.random_bool(0.5),
                color: palette[self.rng.random_range(0..palette.len())],
            })
            .collect();
        self.started = Some(now);
        self.clear = Some(Deferred::after(now, CONFETTI_LIFETIME));
    }

    pub fn update(&mut self, now: Instant) {
        if self.clear.as_mut().is_some_and(|c| c.fire(now)) {
            self.pieces.clear();
            self.started = None;
            self.clear = None;
        }
    }

    pub fn render(&self, fb: &mut FrameBuffer, now: Instant, scale: f32, lut: &GammaLut) {
        let Some(started) = self.started else { return };
        let t = now.saturating_duration_since(started).as_secs_f32();
        let (w, h) = (fb.width as f32, fb.height as f32);
        for p in &self.pieces {
            let pt = ((t - p.delay) / p.duration).clamp(0.0, 1.0);
            if pt <= 0.0 || pt >= 1.0 { continue; }
            let eased = 1.0 - (1.0 - pt).powi(2);
            let x = p.left / 100.0 * w;
            let y = -20.0 * scale + (h + 20.0 * scale) * eased;
            let half = p.size * scale / 2.0;
            let alpha = 1.0 - pt;
            if p.round {
                fill_disc(fb, x, y, half, p.color, alpha, lut);
            } else {
                // Spinning square: two triangles around the rotated corners
                let a = (p.rotation + 720.0 * pt).to_radians();
                let corner = |k: f32| {
                    let ang = a + k * std::f32::consts::FRAC_PI_2 + std::f32::consts::FRAC_PI_4;
                    (x + ang.cos() * half * std::f32::consts::SQRT_2, y + ang.sin() * half * std::f32::consts::SQRT_2)
                };
                let (c0, c1, c2, c3) = (corner(0.0), corner(1.0), corner(2.0), corner(3.0));
                fill_triangle(fb, c0, c1, c2, p.color, alpha, lut);
                fill_triangle(fb, c0, c2, c3, p.color, alpha, lut);
            }
        }
    }
}

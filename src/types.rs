// Core types shared by the renderer, the scratch surface and the page.

/// What the window shows. One `u32` per device pixel.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // device pixels
    pub height: usize,     // device pixels
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    #[cfg(test)]
    pub fn fill(&mut self, color: u32) {
        for p in &mut self.pixels { *p = color; }
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height { return None; }
        Some(self.pixels[y * self.width + x])
    }
}

/// A position in logical (device-independent) pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }
}

/// Axis-aligned rectangle in logical pixels, like a DOM bounding client rect.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// True when either side is zero (or negative): the host has not laid it out yet.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.y >= self.top
            && p.x < self.left + self.width
            && p.y < self.top + self.height
    }

    /// Viewport coordinates -> coordinates local to this rect.
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.left, p.y - self.top)
    }
}

/// Precomputed circular "cut" stamp we dab into the scratch canvas.
/// weight 1.0 = fully erase the sample under it, 0.0 = leave it alone.
pub struct Stamp {
    pub radius: i32,       // device pixels from center to edge of the kernel
    pub weights: Vec<f32>, // (2r+1)*(2r+1), centered kernel
}

impl Stamp {
    /// Hard-edged disc: every kernel cell whose center lies inside `radius` is cut.
    pub fn disc(radius: f32) -> Self {
        let r = radius.max(0.0).ceil() as i32;
        let r2 = radius * radius;
        let d = 2 * r + 1;
        let mut weights = Vec::with_capacity((d * d) as usize);
        for y in -r..=r {
            for x in -r..=r {
                let d2 = (x * x + y * y) as f32;
                weights.push(if d2 <= r2 { 1.0 } else { 0.0 });
            }
        }
        Self { radius: r, weights }
    }

    pub fn side(&self) -> i32 {
        2 * self.radius + 1
    }

    /// How many cells this stamp cuts.
    #[cfg(test)]
    pub fn area(&self) -> usize {
        self.weights.iter().filter(|w| **w > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_stamp_area_tracks_circle_area() {
        let stamp = Stamp::disc(30.0);
        assert_eq!(stamp.side(), 61);
        let expected = std::f32::consts::PI * 900.0;
        let got = stamp.area() as f32;
        assert!((got - expected).abs() / expected < 0.02, "area {got} vs {expected}");
    }

    #[test]
    fn rect_maps_viewport_points_to_local() {
        let r = Rect::new(80.0, 220.0, 320.0, 320.0);
        assert!(r.contains(Point::new(80.0, 220.0)));
        assert!(!r.contains(Point::new(400.0, 300.0)));
        assert_eq!(r.to_local(Point::new(100.0, 250.0)), Point::new(20.0, 30.0));
        assert!(Rect::new(0.0, 0.0, 0.0, 320.0).is_empty());
    }
}

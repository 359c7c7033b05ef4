//! Scratch-to-reveal surface.
//!
//! Owns an opaque foil canvas laid over some concealed content. Dragging erases
//! discs out of the foil; after every erasure the canvas alpha is sampled and,
//! once more than [`REVEAL_THRESHOLD`] of the samples are transparent, the
//! surface latches into the revealed state, throws its canvas away and fires
//! the reveal callback. There is no way back.

use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::compose::{blit, composite_rgba};
use crate::draw::draw_text_centered;
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::icons::{Icon, draw_icon};
use crate::input::{PointerEvent, PointerInput};
use crate::raster::{SAMPLE_STRIDE, ScratchCanvas};
use crate::theme::{self, rgb};
use crate::types::{FrameBuffer, Rect, Stamp};
use crate::timer::Deferred;

/// Logical radius of the erasing brush.
pub const BRUSH_RADIUS: f32 = 30.0;
/// Reveal once the sampled transparent fraction is strictly above this.
pub const REVEAL_THRESHOLD: f32 = 0.40;
/// Delay before the single repaint attempt when the host reports a zero size.
pub const PAINT_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Instruction shown above the foil.
pub const CAPTION: &str = "Scratch to receive your gift";

/// What gets drawn, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Content,
    Foil,
    Caption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStatus {
    Painted,
    /// Host size was zero; one retry is scheduled.
    Deferred,
    /// No canvas could be acquired; the surface does nothing.
    Inert,
    /// Revealed or unmounted; painting is over for this instance.
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOutcome {
    Ignored,
    Erased { fraction: f32 },
    Revealed { fraction: f32 },
}

pub struct ScratchSurface {
    bounds: Rect,
    pixel_ratio: f32,
    canvas: Option<ScratchCanvas>,
    brush: Stamp,
    erased_fraction: f32,
    drawing: bool,
    revealed: bool,
    inert: bool,
    mounted: bool,
    retry: Option<Deferred>,
    on_reveal: Option<Box<dyn FnOnce()>>,
}

impl ScratchSurface {
    /// Mount a surface. Nothing is painted until [`ScratchSurface::initialize`].
    pub fn new(bounds: Rect, pixel_ratio: f32, on_reveal: impl FnOnce() + 'static) -> Self {
        Self {
            bounds,
            pixel_ratio,
            canvas: None,
            brush: Stamp::disc(BRUSH_RADIUS * pixel_ratio),
            erased_fraction: 0.0,
            drawing: false,
            revealed: false,
            inert: false,
            mounted: true,
            retry: None,
            on_reveal: Some(Box::new(on_reveal)),
        }
    }

    /// Host layout changed (or arrived). Takes effect at the next paint.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn erased_fraction(&self) -> f32 {
        self.erased_fraction
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[cfg(test)]
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    #[cfg(test)]
    pub fn canvas(&self) -> Option<&ScratchCanvas> {
        self.canvas.as_ref()
    }

    pub fn has_pending_paint(&self) -> bool {
        self.retry.as_ref().is_some_and(Deferred::is_pending)
    }

    /// Allocate the canvas and paint the foil, replacing any previous contents.
    /// A zero-sized host defers to a single retry after [`PAINT_RETRY_DELAY`].
    pub fn initialize(&mut self, now: Instant) -> PaintStatus {
        if self.revealed || !self.mounted {
            return PaintStatus::Retired;
        }
        if self.bounds.is_empty() {
            if !self.has_pending_paint() {
                debug!(bounds = ?self.bounds, "surface not laid out yet, deferring paint");
                self.retry = Some(Deferred::after(now, PAINT_RETRY_DELAY));
            }
            return PaintStatus::Deferred;
        }
        self.paint()
    }

    /// Same as a fresh initialize: the host resized, repaint the foil.
    pub fn resize(&mut self, now: Instant) -> PaintStatus {
        self.initialize(now)
    }

    /// Drive the deferred paint. Returns the paint result when the retry fired this call.
    pub fn poll(&mut self, now: Instant) -> Option<PaintStatus> {
        let fired = self.retry.as_mut().is_some_and(|t| t.fire(now));
        if !fired {
            return None;
        }
        self.retry = None;
        if self.bounds.is_empty() {
            warn!(bounds = ?self.bounds, "surface still has no size after retry; leaving it unpainted");
            return Some(PaintStatus::Deferred);
        }
        Some(self.paint())
    }

    /// Host view is going away: cancel the deferred paint and release the canvas.
    pub fn unmount(&mut self) {
        if let Some(t) = self.retry.as_mut() {
            t.cancel();
        }
        self.retry = None;
        self.canvas = None;
        self.drawing = false;
        self.mounted = false;
        debug!("scratch surface unmounted");
    }

    fn paint(&mut self) -> PaintStatus {
        match ScratchCanvas::new(self.bounds.width, self.bounds.height, self.pixel_ratio) {
            Ok(mut canvas) => {
                // A fresh paint supersedes any retry still waiting
                if let Some(t) = self.retry.take().as_mut() {
                    t.cancel();
                }
                canvas.paint_foil();
                self.brush = Stamp::disc(BRUSH_RADIUS * self.pixel_ratio);
                self.canvas = Some(canvas);
                self.erased_fraction = 0.0;
                self.inert = false;
                debug!(w = self.bounds.width, h = self.bounds.height, "foil painted");
                PaintStatus::Painted
            }
            Err(e) => {
                if !self.inert {
                    warn!(error = %e, "scratch surface is inert");
                }
                self.canvas = None;
                self.drawing = false;
                self.inert = true;
                PaintStatus::Inert
            }
        }
    }

    fn interactive(&self) -> bool {
        self.mounted && !self.revealed && self.canvas.is_some()
    }

    /// mousedown / touchstart
    pub fn begin_stroke(&mut self) {
        if self.interactive() {
            self.drawing = true;
        }
    }

    /// mouseup / mouseleave / touchend
    pub fn end_stroke(&mut self) {
        if self.interactive() {
            self.drawing = false;
        }
    }

    /// mousemove / touchmove: erase a brush disc under the pointer and re-sample.
    pub fn continue_stroke(&mut self, input: &PointerInput) -> StrokeOutcome {
        if !self.drawing || self.revealed {
            return StrokeOutcome::Ignored;
        }
        let Some(client) = input.client_point() else {
            return StrokeOutcome::Ignored;
        };
        let Some(canvas) = self.canvas.as_mut() else {
            return StrokeOutcome::Ignored;
        };

        let local = self.bounds.to_local(client);
        canvas.erase_stamp(local.x, local.y, &self.brush);
        let fraction = canvas.transparent_fraction(SAMPLE_STRIDE);
        self.erased_fraction = fraction;
        trace!(x = local.x, y = local.y, fraction, "scratched");

        if fraction > REVEAL_THRESHOLD && !self.revealed {
            self.reveal();
            return StrokeOutcome::Revealed { fraction };
        }
        StrokeOutcome::Erased { fraction }
    }

    pub fn handle_event(&mut self, event: &PointerEvent) -> StrokeOutcome {
        match event {
            PointerEvent::Down => {
                self.begin_stroke();
                StrokeOutcome::Ignored
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.end_stroke();
                StrokeOutcome::Ignored
            }
            PointerEvent::Move(input) => self.continue_stroke(input),
        }
    }

    fn reveal(&mut self) {
        self.revealed = true;
        self.drawing = false;
        self.canvas = None;
        if let Some(t) = self.retry.as_mut() {
            t.cancel();
        }
        self.retry = None;
        info!(fraction = self.erased_fraction, "gift revealed");
        if let Some(callback) = self.on_reveal.take() {
            callback();
        }
    }

    pub fn layers(&self) -> Vec<Layer> {
        if self.revealed {
            vec![Layer::Content]
        } else if self.canvas.is_some() {
            vec![Layer::Content, Layer::Foil, Layer::Caption]
        } else {
            vec![Layer::Content, Layer::Caption]
        }
    }

    /// Device-pixel size the concealed content must have to exactly fill the bounds.
    pub fn content_size(&self) -> (usize, usize) {
        (
            (self.bounds.width * self.pixel_ratio).round().max(0.0) as usize,
            (self.bounds.height * self.pixel_ratio).round().max(0.0) as usize,
        )
    }

    /// Draw the surface into the window buffer.
    pub fn render(&self, fb: &mut FrameBuffer, content: &FrameBuffer, lut: &GammaLut) -> Result<(), Error> {
        let (cw, ch) = self.content_size();
        if content.width != cw || content.height != ch {
            return Err(Error::SizeMismatch(format!(
                "scratch content {}x{} for a {cw}x{ch} surface",
                content.width, content.height
            )));
        }
        let s = self.pixel_ratio;
        let ox = (self.bounds.left * s).round() as i32;
        let oy = (self.bounds.top * s).round() as i32;

        for layer in self.layers() {
            match layer {
                Layer::Content => blit(fb, content, ox, oy),
                Layer::Foil => {
                    if let Some(canvas) = &self.canvas {
                        composite_rgba(fb, canvas.image(), ox, oy, lut);
                    }
                }
                Layer::Caption => {
                    let cx = (self.bounds.left + self.bounds.width / 2.0) * s;
                    draw_icon(fb, Icon::Santa, cx, (self.bounds.top - 62.0) * s, 44.0 * s, 1.0, lut);
                    let text_scale = (2.0 * s).round().max(1.0) as i32;
                    draw_text_centered(fb, cx as i32, ((self.bounds.top - 30.0) * s) as i32, CAPTION, text_scale, rgb(theme::WHITE));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const BOUNDS: Rect = Rect::new(80.0, 220.0, 320.0, 320.0);

    fn surface() -> (ScratchSurface, Rc<Cell<u32>>) {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mut s = ScratchSurface::new(BOUNDS, 1.0, move || counter.set(counter.get() + 1));
        assert_eq!(s.initialize(Instant::now()), PaintStatus::Painted);
        (s, fired)
    }

    /// Local grid of 25 non-overlapping brush discs, converted to viewport coordinates.
    fn grid() -> Vec<(f32, f32)> {
        let mut v = Vec::new();
        for j in 0..5 {
            for i in 0..5 {
                v.push((BOUNDS.left + 30.0 + 60.0 * i as f32, BOUNDS.top + 30.0 + 60.0 * j as f32));
            }
        }
        v
    }

    fn scratch_at(s: &mut ScratchSurface, x: f32, y: f32) -> StrokeOutcome {
        s.begin_stroke();
        let out = s.continue_stroke(&PointerInput::mouse(x, y));
        s.end_stroke();
        out
    }

    #[test]
    fn one_brush_disc_stays_below_the_threshold() {
        let (mut s, fired) = surface();
        let out = scratch_at(&mut s, 240.0, 380.0);
        let StrokeOutcome::Erased { fraction } = out else { panic!("{out:?}") };
        assert!(fraction > 0.02 && fraction < 0.035, "{fraction}");
        assert!(!s.is_revealed());
        assert_eq!(fired.get(), 0);
        assert_eq!(s.layers(), vec![Layer::Content, Layer::Foil, Layer::Caption]);
    }

    #[test]
    fn enough_discs_reveal_exactly_once() {
        let (mut s, fired) = surface();
        let mut revealed_at = None;
        for (n, (x, y)) in grid().into_iter().enumerate() {
            if let StrokeOutcome::Revealed { fraction } = scratch_at(&mut s, x, y) {
                assert!(fraction > REVEAL_THRESHOLD);
                revealed_at.get_or_insert(n);
            }
        }
        // ~2.8% per disc: the 15th disc is the first that can push past 40%.
        let n = revealed_at.expect("never revealed");
        assert!((13..=16).contains(&n), "revealed after disc #{n}");
        assert!(s.is_revealed());
        assert_eq!(fired.get(), 1);
        assert_eq!(s.layers(), vec![Layer::Content]);
        assert!(s.canvas().is_none());
    }

    #[test]
    fn nothing_changes_after_reveal() {
        let (mut s, fired) = surface();
        for (x, y) in grid() {
            scratch_at(&mut s, x, y);
        }
        let before = s.erased_fraction();
        s.begin_stroke();
        assert!(!s.is_drawing());
        assert_eq!(s.continue_stroke(&PointerInput::mouse(100.0, 250.0)), StrokeOutcome::Ignored);
        assert_eq!(s.handle_event(&PointerEvent::Down), StrokeOutcome::Ignored);
        assert_eq!(
            s.handle_event(&PointerEvent::Move(PointerInput::mouse(120.0, 260.0))),
            StrokeOutcome::Ignored
        );
        assert_eq!(s.erased_fraction(), before);
        assert_eq!(s.initialize(Instant::now()), PaintStatus::Retired);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn moves_without_a_pressed_pointer_do_not_erase() {
        let (mut s, _) = surface();
        assert_eq!(s.continue_stroke(&PointerInput::mouse(200.0, 300.0)), StrokeOutcome::Ignored);
        assert_eq!(s.handle_event(&PointerEvent::Down), StrokeOutcome::Ignored);
        assert!(s.is_drawing());
        assert!(matches!(
            s.handle_event(&PointerEvent::Move(PointerInput::mouse(200.0, 300.0))),
            StrokeOutcome::Erased { .. }
        ));
        s.handle_event(&PointerEvent::Leave);
        assert!(!s.is_drawing());
        assert_eq!(s.continue_stroke(&PointerInput::mouse(260.0, 300.0)), StrokeOutcome::Ignored);
    }

    #[test]
    fn mouse_and_single_touch_erase_the_same_pixels() {
        let (mut a, _) = surface();
        let (mut b, _) = surface();
        a.begin_stroke();
        b.begin_stroke();
        let ma = a.continue_stroke(&PointerInput::mouse(173.0, 301.0));
        let mb = b.continue_stroke(&PointerInput::Touch {
            touches: vec![Point::new(173.0, 301.0), Point::new(300.0, 500.0)],
        });
        assert_eq!(ma, mb);
        assert_eq!(a.canvas().unwrap().image(), b.canvas().unwrap().image());
        // Local (93, 81) is clear, the second finger's spot is not.
        assert_eq!(a.canvas().unwrap().alpha_at(93.0, 81.0), Some(0));
        assert_eq!(b.canvas().unwrap().alpha_at(220.0, 280.0), Some(255));
        assert_eq!(b.continue_stroke(&PointerInput::Touch { touches: vec![] }), StrokeOutcome::Ignored);
    }

    #[test]
    fn zero_size_host_is_painted_by_the_deferred_retry() {
        let t0 = Instant::now();
        let mut s = ScratchSurface::new(Rect::default(), 1.0, || {});
        assert_eq!(s.initialize(t0), PaintStatus::Deferred);
        assert!(s.canvas().is_none());
        assert!(s.has_pending_paint());

        // Layout arrives before the timer.
        s.set_bounds(BOUNDS);
        assert_eq!(s.poll(t0 + Duration::from_millis(50)), None);
        assert_eq!(s.poll(t0 + PAINT_RETRY_DELAY), Some(PaintStatus::Painted));
        assert_eq!(s.canvas().unwrap().transparent_fraction(SAMPLE_STRIDE), 0.0);
        assert!(!s.has_pending_paint());
        assert_eq!(s.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn early_repaint_disarms_the_retry() {
        let t0 = Instant::now();
        let mut s = ScratchSurface::new(Rect::default(), 1.0, || {});
        assert_eq!(s.initialize(t0), PaintStatus::Deferred);
        s.set_bounds(BOUNDS);
        assert_eq!(s.resize(t0 + Duration::from_millis(10)), PaintStatus::Painted);
        assert!(!s.has_pending_paint());

        s.begin_stroke();
        let StrokeOutcome::Erased { fraction } = s.continue_stroke(&PointerInput::mouse(240.0, 380.0)) else {
            panic!("stroke ignored");
        };
        assert_eq!(s.poll(t0 + PAINT_RETRY_DELAY), None);
        assert_eq!(s.erased_fraction(), fraction);
        assert_eq!(s.canvas().unwrap().transparent_fraction(SAMPLE_STRIDE), fraction);
    }

    #[test]
    fn retry_happens_only_once() {
        let t0 = Instant::now();
        let mut s = ScratchSurface::new(Rect::default(), 1.0, || {});
        s.initialize(t0);
        assert_eq!(s.poll(t0 + PAINT_RETRY_DELAY), Some(PaintStatus::Deferred));
        s.set_bounds(BOUNDS);
        assert_eq!(s.poll(t0 + Duration::from_secs(5)), None);
        assert!(s.canvas().is_none());
        // An explicit initialize (e.g. a resize) still works.
        assert_eq!(s.resize(t0 + Duration::from_secs(5)), PaintStatus::Painted);
    }

    #[test]
    fn unmount_cancels_the_deferred_paint() {
        let t0 = Instant::now();
        let mut s = ScratchSurface::new(Rect::default(), 1.0, || {});
        s.initialize(t0);
        s.unmount();
        s.set_bounds(BOUNDS);
        assert_eq!(s.poll(t0 + Duration::from_secs(1)), None);
        assert!(s.canvas().is_none());
        s.begin_stroke();
        assert!(!s.is_drawing());
    }

    #[test]
    fn unusable_canvas_degrades_to_an_inert_overlay() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let mut s = ScratchSurface::new(BOUNDS, f32::NAN, move || flag.set(true));
        assert_eq!(s.initialize(Instant::now()), PaintStatus::Inert);
        assert!(s.is_inert());
        s.begin_stroke();
        for (x, y) in grid() {
            assert_eq!(s.continue_stroke(&PointerInput::mouse(x, y)), StrokeOutcome::Ignored);
        }
        assert!(!s.is_revealed());
        assert!(!fired.get());
        assert_eq!(s.layers(), vec![Layer::Content, Layer::Caption]);
    }

    #[test]
    fn render_puts_foil_over_content_until_revealed() {
        let lut = GammaLut::new();
        let (mut s, _) = surface();
        let (cw, ch) = s.content_size();
        let mut content = FrameBuffer::new(cw, ch);
        content.fill(0x0000_FF00);

        let mut fb = FrameBuffer::new(480, 720);
        s.render(&mut fb, &content, &lut).unwrap();
        let foil = rgb(theme::CHRISTMAS_RED);
        assert_eq!(fb.get(85, 225), Some(foil));

        for (x, y) in grid() {
            scratch_at(&mut s, x, y);
        }
        let mut fb = FrameBuffer::new(480, 720);
        s.render(&mut fb, &content, &lut).unwrap();
        assert_eq!(fb.get(85, 225), Some(0x0000_FF00));
        assert_eq!(fb.get(80 + 319, 220 + 319), Some(0x0000_FF00));

        let wrong = FrameBuffer::new(10, 10);
        assert!(matches!(s.render(&mut fb, &wrong, &lut), Err(Error::SizeMismatch(_))));
    }

    fn order_pair() -> impl Strategy<Value = (Vec<(f32, f32)>, Vec<(f32, f32)>)> {
        proptest::sample::subsequence(grid(), 1..=12)
            .prop_flat_map(|a| (Just(a.clone()), Just(a).prop_shuffle()))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Distinct discs erased in any order leave the same buffer and the same fraction.
        #[test]
        fn erasure_order_does_not_matter((a, b) in order_pair()) {
            let (mut sa, _) = surface();
            let (mut sb, _) = surface();
            for (x, y) in &a { scratch_at(&mut sa, *x, *y); }
            for (x, y) in &b { scratch_at(&mut sb, *x, *y); }
            prop_assert_eq!(sa.erased_fraction(), sb.erased_fraction());
            prop_assert!(!sa.is_revealed());
            prop_assert_eq!(sa.canvas().unwrap().image(), sb.canvas().unwrap().image());
        }
    }
}

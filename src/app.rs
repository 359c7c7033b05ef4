// The greeting page: gate first, then the gift card under its foil.
// One `update` + one `render` per frame, both driven by an explicit `Instant`.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, info};
use url::Url;

use crate::background::{FestiveDecorations, Snowfall, StarryBackground};
use crate::card::CardView;
use crate::draw::draw_text_centered;
use crate::error::Error;
use crate::export::{DownloadFolder, ShareTarget, share_blessing};
use crate::fx::{Celebration, Confetti, Sparkles};
use crate::gamma::GammaLut;
use crate::gate::Gate;
use crate::input::{PointerEvent, PointerTracker};
use crate::notice::NoticeBoard;
use crate::quotes::QuoteProvider;
use crate::scratch::{ScratchSurface, StrokeOutcome};
use crate::theme::{self, rgb};
use crate::types::{FrameBuffer, Point, Rect};

/// Logical size of the page.
pub const VIEW_WIDTH: f32 = 480.0;
pub const VIEW_HEIGHT: f32 = 720.0;
/// Where the scratch surface sits on the default page (logical).
pub const SURFACE_BOUNDS: Rect = Rect::new(80.0, 220.0, 320.0, 320.0);
const MAX_SPARKLES: usize = 600;

/// The surface stays horizontally centered on pages of any width.
fn surface_bounds(view_width: f32) -> Rect {
    Rect { left: ((view_width - SURFACE_BOUNDS.width) / 2.0).max(0.0), ..SURFACE_BOUNDS }
}

pub struct Config {
    pub page: Url,
    pub pixel_ratio: f32,
    pub seed: u64,
    pub quote_offset: usize,
    pub export_dir: PathBuf,
    pub background: Option<RgbaImage>,
}

/// Polled window state for one frame. Pointer is in logical px.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub pointer: Option<Point>,
    pub pressed: bool,
    pub scan: bool,
    pub share: bool,
    pub escape: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GiftPhase {
    Scratching,
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Gate,
    Gift(GiftPhase),
}

struct GiftCard {
    surface: ScratchSurface,
    revealed: Rc<Cell<bool>>,
    celebrated: bool,
    card: CardView,
    content: FrameBuffer,
    tracker: PointerTracker,
}

impl GiftCard {
    fn mount(card: CardView, bounds: Rect, pixel_ratio: f32, now: Instant, lut: &GammaLut) -> Self {
        let revealed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&revealed);
        let mut surface = ScratchSurface::new(bounds, pixel_ratio, move || flag.set(true));
        let status = surface.initialize(now);
        debug!(?status, "gift surface mounted");

        let (w, h) = surface.content_size();
        let mut content = FrameBuffer::new(w, h);
        card.render(&mut content, pixel_ratio, lut);
        Self { surface, revealed, celebrated: false, card, content, tracker: PointerTracker::new() }
    }

    fn phase(&self) -> GiftPhase {
        if self.surface.is_revealed() { GiftPhase::Revealed } else { GiftPhase::Scratching }
    }
}

impl Drop for GiftCard {
    fn drop(&mut self) {
        self.surface.unmount();
    }
}

enum Page {
    Gate(Gate),
    Gift(Box<GiftCard>),
}

pub struct App {
    page: Page,
    pixel_ratio: f32,
    frame: (usize, usize),
    quotes: QuoteProvider,
    background_image: Option<RgbaImage>,
    starry: StarryBackground,
    snow: Snowfall,
    sparkles: Sparkles,
    celebration: Celebration,
    confetti: Confetti,
    notices: NoticeBoard,
    downloads: DownloadFolder,
    share: Option<Box<dyn ShareTarget>>,
    lut: GammaLut,
    started: Instant,
    last_frame: Instant,
}

impl App {
    pub fn new(config: Config, now: Instant) -> Result<Self, Error> {
        let Config { page, pixel_ratio, seed, quote_offset, export_dir, background } = config;
        let lut = GammaLut::new();
        let gate = Gate::new(page.clone(), pixel_ratio)?;
        let passed = gate.is_passed();
        let mut app = Self {
            page: Page::Gate(gate),
            pixel_ratio,
            frame: (
                (VIEW_WIDTH * pixel_ratio).round() as usize,
                (VIEW_HEIGHT * pixel_ratio).round() as usize,
            ),
            quotes: QuoteProvider::new(quote_offset),
            background_image: background,
            starry: StarryBackground::new(seed, pixel_ratio)?,
            snow: Snowfall::new(seed.wrapping_add(1)),
            sparkles: Sparkles::new(MAX_SPARKLES, seed.wrapping_add(2)),
            celebration: Celebration::new(seed.wrapping_add(3)),
            confetti: Confetti::new(seed.wrapping_add(4)),
            notices: NoticeBoard::new(),
            downloads: DownloadFolder::new(export_dir),
            share: None,
            lut,
            started: now,
            last_frame: now,
        };
        if passed {
            info!(url = %page, "opened through the QR code");
            app.open_gift(now);
        }
        Ok(app)
    }

    /// Install a native share sheet; without one, exports go to the download folder.
    pub fn set_share_target(&mut self, target: Box<dyn ShareTarget>) {
        self.share = Some(target);
    }

    pub fn stage(&self) -> Stage {
        match &self.page {
            Page::Gate(_) => Stage::Gate,
            Page::Gift(gift) => Stage::Gift(gift.phase()),
        }
    }

    #[cfg(test)]
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    #[cfg(test)]
    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    #[cfg(test)]
    pub fn confetti(&self) -> &Confetti {
        &self.confetti
    }

    #[cfg(test)]
    pub fn erased_fraction(&self) -> Option<f32> {
        match &self.page {
            Page::Gift(gift) => Some(gift.surface.erased_fraction()),
            Page::Gate(_) => None,
        }
    }

    /// True while a stroke is erasing foil.
    pub fn is_scratching(&self) -> bool {
        matches!(&self.page, Page::Gift(gift) if gift.surface.is_drawing())
    }

    /// Device pixels of the whole page.
    pub fn frame_size(&self) -> (usize, usize) {
        self.frame
    }

    /// Logical size of the page.
    fn view(&self) -> (f32, f32) {
        (self.frame.0 as f32 / self.pixel_ratio, self.frame.1 as f32 / self.pixel_ratio)
    }

    /// The window changed size (device px). Re-centers the surface and repaints its foil.
    pub fn resize(&mut self, now: Instant, width: usize, height: usize) {
        if width == 0 || height == 0 || (width, height) == self.frame {
            return;
        }
        self.frame = (width, height);
        let bounds = surface_bounds(self.view().0);
        if let Page::Gift(gift) = &mut self.page {
            gift.surface.set_bounds(bounds);
            let status = gift.surface.resize(now);
            debug!(width, height, ?status, "page resized");
        }
    }

    fn open_gift(&mut self, now: Instant) {
        let Some(quote) = self.quotes.next_quote() else { return };
        let card = CardView::new(quote, self.background_image.clone());
        let bounds = surface_bounds(self.view().0);
        self.page = Page::Gift(Box::new(GiftCard::mount(card, bounds, self.pixel_ratio, now, &self.lut)));
        info!(quote = quote.text, "gift opened");
    }

    /// Advance one frame. Returns false when the user asked to quit.
    pub fn update(&mut self, now: Instant, input: &FrameInput) -> bool {
        self.notices.poll(now);
        self.celebration.update(now);
        self.confetti.update(now);

        if input.escape && !self.notices.dismiss() {
            return false;
        }

        if matches!(self.page, Page::Gate(_)) {
            if input.scan {
                self.open_gift(now);
            }
            return true;
        }
        let Page::Gift(gift) = &mut self.page else { return true };

        gift.surface.poll(now);
        let events = gift.tracker.update(input.pointer, input.pressed, gift.surface.bounds());
        for event in &events {
            let outcome = gift.surface.handle_event(event);
            if let (StrokeOutcome::Erased { .. }, PointerEvent::Move(m)) = (outcome, event) {
                if let Some(p) = m.client_point() {
                    let s = self.pixel_ratio;
                    self.sparkles.spawn(p.x * s, p.y * s, 12);
                }
            }
        }

        if gift.revealed.get() && !gift.celebrated {
            gift.celebrated = true;
            self.celebration.trigger(now);
            self.confetti.trigger(now);
        }

        if input.share && gift.revealed.get() {
            let target = self.share.as_mut().map(|t| t.as_mut() as &mut dyn ShareTarget);
            if let Some(notice) = share_blessing(&gift.card, &self.lut, target, &self.downloads) {
                self.notices.post(notice, now);
            }
        }
        true
    }

    pub fn render(&mut self, fb: &mut FrameBuffer, now: Instant) -> Result<(), Error> {
        let (w, h) = self.frame_size();
        if fb.width != w || fb.height != h {
            return Err(Error::SizeMismatch(format!("frame {}x{} for a {w}x{h} page", fb.width, fb.height)));
        }
        let t = now.saturating_duration_since(self.started).as_secs_f32();
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let s = self.pixel_ratio;
        let (vw, vh) = self.view();
        let lut = &self.lut;

        self.starry.render(fb, t, lut);
        self.snow.render(fb, t, s, lut);
        FestiveDecorations::render(fb, t, s, lut);

        // Header
        let cx = (vw / 2.0 * s) as i32;
        let cell = (s.round() as i32).max(1);
        draw_text_centered(fb, cx, (28.0 * s) as i32, "Merry Christmas", 3 * cell, rgb(theme::GOLD));
        draw_text_centered(fb, cx, (60.0 * s) as i32, "Lourdes wishes you joy", cell, rgb(theme::LIGHT_GOLD));

        match &self.page {
            Page::Gate(gate) => {
                gate.render(fb, Rect::new(0.0, 60.0, vw, vh - 120.0), t, lut);
            }
            Page::Gift(gift) => {
                gift.surface.render(fb, &gift.content, lut)?;
                if gift.revealed.get() {
                    let bounds = gift.surface.bounds();
                    let below = bounds.top + bounds.height + 24.0;
                    draw_text_centered(fb, cx, (below * s) as i32, "Press S to share your blessing", cell * 2, rgb(theme::WHITE));
                }
            }
        }

        self.sparkles.update_and_render(fb, dt);
        self.confetti.render(fb, now, s, lut);
        self.celebration.render(fb, now, s, lut);

        // Footer
        draw_text_centered(fb, cx, ((vh - 30.0) * s) as i32, "A R Sugir\u{2019}s Greetings", cell, rgb(theme::WHITE));

        self.notices.render(fb, Rect::new(0.0, 0.0, vw, vh), s, lut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{EXPORT_FILE_NAME, SharedFile};
    use crate::notice::NoticeKind;
    use std::time::Duration;

    fn config(url: &str, dir: &std::path::Path) -> Config {
        Config {
            page: Url::parse(url).unwrap(),
            pixel_ratio: 1.0,
            seed: 7,
            quote_offset: 0,
            export_dir: dir.to_path_buf(),
            background: None,
        }
    }

    fn held(x: f32, y: f32) -> FrameInput {
        FrameInput { pointer: Some(Point::new(x, y)), pressed: true, ..FrameInput::default() }
    }

    /// Drag across the whole surface on a 40 px grid.
    fn scratch_everything(app: &mut App, mut now: Instant) -> Instant {
        for row in 0..8 {
            for col in 0..8 {
                now += Duration::from_millis(16);
                let p = (SURFACE_BOUNDS.left + 20.0 + col as f32 * 40.0, SURFACE_BOUNDS.top + 20.0 + row as f32 * 40.0);
                assert!(app.update(now, &held(p.0, p.1)));
            }
        }
        now
    }

    #[test]
    fn gate_opens_on_scan_or_marker() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(config("https://lourdes.greetings/", dir.path()), t0).unwrap();
        assert_eq!(app.stage(), Stage::Gate);
        app.update(t0, &FrameInput::default());
        assert_eq!(app.stage(), Stage::Gate);
        app.update(t0, &FrameInput { scan: true, ..FrameInput::default() });
        assert_eq!(app.stage(), Stage::Gift(GiftPhase::Scratching));

        let app = App::new(config("https://lourdes.greetings/?scanned=true", dir.path()), t0).unwrap();
        assert_eq!(app.stage(), Stage::Gift(GiftPhase::Scratching));
    }

    #[test]
    fn scratching_reveals_and_celebrates() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(config("https://lourdes.greetings/?scanned=true", dir.path()), t0).unwrap();
        let now = scratch_everything(&mut app, t0);
        assert_eq!(app.stage(), Stage::Gift(GiftPhase::Revealed));
        assert!(app.erased_fraction().is_some_and(|f| f > 0.40));
        assert!(app.celebration().is_active());
        assert!(app.confetti().is_active());

        let (w, h) = app.frame_size();
        let mut fb = FrameBuffer::new(w, h);
        app.render(&mut fb, now + Duration::from_millis(200)).unwrap();
    }

    #[test]
    fn sharing_before_reveal_does_nothing_and_after_reveal_saves() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(config("https://lourdes.greetings/?scanned=true", dir.path()), t0).unwrap();
        app.update(t0, &FrameInput { share: true, ..FrameInput::default() });
        assert!(app.notices().current().is_none());

        let now = scratch_everything(&mut app, t0);
        app.update(now, &FrameInput { share: true, ..FrameInput::default() });
        assert_eq!(app.notices().current().map(|n| n.kind), Some(NoticeKind::Info));
        assert!(dir.path().join(EXPORT_FILE_NAME).exists());

        // Esc closes the notice first, then quits.
        assert!(app.update(now, &FrameInput { escape: true, ..FrameInput::default() }));
        assert!(app.notices().current().is_none());
        assert!(!app.update(now, &FrameInput { escape: true, ..FrameInput::default() }));
    }

    struct Broken;

    impl ShareTarget for Broken {
        fn can_share(&self, _file: &SharedFile) -> bool {
            true
        }

        fn share(&mut self, _file: &SharedFile) -> Result<(), Error> {
            Err(Error::Io(std::io::Error::other("no share sheet")))
        }
    }

    #[test]
    fn failed_share_leaves_the_card_revealed() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(config("https://lourdes.greetings/?scanned=true", dir.path()), t0).unwrap();
        app.set_share_target(Box::new(Broken));
        let now = scratch_everything(&mut app, t0);
        app.update(now, &FrameInput { share: true, ..FrameInput::default() });
        assert_eq!(app.notices().current().map(|n| n.kind), Some(NoticeKind::Destructive));
        assert_eq!(app.stage(), Stage::Gift(GiftPhase::Revealed));
    }

    #[test]
    fn window_resize_recenters_and_repaints_the_foil() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(config("https://lourdes.greetings/?scanned=true", dir.path()), t0).unwrap();
        let c = (SURFACE_BOUNDS.left + 160.0, SURFACE_BOUNDS.top + 160.0);
        app.update(t0, &held(c.0, c.1));
        assert!(app.is_scratching());
        assert!(app.erased_fraction().is_some_and(|f| f > 0.0));

        app.resize(t0, 1024, 720);
        assert_eq!(app.frame_size(), (1024, 720));
        assert_eq!(app.erased_fraction(), Some(0.0));

        // Same screen spot is now left of the re-centered surface; scratch its new center.
        let t1 = t0 + Duration::from_millis(16);
        app.update(t1, &FrameInput::default());
        assert!(!app.is_scratching());
        app.update(t1, &held(512.0, SURFACE_BOUNDS.top + 160.0));
        assert!(app.erased_fraction().is_some_and(|f| f > 0.0));

        let mut fb = FrameBuffer::new(1024, 720);
        app.render(&mut fb, t1).unwrap();
    }

    #[test]
    fn gate_renders_and_rejects_wrong_frame_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let t0 = Instant::now();
        let mut app = App::new(config("https://lourdes.greetings/", dir.path()), t0).unwrap();
        let mut fb = FrameBuffer::new(480, 720);
        app.render(&mut fb, t0).unwrap();
        let mut wrong = FrameBuffer::new(10, 10);
        assert!(app.render(&mut wrong, t0).is_err());
    }
}

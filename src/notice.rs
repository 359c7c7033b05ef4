// Transient notices (toasts) reporting what happened to an export.
// Visual: a rounded-ish box near the bottom of the view, white for info, red for failures.

use std::time::{Duration, Instant};

use tracing::info;

use crate::draw::{draw_text_centered, fill_rect, fill_rect_alpha};
use crate::gamma::GammaLut;
use crate::theme::{self, rgb};
use crate::timer::Deferred;
use crate::types::{FrameBuffer, Rect};

pub const NOTICE_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), kind: NoticeKind::Info }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), kind: NoticeKind::Destructive }
    }
}

/// Holds at most one notice; a new one replaces the old.
#[derive(Default)]
pub struct NoticeBoard {
    current: Option<(Notice, Deferred)>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, notice: Notice, now: Instant) {
        info!(title = %notice.title, kind = ?notice.kind, "notice");
        self.current = Some((notice, Deferred::after(now, NOTICE_LIFETIME)));
    }

    /// Returns true when something was dismissed.
    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Drop the notice once its lifetime is over.
    pub fn poll(&mut self, now: Instant) {
        if self.current.as_mut().is_some_and(|(_, expiry)| expiry.fire(now)) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref().map(|(n, _)| n)
    }

    /// Draw the notice centered at the bottom of `view` (logical).
    pub fn render(&self, fb: &mut FrameBuffer, view: Rect, scale: f32, lut: &GammaLut) {
        let Some(notice) = self.current() else { return };
        let s = scale;
        let (bg, fg) = match notice.kind {
            NoticeKind::Info => (rgb(theme::CARD), rgb(theme::NIGHT_DARK)),
            NoticeKind::Destructive => (rgb(theme::CHRISTMAS_RED), rgb(theme::WHITE)),
        };
        let w = (view.width - 32.0).min(360.0);
        let h = 56.0;
        let x = view.left + (view.width - w) / 2.0;
        let y = view.top + view.height - h - 16.0;
        let px = |v: f32| (v * s).round() as i32;

        fill_rect_alpha(fb, px(x) + px(2.0), px(y) + px(3.0), px(w), px(h), 0, 0.35, lut);
        fill_rect(fb, px(x), px(y), px(w), px(h), bg);
        let cell = (s.round() as i32).max(1);
        let cx = px(x + w / 2.0);
        draw_text_centered(fb, cx, px(y + 12.0), &notice.title, 2 * cell, fg);
        draw_text_centered(fb, cx, px(y + 36.0), &notice.description, cell, fg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_its_lifetime() {
        let t0 = Instant::now();
        let mut board = NoticeBoard::new();
        board.post(Notice::info("Image saved", "You can now share it on social media."), t0);
        board.poll(t0 + Duration::from_millis(3900));
        assert!(board.current().is_some());
        board.poll(t0 + NOTICE_LIFETIME);
        assert!(board.current().is_none());
    }

    #[test]
    fn dismiss_and_replace() {
        let t0 = Instant::now();
        let mut board = NoticeBoard::new();
        assert!(!board.dismiss());
        board.post(Notice::info("a", "b"), t0);
        board.post(Notice::destructive("Share failed", "Please try again."), t0);
        assert_eq!(board.current().map(|n| n.kind), Some(NoticeKind::Destructive));
        assert!(board.dismiss());
        assert!(board.current().is_none());
    }

    #[test]
    fn destructive_notice_paints_red() {
        let lut = GammaLut::new();
        let mut board = NoticeBoard::new();
        board.post(Notice::destructive("Share failed", "Please try again."), Instant::now());
        let mut fb = FrameBuffer::new(480, 720);
        board.render(&mut fb, Rect::new(0.0, 0.0, 480.0, 720.0), 1.0, &lut);
        assert!(fb.pixels.iter().any(|p| *p == rgb(theme::CHRISTMAS_RED)));
    }
}

// Pointer model for the scratch surface.
// The window only lets us *poll* the mouse, so `PointerTracker` turns
// "where is it / is the button held" into the DOM-style events the surface expects.

use crate::types::{Point, Rect};

/// One pointer sample in viewport (window, logical px) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerInput {
    Mouse { client: Point },
    /// Every active touch point; only the first one is used.
    /// The minifb window only reports a mouse, so just touch hosts build this.
    #[cfg_attr(not(test), allow(dead_code))]
    Touch { touches: Vec<Point> },
}

impl PointerInput {
    pub fn mouse(x: f32, y: f32) -> Self {
        Self::Mouse { client: Point::new(x, y) }
    }

    /// The viewport point this input stands for. An empty touch list has none.
    pub fn client_point(&self) -> Option<Point> {
        match self {
            Self::Mouse { client } => Some(*client),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// mousedown / touchstart
    Down,
    /// mouseup / touchend
    Up,
    /// mouseleave
    Leave,
    /// mousemove / touchmove
    Move(PointerInput),
}

#[derive(Default)]
pub struct PointerTracker {
    pressed: bool,
    inside: bool,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the polled mouse state for this frame; returns the events it implies for `target`.
    /// `position` is None while the pointer is outside the window.
    pub fn update(&mut self, position: Option<Point>, pressed: bool, target: Rect) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let inside = position.is_some_and(|p| target.contains(p));

        if self.inside && !inside {
            events.push(PointerEvent::Leave);
        }
        if inside {
            if pressed && !self.pressed {
                events.push(PointerEvent::Down);
            } else if !pressed && self.pressed {
                events.push(PointerEvent::Up);
            }
            if let Some(p) = position {
                if self.last != Some(p) || (pressed && !self.pressed) {
                    events.push(PointerEvent::Move(PointerInput::mouse(p.x, p.y)));
                }
            }
        }

        self.inside = inside;
        self.pressed = pressed;
        self.last = if inside { position } else { None };
        events
    }
}

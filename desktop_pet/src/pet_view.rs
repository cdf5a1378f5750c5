//! The pet window: a small borderless, always-on-top square that is moved
//! around the desktop every tick.
//!
//! ```text
//! ┌────────────┐
//! │  ●    ●    │   eyes look the way the pet faces
//! │            │
//! │    ‿‿‿     │   mouth per face
//! └────────────┘
//! ```
//!
//! The window is too small for text, so the pet's latest line goes into the
//! window title (and the log).

use std::time::Duration;

use minifb::{KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use thiserror::Error;

use crate::behavior::Face;
use crate::canvas::{blend, Canvas};
use crate::keys::{pet_key, PetKey, PET_KEYS};
use crate::mood::Tier;
use crate::physics::Point;
use crate::pointer::WindowPointer;

const BACKGROUND: u32 = 0xFF202028;
const OUTLINE:    u32 = 0xFF7A2E3A;
const EYE:        u32 = 0xFF1A1A1A;
const MOUTH:      u32 = 0xFF5A1020;
const TONGUE:     u32 = 0xFFE04060;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("cannot open {what} window: {source}")]
    Window { what: &'static str, source: minifb::Error },
}

fn body_color(tier: Tier) -> u32 {
    match tier {
        Tier::Calm       => 0xFFFFB6C1,
        Tier::Neutral    => 0xFFFF9AA2,
        Tier::Aggressive => 0xFFFF6F61,
        Tier::MaxChaos   => 0xFFE0303A,
    }
}

/// Polyline approximation of an arc, angles in radians (0 = right, π/2 =
/// down).
fn draw_arc(c: &mut Canvas, (cx, cy): (f32, f32), (rx, ry): (f32, f32), from: f32, to: f32, color: u32) {
    const SEGMENTS: usize = 12;
    let at = |i: usize| {
        let a = from + (to - from) * i as f32 / SEGMENTS as f32;
        ((cx + rx * a.cos()).round() as isize, (cy + ry * a.sin()).round() as isize)
    };
    for i in 0..SEGMENTS {
        let (x0, y0) = at(i);
        let (x1, y1) = at(i + 1);
        c.draw_line(x0, y0, x1, y1, color);
        c.draw_line(x0, y0 + 1, x1, y1 + 1, color);
    }
}

/// Paint the pet filling `canvas`.  `facing` is +1 (right) or −1 (left).
pub fn draw_pet(canvas: &mut Canvas, face: Face, blinking: bool, facing: f32, tier: Tier) {
    use std::f32::consts::PI;

    let s = canvas.width().min(canvas.height());
    canvas.clear(BACKGROUND);
    canvas.fill_rounded_rect(0, 0, s, s, s / 4, OUTLINE);
    canvas.fill_rounded_rect(2, 2, s.saturating_sub(4), s.saturating_sub(4), s / 4, body_color(tier));

    let sf = s as f32;
    let eye_y = sf * 0.38;
    let (lx, rx) = (sf * 0.32, sf * 0.68);
    let eye_r = (sf * 0.08).max(2.0);
    let look = facing.signum() * eye_r * 0.4;

    // Eyes
    let sleepy = face == Face::Sleepy;
    for ex in [lx, rx] {
        if blinking || sleepy {
            let y = eye_y.round() as isize;
            canvas.draw_line((ex - eye_r) as isize, y, (ex + eye_r) as isize, y, EYE);
            canvas.draw_line((ex - eye_r) as isize, y + 1, (ex + eye_r) as isize, y + 1, EYE);
        } else {
            let r = if face == Face::Excited { eye_r * 1.3 } else { eye_r };
            canvas.fill_circle(ex as isize, eye_y as isize, r as isize, 0xFFFFFFFF);
            canvas.fill_circle((ex + look) as isize, eye_y as isize, (r * 0.6) as isize, EYE);
        }
    }

    // Brows
    if matches!(face, Face::Mischievous | Face::Annoying) {
        let by = (eye_y - eye_r * 2.0) as isize;
        let w = eye_r as isize * 2;
        canvas.draw_line(lx as isize - w / 2, by - 2, lx as isize + w / 2, by + 2, EYE);
        canvas.draw_line(rx as isize - w / 2, by + 2, rx as isize + w / 2, by - 2, EYE);
    }

    // Mouth
    let (mx, my) = (sf * 0.5, sf * 0.66);
    let mw = sf * 0.16;
    match face {
        Face::Happy => draw_arc(canvas, (mx, my), (mw, mw * 0.6), 0.0, PI, MOUTH),
        Face::Sleepy => {
            canvas.fill_ellipse(mx as isize, my as isize, (mw * 0.3) as isize, (mw * 0.3) as isize, MOUTH);
        }
        Face::Excited => {
            canvas.fill_ellipse(mx as isize, my as isize, (mw * 0.7) as isize, (mw * 0.6) as isize, MOUTH);
            let tint = blend(MOUTH, TONGUE, 0.6);
            canvas.fill_ellipse(mx as isize, (my + mw * 0.3) as isize, (mw * 0.4) as isize, (mw * 0.2) as isize, tint);
        }
        Face::Mischievous => {
            let side = facing.signum();
            draw_arc(canvas, (mx + side * mw * 0.3, my), (mw, mw * 0.4), 0.2, PI * 0.8, MOUTH);
        }
        Face::Annoying => {
            let y = my as isize;
            canvas.draw_line((mx - mw) as isize, y, (mx + mw) as isize, y, MOUTH);
            canvas.draw_line((mx - mw) as isize, y + 1, (mx + mw) as isize, y + 1, MOUTH);
            let tw = (mw * 0.5) as usize;
            canvas.fill_rect(mx as usize, (my + 2.0) as usize, tw.max(2), tw.max(2), TONGUE);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Dragging
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEvent {
    None,
    Started,
    /// The pet's new top-left corner.
    Moved(Point),
    Released,
}

/// Left-button drag of the pet window, in screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragTracker {
    /// Pointer offset from the pet's corner while dragging.
    grab: Option<Point>,
}

impl DragTracker {
    pub fn is_dragging(&self) -> bool { self.grab.is_some() }

    /// `over_pet` is whether the pointer is inside the pet window.
    pub fn update(&mut self, down: bool, pointer: Option<Point>, over_pet: bool, pet_pos: Point) -> DragEvent {
        match (self.grab, down, pointer) {
            (None, true, Some(p)) if over_pet => {
                self.grab = Some(Point::new(p.x - pet_pos.x, p.y - pet_pos.y));
                DragEvent::Started
            }
            (Some(_), false, _) => {
                self.grab = None;
                DragEvent::Released
            }
            (Some(off), true, Some(p)) => {
                let to = Point::new(p.x - off.x, p.y - off.y);
                if to == pet_pos { DragEvent::None } else { DragEvent::Moved(to) }
            }
            _ => DragEvent::None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PetWindow
// ════════════════════════════════════════════════════════════════════════════

pub struct PetWindow {
    window: Window,
    canvas: Canvas,
    drag:   DragTracker,
}

impl PetWindow {
    /// `tick` paces the whole app: every render waits out the rest of it.
    pub fn new(size: usize, at: Point, tick: Duration) -> Result<Self, ViewError> {
        let mut window = Window::new(
            "Desktop Pet",
            size,
            size,
            WindowOptions {
                borderless: true,
                topmost:    true,
                resize:     false,
                ..WindowOptions::default()
            },
        )
        .map_err(|source| ViewError::Window { what: "pet", source })?;
        window.set_position(at.x as isize, at.y as isize);
        window.limit_update_rate(Some(tick));
        Ok(PetWindow { window, canvas: Canvas::new(size, size, BACKGROUND), drag: DragTracker::default() })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Keys pressed since the last poll, in map order.
    pub fn poll_keys(&self) -> Vec<PetKey> {
        PET_KEYS
            .iter()
            .filter(|&&k| self.window.is_key_pressed(k, KeyRepeat::No))
            .filter_map(|&k| pet_key(k))
            .collect()
    }

    pub fn pointer(&self) -> WindowPointer { WindowPointer::from_window(&self.window) }

    pub fn poll_drag(&mut self, pet_pos: Point) -> DragEvent {
        use crate::pointer::Pointer;

        let down = self.window.get_mouse_down(MouseButton::Left);
        let over = self.window.get_mouse_pos(MouseMode::Discard).is_some();
        let pointer = self.pointer().position();
        self.drag.update(down, pointer, over, pet_pos)
    }

    pub fn is_dragging(&self) -> bool { self.drag.is_dragging() }

    pub fn set_position(&mut self, at: Point) {
        self.window.set_position(at.x.round() as isize, at.y.round() as isize);
    }

    pub fn set_speech(&mut self, line: &str) {
        self.window.set_title(&format!("Desktop Pet: {line}"));
    }

    pub fn render(&mut self, face: Face, blinking: bool, facing: f32, tier: Tier) {
        draw_pet(&mut self.canvas, face, blinking, facing, tier);
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.window.update_with_buffer(self.canvas.buffer(), w, h).ok();
    }
}

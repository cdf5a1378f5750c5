//! Game windows.  One opens per launched game and closes with it; closing
//! it by hand only ends the game.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ TITLE                                    │
//! │ description                              │
//! │ status line                              │
//! ├──────────────────────────────────────────┤
//! │                                          │
//! │           game-specific scene            │
//! │                                          │
//! │ key legend                               │
//! └──────────────────────────────────────────┘
//! ```

use std::time::Instant;

use minifb::{KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use pet_games::click::{AREA_TOP, TARGET_RADIUS};
use pet_games::matcha::{MAX_LEVEL, TARGET_LEVEL};
use pet_games::{
    ActiveGame, CameraState, GameInput, GameKind, HandAlternator, ImpossibleClick, MatchaWhisking,
    MiniGame,
};
use gesture_count::Side;

use crate::canvas::{blend, label_width, Canvas};
use crate::keys::{game_key, GAME_KEYS};
use crate::pet_view::ViewError;

const BG:        u32 = 0xFF1A1A2E;
const HEADER_BG: u32 = 0xFF0F3460;
const TEXT:      u32 = 0xFFEEEEEE;
const DIM:       u32 = 0xFF888888;
const ACCENT:    u32 = 0xFFFFD700;
const RED:       u32 = 0xFFE04040;
const HEADER_H:  usize = 84;

/// Draw `game` onto `canvas` as of `now`.
pub fn draw_game(canvas: &mut Canvas, game: &ActiveGame, now: Instant) {
    canvas.clear(BG);
    let w = canvas.width();
    canvas.fill_rect(0, 0, w, HEADER_H, HEADER_BG);
    let kind = game.kind();
    canvas.draw_label(&kind.title().to_uppercase(), 12, 10, 3, ACCENT);
    canvas.draw_label(kind.description(), 12, 38, 2, TEXT);
    canvas.draw_label(&game.as_game().status_line(now), 12, 60, 2, TEXT);

    match game {
        ActiveGame::Matcha(g) => draw_matcha(canvas, g),
        ActiveGame::Hand(g)   => draw_hand(canvas, g),
        ActiveGame::Click(g)  => draw_click(canvas, g),
    }

    let legend = match kind {
        GameKind::MatchaWhisking  => "circle the mouse inside the bowl",
        GameKind::HandAlternator  => "SPACE = simulate   C = retry camera",
        GameKind::ImpossibleClick => "click the circle",
    };
    let h = canvas.height();
    canvas.draw_label(legend, 12, h.saturating_sub(16), 2, DIM);
}

fn draw_matcha(c: &mut Canvas, g: &MatchaWhisking) {
    let bowl = g.bowl();
    let (cx, cy) = (bowl.cx as isize, bowl.cy as isize);
    let (rx, ry) = ((bowl.width / 2.0) as isize, (bowl.height / 2.0) as isize);

    // Bowl and liquid: the liquid ellipse grows with the level.
    c.fill_ellipse(cx, cy, rx + 8, ry + 8, 0xFF5C3A21);
    c.fill_ellipse(cx, cy, rx, ry, 0xFF2E1C10);
    let fill = (g.liquid() / MAX_LEVEL).clamp(0.0, 1.0);
    let foam = blend(0xFF6B8E23, 0xFFB5E48C, fill);
    c.fill_ellipse(cx, cy, (rx as f32 * fill) as isize, (ry as f32 * fill) as isize, foam);

    // Whisk
    let len = bowl.radius() * 0.8;
    let a = g.whisk_angle();
    let (wx, wy) = (cx + (len * a.cos()) as isize, cy + (len * a.sin()) as isize);
    c.draw_line(cx, cy, wx, wy, 0xFFD2B48C);
    c.fill_circle(wx, wy, 4, 0xFFD2B48C);

    // Level meter with the target line
    let (mx, my, mh) = (c.width().saturating_sub(60), HEADER_H + 40, 360usize);
    c.fill_rect(mx, my, 24, mh, 0xFF333344);
    let filled = (mh as f32 * fill) as usize;
    c.fill_rect(mx, my + mh - filled, 24, filled, foam);
    let target_y = my + mh - (mh as f32 * TARGET_LEVEL / MAX_LEVEL) as usize;
    c.fill_rect(mx.saturating_sub(6), target_y, 36, 2, RED);
    c.draw_border(mx, my, 24, mh, DIM);

    // Power bar
    let bar_w = 300usize;
    let y = c.height().saturating_sub(60);
    c.draw_label("POWER", 12, y, 2, TEXT);
    c.fill_rect(80, y, bar_w, 12, 0xFF333344);
    let p = (g.power() / 100.0).clamp(0.0, 1.0);
    c.fill_rect(80, y, (bar_w as f32 * p) as usize, 12, blend(RED, 0xFF40E040, p));
    if g.streak() > 0 {
        c.draw_label(&format!("STREAK {}", g.streak()), 400, y, 2, ACCENT);
    }
}

fn draw_hand(c: &mut Canvas, g: &HandAlternator) {
    let top = HEADER_H + 20;
    c.draw_label(&format!("{}/{}", g.count(), g.target()), 12, top, 6, ACCENT);

    let side = match g.current_side() {
        Side::Left  => "LEFT",
        Side::Right => "RIGHT",
        Side::None  => "-",
    };
    c.draw_label(&format!("SIDE {side}"), 12, top + 50, 3, TEXT);

    let camera = match g.camera_state() {
        CameraState::Connecting          => "camera: connecting".to_string(),
        CameraState::Live { mode }       => format!("camera: live ({mode})"),
        CameraState::Simulation { reason } => format!("simulation mode: {reason}"),
    };
    let h = c.draw_wrapped(&camera, 12, top + 90, 360, 2, TEXT);
    if matches!(g.camera_state(), CameraState::Simulation { .. }) {
        c.draw_wrapped("press SPACE for each alternation", 12, top + 100 + h, 360, 2, DIM);
    }

    // Progress bar
    let target = g.target().max(1) as f32;
    let frac = (g.count() as f32 / target).min(1.0);
    let y = c.height().saturating_sub(60);
    c.fill_rect(12, y, 360, 14, 0xFF333344);
    c.fill_rect(12, y, (360.0 * frac) as usize, 14, 0xFF40E040);

    if let Some(preview) = g.last_frame().and_then(|f| f.preview.as_ref()) {
        let x = c.width().saturating_sub(preview.width() + 20);
        c.blit_frame(preview, x, top);
        c.draw_border(x.saturating_sub(1), top - 1, preview.width() + 2, preview.height() + 2, DIM);
        let mid = x + preview.width() / 2;
        c.fill_rect(mid, top, 1, preview.height(), ACCENT);
    }
}

fn draw_click(c: &mut Canvas, g: &ImpossibleClick) {
    c.fill_rect(0, AREA_TOP as usize - 2, c.width(), 2, DIM);
    let (tx, ty) = g.target();
    let r = TARGET_RADIUS as isize;
    c.fill_circle(tx as isize, ty as isize, r, RED);
    c.draw_ring(tx as isize, ty as isize, r, 3, TEXT);
    c.fill_circle(tx as isize, ty as isize, r / 3, TEXT);

    let taunt = g.taunt();
    let x = c.width().saturating_sub(label_width(taunt, 2)) / 2;
    c.draw_label(taunt, x, HEADER_H + 16, 2, ACCENT);
    c.draw_label(&format!("CLICKS {}", g.clicks()), 12, HEADER_H + 40, 2, TEXT);
}

// ════════════════════════════════════════════════════════════════════════════
// Mouse tracking
// ════════════════════════════════════════════════════════════════════════════

/// Turns raw mouse state into [`GameInput`]s: a move when the position
/// changes, a click on each left-button press.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseTracker {
    last: Option<(f32, f32)>,
    down: bool,
}

impl MouseTracker {
    pub fn update(&mut self, pos: Option<(f32, f32)>, down: bool) -> Vec<GameInput> {
        let mut out = Vec::new();
        if let Some((x, y)) = pos {
            if self.last != pos {
                out.push(GameInput::PointerMoved { x, y });
            }
            if down && !self.down {
                out.push(GameInput::Click { x, y });
            }
        }
        self.last = pos;
        self.down = down;
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GameWindow
// ════════════════════════════════════════════════════════════════════════════

pub struct GameWindow {
    window: Window,
    canvas: Canvas,
    mouse:  MouseTracker,
    kind:   GameKind,
}

impl GameWindow {
    pub fn open(kind: GameKind, width: usize, height: usize) -> Result<Self, ViewError> {
        let mut window = Window::new(
            kind.title(),
            width,
            height,
            WindowOptions { resize: false, topmost: true, ..WindowOptions::default() },
        )
        .map_err(|source| ViewError::Window { what: "game", source })?;
        window.limit_update_rate(None);
        Ok(GameWindow { window, canvas: Canvas::new(width, height, BG), mouse: MouseTracker::default(), kind })
    }

    pub fn kind(&self) -> GameKind { self.kind }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Mouse and key input since the last poll.
    pub fn poll(&mut self) -> Vec<GameInput> {
        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        let down = self.window.get_mouse_down(MouseButton::Left);
        let mut inputs = self.mouse.update(pos, down);
        inputs.extend(
            GAME_KEYS
                .iter()
                .filter(|&&k| self.window.is_key_pressed(k, KeyRepeat::No))
                .filter_map(|&k| game_key(k)),
        );
        inputs
    }

    pub fn render(&mut self, game: &ActiveGame, now: Instant) {
        draw_game(&mut self.canvas, game, now);
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.window.update_with_buffer(self.canvas.buffer(), w, h).ok();
    }
}

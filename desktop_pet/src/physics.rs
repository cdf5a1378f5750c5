//! The pet's body: idle walking physics and direct moves.
//!
//! Positions are the window's top-left corner in screen pixels.  Idle motion
//! walks along the bottom of the screen, bounces off the edges and keeps a
//! minimum walking pace on the ground.  Direct moves (cursor follow, drag)
//! bypass all of that and leave the velocity untouched at zero.

use crate::config::PhysicsConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// The area the pet window may occupy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width:  f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: usize, height: usize) -> Self {
        Bounds { width: width as f32, height: height as f32 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PetBody {
    pub pos:       Point,
    pub vx:        f32,
    pub vy:        f32,
    pub size:      f32,
    pub on_ground: bool,
    /// 1 facing right, -1 facing left.
    pub facing:    f32,
}

impl PetBody {
    pub fn new(pos: Point, size: f32, walk_speed: f32) -> Self {
        PetBody { pos, vx: walk_speed, vy: 0.0, size, on_ground: false, facing: 1.0 }
    }

    pub fn center(&self) -> Point {
        Point::new(self.pos.x + self.size / 2.0, self.pos.y + self.size / 2.0)
    }

    fn max_x(&self, b: Bounds) -> f32 { (b.width - self.size).max(0.0) }
    fn max_y(&self, b: Bounds) -> f32 { (b.height - self.size).max(0.0) }

    /// One tick of idle walking.  `max_speed` caps the horizontal speed and,
    /// doubled, the vertical speed.
    pub fn idle_step(&mut self, cfg: &PhysicsConfig, bounds: Bounds, max_speed: f32) {
        let walk = cfg.walk_speed;
        if !self.on_ground {
            self.vy += cfg.gravity;
        }
        let mut x = self.pos.x + self.vx;
        let mut y = self.pos.y + self.vy;

        let ground = self.max_y(bounds);
        if y >= ground {
            y = ground;
            self.vy = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }

        let right = self.max_x(bounds);
        if x <= 0.0 {
            x = 0.0;
            self.vx = walk.max(self.vx.abs() * cfg.bounce_damping);
        } else if x >= right {
            x = right;
            self.vx = (-walk).min(-self.vx.abs() * cfg.bounce_damping);
        }

        if y <= 0.0 {
            y = 0.0;
            self.vy = self.vy.abs() * cfg.bounce_damping;
        }

        if self.on_ground && self.vx.abs() < walk {
            self.vx = if self.vx >= 0.0 { walk } else { -walk };
        }

        self.vx = self.vx.clamp(-max_speed, max_speed);
        self.vy = self.vy.clamp(-max_speed * 2.0, max_speed * 2.0);
        self.pos = Point::new(x, y);
        self.update_facing();
    }

    /// Move by `(dx, dy)` with no physics, clamped to the screen.
    pub fn direct_step(&mut self, dx: f32, dy: f32, bounds: Bounds) {
        if dx.abs() > 0.1 {
            self.facing = dx.signum();
        }
        self.place(Point::new(self.pos.x + dx, self.pos.y + dy), bounds);
    }

    /// Put the top-left corner at `pos`, clamped to the screen.  Velocity is
    /// cleared.
    pub fn place(&mut self, pos: Point, bounds: Bounds) {
        self.pos = Point::new(pos.x.clamp(0.0, self.max_x(bounds)), pos.y.clamp(0.0, self.max_y(bounds)));
        self.vx = 0.0;
        self.vy = 0.0;
        self.on_ground = self.pos.y >= self.max_y(bounds);
    }

    /// Hand back to idle physics: walking pace in the facing direction and
    /// no vertical speed.
    pub fn reset_for_idle(&mut self, walk_speed: f32) {
        self.vx = self.facing * walk_speed;
        self.vy = 0.0;
    }

    fn update_facing(&mut self) {
        if self.vx.abs() > 0.1 {
            self.facing = self.vx.signum();
        }
    }
}

// Per-frame motion for floating sprites.
// Visual: sprites wander slowly, tilt back and forth, bounce off the window
// edges and off the menus, and leave a short rainbow trail behind them.
use rand::Rng;

use crate::config::PhysicsConfig;
use crate::geom::Rect;
use crate::sprite::{SpriteId, SpriteState, SpriteStore, TrailPoint, uniform};

/// A UI footprint sprites must not cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Obstacle {
    /// Pushed above or below, whichever is nearer; flips `vy`.
    Bounce { rect: Rect },
    /// Anything overlapping its columns is held above its top edge.
    KeepAbove { rect: Rect },
}

/// Which walls were hit this step (drives the bounce cues).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Bounce {
    pub fn merge(&mut self, other: Bounce) {
        self.horizontal |= other.horizontal;
        self.vertical |= other.vertical;
    }
}

/// Everything a step needs to know about the world around the sprite.
pub struct World<'a> {
    pub width: f32,
    pub height: f32,
    pub sprite_size: f32,
    pub obstacles: &'a [Obstacle],
}

/// Advance one sprite by one frame.
pub fn step_sprite<R: Rng>(s: &mut SpriteState, world: &World<'_>, cfg: &PhysicsConfig, rng: &mut R) -> Bounce {
    let size = world.sprite_size;
    let max_x = (world.width - size).max(0.0);
    let max_y = (world.height - size).max(0.0);
    let mut bounce = Bounce::default();

    // 1) Random walk
    s.vx += uniform(rng, -cfg.walk_vx, cfg.walk_vx);
    s.vy += uniform(rng, -cfg.walk_vy, cfg.walk_vy);
    s.spin += uniform(rng, -cfg.walk_spin, cfg.walk_spin);

    // 2) Speed limits
    s.vx = s.vx.clamp(-cfg.vx_max, cfg.vx_max);
    s.vy = s.vy.clamp(-cfg.vy_max, cfg.vy_max);
    s.spin = s.spin.clamp(-cfg.spin_max, cfg.spin_max);

    // 3) Integrate
    s.x += s.vx;
    s.y += s.vy;
    s.rotation += s.spin;

    // 4) Tilt limit reflects the spin
    if s.rotation > cfg.max_rotation {
        s.rotation = cfg.max_rotation;
        s.spin = -s.spin;
    } else if s.rotation < -cfg.max_rotation {
        s.rotation = -cfg.max_rotation;
        s.spin = -s.spin;
    }

    // 5) Canvas edges
    if s.x < 0.0 {
        s.x = 0.0;
        s.vx = -s.vx;
        bounce.horizontal = true;
    } else if s.x > max_x {
        s.x = max_x;
        s.vx = -s.vx;
        bounce.horizontal = true;
    }
    if s.y < 0.0 {
        s.y = 0.0;
        s.vy = -s.vy;
        bounce.vertical = true;
    } else if s.y > max_y {
        s.y = max_y;
        s.vy = -s.vy;
        bounce.vertical = true;
    }

    // 6) Menus, in declaration order
    for obstacle in world.obstacles {
        bounce.merge(resolve_obstacle(s, obstacle, size));
    }

    // Pushing out of a menu may leave the canvas; the box must end inside it.
    s.x = s.x.clamp(0.0, max_x);
    s.y = s.y.clamp(0.0, max_y);

    // 7) Trail of centers, newest last
    s.trail.push_back(TrailPoint { x: s.x + size / 2.0, y: s.y + size / 2.0, rotation: s.rotation });
    while s.trail.len() > cfg.trail_len {
        s.trail.pop_front();
    }

    bounce
}

fn resolve_obstacle(s: &mut SpriteState, obstacle: &Obstacle, size: f32) -> Bounce {
    let body = s.rect(size);
    match *obstacle {
        Obstacle::Bounce { rect } => {
            if !body.overlaps(&rect) {
                return Bounce::default();
            }
            s.y = if body.center().y < rect.center().y { rect.y - size } else { rect.bottom() };
            s.vy = -s.vy;
            Bounce { horizontal: false, vertical: true }
        }
        Obstacle::KeepAbove { rect } => {
            let columns = body.x < rect.right() && body.right() > rect.x;
            if columns && body.bottom() > rect.y {
                s.y = rect.y - size;
                s.vy = -s.vy;
            }
            Bounce::default()
        }
    }
}

/// Advance every sprite except the one under the pointer. Nothing moves while `frozen`.
pub fn step_all<R: Rng>(
    store: &mut SpriteStore,
    world: &World<'_>,
    cfg: &PhysicsConfig,
    held: Option<SpriteId>,
    frozen: bool,
    rng: &mut R,
) -> Bounce {
    let mut bounce = Bounce::default();
    if frozen {
        return bounce;
    }
    for s in store.sprites_mut() {
        if Some(s.id) == held {
            continue;
        }
        bounce.merge(step_sprite(s, world, cfg, rng));
    }
    bounce
}

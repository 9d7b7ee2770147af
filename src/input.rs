// Pointer gestures: drag-to-move, tap-to-duplicate, drag-to-bin and sticker
// drag-and-drop. One gesture at a time, from pointer-down to pointer-up.
// Visual: a grabbed drawing follows the pointer once it moves past a few
// pixels; a plain click drops a copy under the pointer; a sticker floats with
// the pointer until it lands on a drawing or flashes a red X.
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::config::{GestureConfig, Layout, PhysicsConfig};
use crate::geom::Point;
use crate::hit;
use crate::sprite::{Decoration, DecorationId, SpriteId, SpriteImage, SpriteStore, uniform};
use crate::stickers::Sticker;

/// Mouse clicks and touch taps are told apart with different rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// One pointer sample in canvas pixels, stamped with scene time.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub pos: Point,
    pub at: Duration,
    pub kind: PointerKind,
}

/// A sprite held under the pointer.
#[derive(Debug, Clone)]
pub struct SpriteDrag {
    pub id: SpriteId,
    /// Pointer position minus sprite top-left at pointer-down.
    pub offset: Point,
    pub start: Point,
    pub start_at: Duration,
    pub last: Point,
    pub kind: PointerKind,
    /// Moved past the drag threshold: no tap will be reported.
    pub real_drag: bool,
}

#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    DraggingSprite(SpriteDrag),
    /// A sticker from the palette follows the pointer; the scene is frozen meanwhile.
    DraggingDecoration { glyph: Sticker, at: Point },
}

/// What a finished gesture asks the scene to do.
#[derive(Debug, Clone)]
pub enum Action {
    Duplicate { image: SpriteImage, position: Point, decorations: Vec<Decoration> },
    Remove(SpriteId),
    Attached { sprite: SpriteId, decoration: DecorationId },
    AttachMissed { glyph: Sticker, at: Point },
}

/// A sticker that did not land anywhere, shown fading at the drop point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailedAttach {
    pub glyph: Sticker,
    pub at: Point,
    pub since: Duration,
}

#[derive(Debug, Default)]
pub struct InputEngine {
    state: InputState,
    failed: Option<FailedAttach>,
}

impl InputEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InputState::Idle)
    }

    /// Sprite excluded from physics because it is under the pointer.
    pub fn held_sprite(&self) -> Option<SpriteId> {
        match &self.state {
            InputState::DraggingSprite(d) => Some(d.id),
            _ => None,
        }
    }

    /// Sprite being visibly dragged (past the threshold); drawn highlighted.
    pub fn dragged_sprite(&self) -> Option<SpriteId> {
        match &self.state {
            InputState::DraggingSprite(d) if d.real_drag => Some(d.id),
            _ => None,
        }
    }

    /// All sprite motion stops while a sticker is being placed.
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, InputState::DraggingDecoration { .. })
    }

    pub fn decoration_preview(&self) -> Option<(Sticker, Point)> {
        match self.state {
            InputState::DraggingDecoration { glyph, at } => Some((glyph, at)),
            _ => None,
        }
    }

    /// The failed-attach marker, if it is still within its display time.
    pub fn failed_attach(&self, now: Duration, cfg: &GestureConfig) -> Option<FailedAttach> {
        self.failed.filter(|f| now.saturating_sub(f.since) < cfg.failed_attach_duration)
    }

    /// Forget the failed-attach marker once its time is up.
    pub fn expire(&mut self, now: Duration, cfg: &GestureConfig) {
        if self.failed_attach(now, cfg).is_none() {
            self.failed = None;
        }
    }

    /// Start a gesture. Returns true if something was grabbed.
    pub fn pointer_down(&mut self, ev: PointerEvent, store: &SpriteStore, layout: &Layout) -> bool {
        if !self.is_idle() {
            debug!("pointer down ignored: gesture already active");
            return false;
        }
        if let Some(glyph) = hit::palette_entry_at(layout, ev.pos) {
            debug!(?glyph, "sticker drag started");
            self.state = InputState::DraggingDecoration { glyph, at: ev.pos };
            return true;
        }
        let Some(id) = hit::sprite_at(store, ev.pos, layout.sprite_size, 0.0) else {
            return false;
        };
        let Some(sprite) = store.get(id) else { return false };
        self.state = InputState::DraggingSprite(SpriteDrag {
            id,
            offset: Point::new(ev.pos.x - sprite.x, ev.pos.y - sprite.y),
            start: ev.pos,
            start_at: ev.at,
            last: ev.pos,
            kind: ev.kind,
            real_drag: false,
        });
        true
    }

    pub fn pointer_move(&mut self, ev: PointerEvent, store: &mut SpriteStore, layout: &Layout, cfg: &GestureConfig) {
        match &mut self.state {
            InputState::Idle => {}
            InputState::DraggingDecoration { at, .. } => *at = ev.pos,
            InputState::DraggingSprite(drag) => drag.follow(ev.pos, store, layout, cfg),
        }
    }

    /// Finish the gesture and report what it meant.
    pub fn pointer_up<R: Rng>(
        &mut self,
        ev: PointerEvent,
        store: &mut SpriteStore,
        layout: &Layout,
        gesture: &GestureConfig,
        physics: &PhysicsConfig,
        rng: &mut R,
    ) -> Vec<Action> {
        match std::mem::take(&mut self.state) {
            InputState::Idle => Vec::new(),
            InputState::DraggingDecoration { glyph, .. } => self.drop_sticker(glyph, ev, store, layout, gesture),
            InputState::DraggingSprite(mut drag) => {
                // The release may be the first sample past the threshold.
                drag.follow(ev.pos, store, layout, gesture);
                if drag.real_drag {
                    release_drag(&drag, ev, store, layout, gesture, physics, rng)
                } else {
                    tap(&drag, ev, store, layout, gesture)
                }
            }
        }
    }

    fn drop_sticker(
        &mut self,
        glyph: Sticker,
        ev: PointerEvent,
        store: &mut SpriteStore,
        layout: &Layout,
        cfg: &GestureConfig,
    ) -> Vec<Action> {
        let size = layout.sprite_size;
        let margin = size * cfg.sticker_margin;
        let target = hit::drop_target(store, ev.pos, size, margin, cfg.decoration_hit_radius);
        if let Some(sprite) = target.and_then(|id| store.get_mut(id)) {
            let decoration = sprite.attach(glyph, ev.pos, size);
            debug!(sprite = ?sprite.id, ?glyph, "sticker attached");
            return vec![Action::Attached { sprite: sprite.id, decoration }];
        }
        debug!(?glyph, x = ev.pos.x, y = ev.pos.y, "sticker missed");
        self.failed = Some(FailedAttach { glyph, at: ev.pos, since: ev.at });
        vec![Action::AttachMissed { glyph, at: ev.pos }]
    }
}

impl SpriteDrag {
    /// Record a pointer sample; past the threshold the sprite tracks the pointer.
    fn follow(&mut self, pos: Point, store: &mut SpriteStore, layout: &Layout, cfg: &GestureConfig) {
        self.last = pos;
        if (pos.x - self.start.x).abs() > cfg.drag_threshold || (pos.y - self.start.y).abs() > cfg.drag_threshold {
            self.real_drag = true;
        }
        if !self.real_drag {
            return;
        }
        let Some(sprite) = store.get_mut(self.id) else { return };
        let size = layout.sprite_size;
        sprite.x = (pos.x - self.offset.x).clamp(0.0, (layout.width - size).max(0.0));
        sprite.y = (pos.y - self.offset.y).clamp(0.0, (layout.height - size).max(0.0));
    }
}

/// Drop after a real drag: into the bin, or fling in the drag direction.
fn release_drag<R: Rng>(
    drag: &SpriteDrag,
    ev: PointerEvent,
    store: &mut SpriteStore,
    layout: &Layout,
    gesture: &GestureConfig,
    physics: &PhysicsConfig,
    rng: &mut R,
) -> Vec<Action> {
    let Some(sprite) = store.get_mut(drag.id) else { return Vec::new() };
    if layout.bin_hit.overlaps_rect(&sprite.rect(layout.sprite_size)) {
        return vec![Action::Remove(drag.id)];
    }
    let elapsed = ev.at.saturating_sub(drag.start_at);
    let (mut vx, mut vy) = (0.0, 0.0);
    if elapsed > gesture.release_min_duration {
        let dt = elapsed.as_secs_f32();
        vx = ((drag.last.x - drag.start.x) / dt * gesture.release_scale).clamp(-physics.vx_max, physics.vx_max);
        vy = ((drag.last.y - drag.start.y) / dt * gesture.release_scale).clamp(-physics.vy_max, physics.vy_max);
    }
    sprite.vx = vx;
    sprite.vy = vy;
    sprite.spin = uniform(rng, -physics.spawn_spin, physics.spawn_spin);
    Vec::new()
}

/// Press and release without dragging: duplicate the sprite under the pointer.
fn tap(drag: &SpriteDrag, ev: PointerEvent, store: &SpriteStore, layout: &Layout, cfg: &GestureConfig) -> Vec<Action> {
    if drag.kind == PointerKind::Touch {
        let long_press = ev.at.saturating_sub(drag.start_at) > cfg.tap_max_duration;
        let wandered = (ev.pos.x - drag.start.x).abs() > cfg.tap_max_movement
            || (ev.pos.y - drag.start.y).abs() > cfg.tap_max_movement;
        if long_press || wandered {
            return Vec::new();
        }
    }
    let Some(sprite) = store.get(drag.id) else { return Vec::new() };
    let half = layout.sprite_size / 2.0;
    vec![Action::Duplicate {
        image: sprite.image.clone(),
        position: Point::new(ev.pos.x - half, ev.pos.y - half),
        decorations: sprite.decorations.clone(),
    }]
}

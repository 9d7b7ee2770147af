// The simulation context owned by the frame loop.
// Visual: everything that changes on screen (sprites, stickers, the ambient
// effect, the backdrop) lives here and is advanced once per frame.
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use rand::rngs::StdRng;
use tracing::info;

use crate::backdrop::Backdrops;
use crate::config::{Layout, SceneConfig};
use crate::cues::{Cue, CueBoard};
use crate::hit;
use crate::input::{Action, InputEngine, PointerEvent};
use crate::particles::{Effect, ParticleField};
use crate::physics::{self, World};
use crate::roster::Roster;
use crate::sprite::{SpawnArea, SpriteId, SpriteStore};

pub struct Scene {
    cfg: SceneConfig,
    layout: Layout,
    roster: Roster,
    store: SpriteStore,
    input: InputEngine,
    particles: ParticleField,
    cues: CueBoard,
    backdrops: Backdrops,
    rng: StdRng,
}

impl Scene {
    pub fn new(cfg: SceneConfig, width: f32, height: f32, backdrops: Backdrops, rng: StdRng) -> Self {
        let layout = Layout::compute(width, height, &cfg);
        let cues = CueBoard::new(cfg.cue_cooldown);
        Self {
            cfg,
            layout,
            roster: Roster::new(),
            store: SpriteStore::new(),
            input: InputEngine::new(),
            particles: ParticleField::new(),
            cues,
            backdrops,
            rng,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.cfg
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn store(&self) -> &SpriteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SpriteStore {
        &mut self.store
    }

    pub fn input(&self) -> &InputEngine {
        &self.input
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn backdrops(&self) -> &Backdrops {
        &self.backdrops
    }

    pub fn backdrops_mut(&mut self) -> &mut Backdrops {
        &mut self.backdrops
    }

    #[cfg(test)]
    pub fn cues(&self) -> &CueBoard {
        &self.cues
    }

    /// Bring the sprite store in line with the roster.
    fn reconcile(&mut self) {
        let area = SpawnArea {
            width: self.layout.width,
            height: self.layout.height,
            sprite_size: self.layout.sprite_size,
        };
        self.store
            .reconcile(self.roster.order(), self.roster.payloads(), area, &self.cfg.physics, &mut self.rng);
    }

    /// A segmented upload becomes a new sprite at a random spot.
    pub fn on_segmented(&mut self, image: RgbaImage) -> SpriteId {
        let id = self.roster.push_fresh(Arc::new(image));
        self.reconcile();
        info!(?id, sprites = self.roster.len(), "sprite added");
        id
    }

    /// Effect buttons are checked before sprites and stickers.
    pub fn pointer_down(&mut self, ev: PointerEvent) -> bool {
        if self.input.is_idle() {
            if let Some(effect) = hit::effect_button_at(&self.layout, ev.pos) {
                self.toggle_effect(effect);
                return true;
            }
        }
        self.input.pointer_down(ev, &self.store, &self.layout)
    }

    pub fn pointer_move(&mut self, ev: PointerEvent) {
        self.input.pointer_move(ev, &mut self.store, &self.layout, &self.cfg.gesture);
    }

    pub fn pointer_up(&mut self, ev: PointerEvent) {
        let actions = self.input.pointer_up(
            ev,
            &mut self.store,
            &self.layout,
            &self.cfg.gesture,
            &self.cfg.physics,
            &mut self.rng,
        );
        for action in actions {
            self.apply(action, ev.at);
        }
    }

    fn apply(&mut self, action: Action, now: Duration) {
        match action {
            Action::Duplicate { image, position, decorations } => {
                let id = self.roster.push_duplicate(image, position, decorations);
                self.reconcile();
                info!(?id, x = position.x, y = position.y, "sprite duplicated");
            }
            Action::Remove(id) => {
                if self.roster.remove(id) {
                    self.reconcile();
                    self.cues.trigger(Cue::Bin, now);
                    info!(?id, sprites = self.roster.len(), "sprite binned");
                }
            }
            Action::Attached { sprite, decoration } => {
                self.cues.trigger(Cue::StickerAttach, now);
                info!(?sprite, ?decoration, "sticker attached");
            }
            Action::AttachMissed { glyph, at } => {
                info!(glyph = glyph.label(), x = at.x, y = at.y, "sticker missed");
            }
        }
    }

    /// One simulation tick at scene time `now`.
    pub fn frame(&mut self, now: Duration) {
        self.input.expire(now, &self.cfg.gesture);
        let obstacles = self.layout.obstacles();
        let world = World {
            width: self.layout.width,
            height: self.layout.height,
            sprite_size: self.layout.sprite_size,
            obstacles: &obstacles,
        };
        let bounce = physics::step_all(
            &mut self.store,
            &world,
            &self.cfg.physics,
            self.input.held_sprite(),
            self.input.is_frozen(),
            &mut self.rng,
        );
        self.cues.bounce(bounce, now);
        self.particles.advance(self.layout.width, self.layout.height, &mut self.rng);
    }

    pub fn set_effect(&mut self, effect: Option<Effect>) {
        if self.particles.effect() != effect {
            info!(effect = effect.map_or("none", Effect::label), "effect switched");
            self.particles.set_effect(effect);
        }
    }

    /// Turn `effect` on, or off if it is already active.
    pub fn toggle_effect(&mut self, effect: Effect) {
        let next = (self.particles.effect() != Some(effect)).then_some(effect);
        self.set_effect(next);
    }

    pub fn next_backdrop(&mut self) {
        self.backdrops.next();
    }

    /// Remove every sprite. Any gesture in progress is abandoned.
    pub fn reset(&mut self, now: Duration) {
        self.roster.clear();
        self.input = InputEngine::new();
        self.reconcile();
        self.cues.trigger(Cue::Reset, now);
        info!("scene reset");
    }

    /// New viewport: layout and sprite size follow; textures rebuild lazily.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout = Layout::compute(width, height, &self.cfg);
        info!(width, height, mobile = self.layout.mobile, sprite_size = self.layout.sprite_size, "viewport resized");
    }

    /// The dragged sprite currently overlaps the bin.
    pub fn bin_highlighted(&self) -> bool {
        self.input
            .dragged_sprite()
            .and_then(|id| self.store.get(id))
            .is_some_and(|s| self.layout.bin_hit.overlaps_rect(&s.rect(self.layout.sprite_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::input::PointerKind;
    use image::Rgba;
    use rand::SeedableRng;

    fn scene() -> Scene {
        Scene::new(
            SceneConfig::default(),
            1280.0,
            800.0,
            Backdrops::new(Vec::new()),
            StdRng::seed_from_u64(51),
        )
    }

    fn drawing() -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([30, 120, 200, 255]))
    }

    fn ev(x: f32, y: f32, ms: u64) -> PointerEvent {
        PointerEvent { pos: Point::new(x, y), at: Duration::from_millis(ms), kind: PointerKind::Mouse }
    }

    /// Park a sprite somewhere calm, upright and still.
    fn park(scene: &mut Scene, id: SpriteId, x: f32, y: f32) {
        let s = scene.store_mut().get_mut(id).expect("sprite");
        (s.x, s.y, s.rotation, s.vx, s.vy, s.spin) = (x, y, 0.0, 0.0, 0.0, 0.0);
    }

    #[test]
    fn segmented_upload_becomes_a_sprite() {
        let mut s = scene();
        let id = s.on_segmented(drawing());
        assert_eq!(s.store().len(), 1);
        assert!(s.store().get(id).is_some());
    }

    #[test]
    fn tap_duplicates_with_stickers() {
        let mut s = scene();
        let id = s.on_segmented(drawing());
        park(&mut s, id, 400.0, 300.0);
        s.store_mut().get_mut(id).expect("sprite").attach(crate::stickers::Sticker::Crown, Point::new(500.0, 320.0), 200.0);

        assert!(s.pointer_down(ev(500.0, 400.0, 0)));
        s.pointer_up(ev(500.0, 400.0, 50));
        assert_eq!(s.store().len(), 2);
        let copy = &s.store().sprites()[1];
        assert_eq!((copy.x, copy.y), (400.0, 300.0));
        assert_eq!(copy.decorations.len(), 1);
        assert!(Arc::ptr_eq(&copy.image, &s.store().sprites()[0].image));
    }

    #[test]
    fn dragging_into_the_bin_deletes_exactly_one() {
        let mut s = scene();
        let a = s.on_segmented(drawing());
        let b = s.on_segmented(drawing());
        park(&mut s, a, 100.0, 300.0);
        park(&mut s, b, 400.0, 300.0);
        s.pointer_down(ev(500.0, 400.0, 0));
        s.pointer_move(ev(1300.0, 800.0, 100));
        assert!(s.bin_highlighted());
        s.pointer_up(ev(1300.0, 800.0, 300));
        assert_eq!(s.store().len(), 1);
        assert!(s.store().get(b).is_none());
        assert!(s.store().get(a).is_some());
        assert!(!s.bin_highlighted());
    }

    #[test]
    fn held_sprite_stays_put_while_others_move() {
        let mut s = scene();
        let a = s.on_segmented(drawing());
        let b = s.on_segmented(drawing());
        park(&mut s, a, 100.0, 300.0);
        park(&mut s, b, 400.0, 300.0);
        s.store_mut().get_mut(a).expect("a").vx = 1.0;
        s.pointer_down(ev(500.0, 400.0, 0));
        for i in 0..10 {
            s.frame(Duration::from_millis(16 * i));
        }
        let held = s.store().get(b).expect("b");
        assert_eq!((held.x, held.y), (400.0, 300.0));
        assert_ne!(s.store().get(a).expect("a").x, 100.0);
    }

    #[test]
    fn sticker_drag_freezes_the_scene() {
        let mut s = scene();
        let id = s.on_segmented(drawing());
        park(&mut s, id, 400.0, 300.0);
        s.store_mut().get_mut(id).expect("sprite").vx = 1.0;
        let (_, slot) = s.layout().palette_slots().next().expect("slot");
        assert!(s.pointer_down(ev(slot.center().x, slot.center().y, 0)));
        s.frame(Duration::from_millis(16));
        assert_eq!(s.store().get(id).expect("sprite").x, 400.0);
        s.pointer_up(ev(450.0, 350.0, 100));
        assert_eq!(s.store().get(id).expect("sprite").decorations.len(), 1);
        assert!(s.cues().played() >= 1);
    }

    #[test]
    fn effect_buttons_toggle() {
        let mut s = scene();
        let (effect, slot) = s.layout().effect_slots().nth(3).expect("slot");
        assert!(s.pointer_down(ev(slot.center().x, slot.center().y, 0)));
        assert_eq!(s.particles().effect(), Some(effect));
        s.pointer_up(ev(slot.center().x, slot.center().y, 10));
        s.pointer_down(ev(slot.center().x, slot.center().y, 20));
        assert_eq!(s.particles().effect(), None);
        s.set_effect(Some(Effect::Bubbles));
        s.frame(Duration::ZERO);
        assert_eq!(s.particles().particles().len(), Effect::Bubbles.pool_size());
    }

    #[test]
    fn reset_clears_sprites_but_not_ids() {
        let mut s = scene();
        let first = s.on_segmented(drawing());
        s.on_segmented(drawing());
        s.reset(Duration::ZERO);
        assert_eq!(s.store().len(), 0);
        let next = s.on_segmented(drawing());
        assert!(next > first);
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn resize_recomputes_layout_and_sprites_stay_inside() {
        let mut s = scene();
        let id = s.on_segmented(drawing());
        park(&mut s, id, 1000.0, 550.0);
        s.resize(400.0, 300.0);
        assert!(s.layout().mobile);
        assert_eq!(s.layout().sprite_size, 75.0);
        s.frame(Duration::ZERO);
        let sp = s.store().get(id).expect("sprite");
        assert!(sp.x >= 0.0 && sp.x + 75.0 <= 400.0);
        assert!(sp.y >= 0.0 && sp.y + 75.0 <= 300.0);
    }

    #[test]
    fn backdrop_cycles() {
        let mut s = scene();
        assert_eq!(s.backdrops().current().label(), "sea");
        s.next_backdrop();
        assert_eq!(s.backdrops().current().label(), "rainbow");
    }
}

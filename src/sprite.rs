// Per-sprite simulation state and the store that keeps it in sync with the
// externally owned, ordered list of sprite identities.
// Visual: every floating cutout on screen is one `SpriteState`; the store's
// order is the draw order (last = on top).
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use rand::Rng;
use tracing::{debug, warn};

use crate::config::PhysicsConfig;
use crate::geom::{Point, Rect};
use crate::stickers::Sticker;
use crate::types::Texture;

/// Stable identity of a sprite; assigned once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u64);

/// Segmented drawing shared between the roster, the sprite, and its duplicates.
pub type SpriteImage = Arc<RgbaImage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecorationId(pub u32);

/// A sticker glued to a sprite, positioned in the sprite's unrotated local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub id: DecorationId,
    pub glyph: Sticker,
    /// Offset from the sprite center, within ±size/2 on each axis.
    pub rel: Point,
    pub rel_rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

/// How a new sprite comes into the world.
#[derive(Debug, Clone)]
pub enum SpritePayload {
    /// Freshly segmented upload: random spawn.
    Fresh(SpriteImage),
    /// Copy of an existing sprite, spawned where it was tapped.
    Duplicated { image: SpriteImage, position: Point, decorations: Vec<Decoration> },
}

impl SpritePayload {
    pub fn image(&self) -> &SpriteImage {
        match self {
            SpritePayload::Fresh(image) | SpritePayload::Duplicated { image, .. } => image,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpriteState {
    pub id: SpriteId,
    pub image: SpriteImage,
    /// Top-left corner of the bounding box.
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub rotation: f32,
    pub spin: f32,
    pub decorations: Vec<Decoration>,
    pub trail: VecDeque<TrailPoint>,
}

impl SpriteState {
    pub fn rect(&self, size: f32) -> Rect {
        Rect::square(self.x, self.y, size)
    }

    /// Glue a sticker at a global point; the offset is clamped into the sprite's local bounds.
    pub fn attach(&mut self, glyph: Sticker, at: Point, size: f32) -> DecorationId {
        let local = self.rect(size).to_local(at, self.rotation);
        let half = size / 2.0;
        let id = DecorationId(self.decorations.iter().map(|d| d.id.0 + 1).max().unwrap_or(0));
        self.decorations.push(Decoration {
            id,
            glyph,
            rel: Point::new(local.x.clamp(-half, half), local.y.clamp(-half, half)),
            rel_rotation: 0.0,
        });
        id
    }

    /// Where a decoration currently sits on screen.
    pub fn decoration_global(&self, d: &Decoration, size: f32) -> Point {
        self.rect(size).to_global(d.rel, self.rotation)
    }

    /// New random velocity and spin, as on birth or after a short release.
    pub fn randomize_motion<R: Rng>(&mut self, cfg: &PhysicsConfig, rng: &mut R) {
        self.vx = uniform(rng, -cfg.spawn_vx, cfg.spawn_vx);
        self.vy = uniform(rng, -cfg.spawn_vy, cfg.spawn_vy);
        self.spin = uniform(rng, -cfg.spawn_spin, cfg.spawn_spin);
    }
}

/// Uniform in [lo, hi); an empty range yields `lo` instead of panicking.
pub fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    lo + (hi - lo) * rng.random::<f32>()
}

/// Canvas dimensions a new sprite must fit into.
#[derive(Debug, Clone, Copy)]
pub struct SpawnArea {
    pub width: f32,
    pub height: f32,
    pub sprite_size: f32,
}

impl SpawnArea {
    fn max_x(&self) -> f32 {
        (self.width - self.sprite_size).max(0.0)
    }

    fn max_y(&self) -> f32 {
        (self.height - self.sprite_size).max(0.0)
    }
}

struct CachedTexture {
    side: usize,
    texture: Texture,
}

/// Live sprite states in draw order, plus scaled textures keyed the same way.
#[derive(Default)]
pub struct SpriteStore {
    sprites: Vec<SpriteState>,
    textures: HashMap<SpriteId, CachedTexture>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync to the external identity list.
    /// Surviving ids keep their state untouched, new ids are spawned from their
    /// payload, and ids missing from `order` are dropped along with their textures.
    pub fn reconcile<R: Rng>(
        &mut self,
        order: &[SpriteId],
        payloads: &HashMap<SpriteId, SpritePayload>,
        area: SpawnArea,
        cfg: &PhysicsConfig,
        rng: &mut R,
    ) {
        let mut live: HashMap<SpriteId, SpriteState> = self.sprites.drain(..).map(|s| (s.id, s)).collect();
        let mut next = Vec::with_capacity(order.len());

        for &id in order {
            if let Some(state) = live.remove(&id) {
                next.push(state);
                continue;
            }
            let Some(payload) = payloads.get(&id) else {
                debug_assert!(false, "sprite {id:?} listed without a payload");
                warn!(?id, "sprite listed without a payload; skipped");
                continue;
            };
            let state = spawn(id, payload, area, cfg, rng);
            debug!(?id, x = state.x, y = state.y, decorations = state.decorations.len(), "sprite created");
            next.push(state);
        }

        for id in live.keys() {
            debug!(?id, "sprite dropped");
        }
        self.sprites = next;
        let sprites = &self.sprites;
        self.textures.retain(|id, _| sprites.iter().any(|s| s.id == *id));
    }

    pub fn sprites(&self) -> &[SpriteState] {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut [SpriteState] {
        &mut self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn get(&self, id: SpriteId) -> Option<&SpriteState> {
        self.sprites.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut SpriteState> {
        self.sprites.iter_mut().find(|s| s.id == id)
    }

    /// Sprites in draw order, each with its texture scaled to `side`×`side`.
    /// Textures are built on first use and rebuilt when the size changes; the
    /// texture is `None` while the source has no pixels.
    pub fn draw_list(&mut self, side: usize) -> impl Iterator<Item = (&SpriteState, Option<&Texture>)> {
        for sprite in &self.sprites {
            if self.textures.get(&sprite.id).is_none_or(|c| c.side != side) {
                match build_texture(&sprite.image, side) {
                    Some(texture) => self.textures.insert(sprite.id, CachedTexture { side, texture }),
                    None => self.textures.remove(&sprite.id),
                };
            }
        }
        let textures = &self.textures;
        self.sprites.iter().map(move |s| (s, textures.get(&s.id).map(|c| &c.texture)))
    }

    #[cfg(test)]
    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }
}

fn spawn<R: Rng>(id: SpriteId, payload: &SpritePayload, area: SpawnArea, cfg: &PhysicsConfig, rng: &mut R) -> SpriteState {
    let (x, y, decorations) = match payload {
        SpritePayload::Fresh(_) => (uniform(rng, 0.0, area.max_x()), uniform(rng, 0.0, area.max_y()), Vec::new()),
        SpritePayload::Duplicated { position, decorations, .. } => (
            position.x.clamp(0.0, area.max_x()),
            position.y.clamp(0.0, area.max_y()),
            decorations.clone(),
        ),
    };
    let mut state = SpriteState {
        id,
        image: Arc::clone(payload.image()),
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        rotation: uniform(rng, -cfg.max_rotation, cfg.max_rotation),
        spin: 0.0,
        decorations,
        trail: VecDeque::with_capacity(cfg.trail_len + 1),
    };
    state.randomize_motion(cfg, rng);
    state
}

/// Scale the segmented drawing to the sprite box and pack it as 0xAARRGGBB.
fn build_texture(image: &RgbaImage, side: usize) -> Option<Texture> {
    if side == 0 || image.width() == 0 || image.height() == 0 {
        return None;
    }
    let side_u32 = u32::try_from(side).ok()?;
    let scaled = imageops::resize(image, side_u32, side_u32, FilterType::Triangle);
    let pixels = scaled
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        })
        .collect();
    Some(Texture { width: side, height: side, pixels })
}

// Hit-testing against sprites, their stickers, and the palette/effect buttons.
// The topmost sprite (last in draw order) always wins.
use crate::config::Layout;
use crate::geom::Point;
use crate::particles::Effect;
use crate::sprite::{SpriteId, SpriteStore};
use crate::stickers::Sticker;

/// Topmost sprite whose rotated box, grown by `margin`, contains `p`.
pub fn sprite_at(store: &SpriteStore, p: Point, size: f32, margin: f32) -> Option<SpriteId> {
    store
        .sprites()
        .iter()
        .rev()
        .find(|s| s.rect(size).inflate(margin).contains_rotated(p, s.rotation))
        .map(|s| s.id)
}

/// Topmost sprite carrying a sticker within `radius` of `p`.
pub fn decoration_at(store: &SpriteStore, p: Point, size: f32, radius: f32) -> Option<SpriteId> {
    store
        .sprites()
        .iter()
        .rev()
        .find(|s| s.decorations.iter().any(|d| s.decoration_global(d, size).distance(p) < radius))
        .map(|s| s.id)
}

/// Where a dropped sticker lands: a sprite body first, otherwise a sprite's existing sticker.
pub fn drop_target(store: &SpriteStore, p: Point, size: f32, margin: f32, radius: f32) -> Option<SpriteId> {
    sprite_at(store, p, size, margin).or_else(|| decoration_at(store, p, size, radius))
}

pub fn palette_entry_at(layout: &Layout, p: Point) -> Option<Sticker> {
    layout.palette_slots().find(|(_, r)| r.contains(p)).map(|(s, _)| s)
}

pub fn effect_button_at(layout: &Layout, p: Point) -> Option<Effect> {
    layout.effect_slots().find(|(_, r)| r.contains(p)).map(|(e, _)| e)
}

// Tuning constants and the on-screen layout derived from the viewport.
// Visual: these numbers decide how fast sprites drift, where the menus sit,
// how big the bin is, and how forgiving taps and drags feel.
use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

use crate::geom::{Circle, Point, Rect};
use crate::particles::Effect;
use crate::physics::Obstacle;
use crate::segment::SegmentPreset;
use crate::stickers::Sticker;

/// Motion limits and random-walk amplitudes, all in pixels (or radians) per frame.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    pub vx_max: f32,
    pub vy_max: f32,
    pub spin_max: f32,
    pub max_rotation: f32,
    pub walk_vx: f32,
    pub walk_vy: f32,
    pub walk_spin: f32,
    /// Half-ranges used when a sprite is born or released.
    pub spawn_vx: f32,
    pub spawn_vy: f32,
    pub spawn_spin: f32,
    pub trail_len: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            vx_max: 1.8,
            vy_max: 1.2,
            spin_max: 0.01,
            max_rotation: FRAC_PI_4,
            walk_vx: 0.045,
            walk_vy: 0.03,
            walk_spin: 0.000_25,
            spawn_vx: 1.75,
            spawn_vy: 1.25,
            spawn_spin: 0.005,
            trail_len: 18,
        }
    }
}

/// Gesture thresholds for telling taps, drags and sticker drops apart.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Movement (per axis) beyond which a press becomes a real drag.
    pub drag_threshold: f32,
    pub tap_max_duration: Duration,
    pub tap_max_movement: f32,
    /// Shorter drags release with zero velocity.
    pub release_min_duration: Duration,
    pub release_scale: f32,
    /// Sticker drops also land within this fraction of the sprite size around it.
    pub sticker_margin: f32,
    pub decoration_hit_radius: f32,
    pub failed_attach_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            tap_max_duration: Duration::from_millis(400),
            tap_max_movement: 12.0,
            release_min_duration: Duration::from_millis(40),
            release_scale: 0.04,
            sticker_margin: 0.12,
            decoration_hit_radius: 32.0,
            failed_attach_duration: Duration::from_millis(400),
        }
    }
}

/// Delete target in the bottom-right corner.
#[derive(Debug, Clone)]
pub struct BinConfig {
    pub size: f32,
    pub margin_desktop: f32,
    pub margin_mobile: f32,
    /// Added to the half-size to get the hit radius; negative shrinks it.
    pub touch_extra: f32,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self { size: 80.0, margin_desktop: 40.0, margin_mobile: 24.0, touch_extra: -40.0 }
    }
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub physics: PhysicsConfig,
    pub gesture: GestureConfig,
    pub bin: BinConfig,
    /// Viewports narrower than this use the compact layout.
    pub mobile_breakpoint: f32,
    pub segment: SegmentPreset,
    /// Minimum gap between two plays of the same bounce cue.
    pub cue_cooldown: Duration,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            gesture: GestureConfig::default(),
            bin: BinConfig::default(),
            mobile_breakpoint: 700.0,
            segment: SegmentPreset::Canonical,
            cue_cooldown: Duration::from_millis(1000),
        }
    }
}

/// Where everything sits for one viewport size. Recomputed on resize.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub mobile: bool,
    /// Sprites are square, a quarter of the short side.
    pub sprite_size: f32,
    pub effects_menu: Rect,
    pub backgrounds_menu: Rect,
    pub upload_button: Rect,
    pub sticker_palette: Rect,
    /// Hit circle used for drag-to-delete.
    pub bin_hit: Circle,
    /// Drawn disc around the bin icon.
    pub bin_disc: Circle,
    pub bin_size: f32,
}

impl Layout {
    pub fn compute(width: f32, height: f32, cfg: &SceneConfig) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let mobile = width < cfg.mobile_breakpoint;
        let pick = |compact: f32, wide: f32| if mobile { compact } else { wide };

        let side_margin = pick(8.0, 18.0);
        let effects_h = 60.0;
        let effects_gap = pick(8.0, 16.0);
        let bottom_margin = pick(16.0, 32.0);
        let effects_bottom = bottom_margin + pick(63.0, 0.0);
        let palette_h = pick(48.0, 72.0);
        let palette_bottom = effects_bottom + effects_gap + effects_h;

        let effects_menu = Rect::new(
            side_margin,
            height - effects_bottom - effects_h,
            width - 2.0 * side_margin,
            effects_h,
        );
        let sticker_palette = if mobile {
            Rect::new(0.0, height - palette_bottom - palette_h, width, palette_h)
        } else {
            Rect::new(side_margin, height - palette_bottom - palette_h, width - 2.0 * side_margin, palette_h)
        };

        let backgrounds_menu = Rect::new(18.0, 12.0, 420.0, 56.0);
        let upload_button = Rect::new(18.0, 12.0 + 56.0 + pick(8.0, 16.0), 340.0, 56.0);

        let bin = &cfg.bin;
        let margin = pick(bin.margin_mobile, bin.margin_desktop);
        let bin_center = Point::new(
            width - bin.size - margin + bin.size / 2.0,
            height - bin.size - margin + bin.size / 2.0,
        );

        Self {
            width,
            height,
            mobile,
            sprite_size: width.min(height) / 4.0,
            effects_menu,
            backgrounds_menu,
            upload_button,
            sticker_palette,
            bin_hit: Circle { center: bin_center, radius: (bin.size / 2.0 + bin.touch_extra).max(0.0) },
            bin_disc: Circle { center: bin_center, radius: bin.size / 2.0 + 16.0 },
            bin_size: bin.size,
        }
    }

    /// UI footprints sprites bounce off, in the order they are resolved.
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let mut out = vec![
            Obstacle::Bounce { rect: self.effects_menu },
            Obstacle::Bounce { rect: self.backgrounds_menu },
            Obstacle::Bounce { rect: self.upload_button },
        ];
        if self.mobile {
            out.push(Obstacle::KeepAbove { rect: self.sticker_palette });
        }
        out
    }

    /// One square-ish slot per sticker across the palette.
    pub fn palette_slots(&self) -> impl Iterator<Item = (Sticker, Rect)> + '_ {
        let slot_w = self.sticker_palette.w / Sticker::ALL.len() as f32;
        Sticker::ALL.iter().enumerate().map(move |(i, s)| {
            let r = &self.sticker_palette;
            (*s, Rect::new(r.x + i as f32 * slot_w, r.y, slot_w, r.h))
        })
    }

    /// One button per ambient effect across the effects menu.
    pub fn effect_slots(&self) -> impl Iterator<Item = (Effect, Rect)> + '_ {
        let slot_w = self.effects_menu.w / Effect::ALL.len() as f32;
        Effect::ALL.iter().enumerate().map(move |(i, e)| {
            let r = &self.effects_menu;
            (*e, Rect::new(r.x + i as f32 * slot_w, r.y, slot_w, r.h))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_layout_matches_reference_numbers() {
        let cfg = SceneConfig::default();
        let l = Layout::compute(1280.0, 800.0, &cfg);
        assert!(!l.mobile);
        assert_eq!(l.sprite_size, 200.0);
        assert_eq!(l.effects_menu, Rect::new(18.0, 708.0, 1244.0, 60.0));
        assert_eq!(l.sticker_palette, Rect::new(18.0, 620.0, 1244.0, 72.0));
        assert_eq!(l.upload_button.y, 84.0);
        assert_eq!(l.bin_hit.center, Point::new(1200.0, 720.0));
        assert_eq!(l.bin_hit.radius, 0.0);
        assert_eq!(l.obstacles().len(), 3);
    }

    #[test]
    fn mobile_layout_adds_palette_floor() {
        let cfg = SceneConfig::default();
        let l = Layout::compute(400.0, 800.0, &cfg);
        assert!(l.mobile);
        assert_eq!(l.sticker_palette.x, 0.0);
        assert_eq!(l.sticker_palette.w, 400.0);
        assert!(matches!(l.obstacles().last(), Some(Obstacle::KeepAbove { .. })));
    }

    #[test]
    fn tiny_viewport_never_yields_negative_rects() {
        let l = Layout::compute(10.0, 10.0, &SceneConfig::default());
        for o in l.obstacles() {
            let (Obstacle::Bounce { rect, .. } | Obstacle::KeepAbove { rect }) = o;
            assert!(rect.w >= 0.0 && rect.h >= 0.0);
        }
    }

    #[test]
    fn palette_slots_cover_every_sticker() {
        let l = Layout::compute(1280.0, 800.0, &SceneConfig::default());
        let slots: Vec<_> = l.palette_slots().collect();
        assert_eq!(slots.len(), Sticker::ALL.len());
        assert!((slots.last().map_or(0.0, |(_, r)| r.right()) - l.sticker_palette.right()).abs() < 1e-3);
    }
}

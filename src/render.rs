// Paints one frame of the aquarium into the framebuffer.
// Visual, back to front:
// 1) The selected backdrop, stretched to the window.
// 2) The ambient effect (bubbles, sparkles, confetti, snow or glyph rain).
// 3) Every sprite in draw order, each with its rainbow trail and stickers.
//    The sprite being dragged glows, grows to 120% and turns slightly see-through.
// 4) The bin in the bottom-right corner, red while a dragged sprite is over it.
// 5) Menus, sticker palette, the sticker being placed, and the HUD line.
use std::time::Duration;

use crate::draw::{
    additive_disc, draw_bitmap8, draw_text_5x7, fill_disc, fill_rect, fill_rotated, stamp_segment, stroke_circle,
    stroke_rect, text_width_5x7,
};
use crate::geom::{Point, Rect, rotate};
use crate::particles::{Effect, Particle, hsl_to_rgb};
use crate::scene::Scene;
use crate::sprite::SpriteState;
use crate::stickers::{BIN_ICON, Sticker};
use crate::types::FrameBuffer;

const DRAG_SCALE: f32 = 1.2;
const DRAG_ALPHA: f32 = 0.85;
/// Sticker edge length relative to the sprite size.
const STICKER_SCALE: f32 = 0.22;

const PANEL: u32 = 0x00FF_FFFF;
const PANEL_ALPHA: f32 = 0.72;
const INK: u32 = 0x0026_3238;
const ACCENT: u32 = 0x0042_A5F5;

/// Numbers shown in the HUD line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hud {
    pub fps: f32,
    pub pending_uploads: usize,
}

/// Draw the whole scene for scene time `now`.
pub fn draw_frame(fb: &mut FrameBuffer, scene: &mut Scene, now: Duration, hud: &Hud) {
    let (w, h) = (fb.width, fb.height);
    let backdrop = scene.backdrops_mut().pixels(w, h);
    if backdrop.len() == fb.pixels.len() {
        fb.pixels.copy_from_slice(backdrop);
    } else {
        fb.pixels.fill(0);
    }

    draw_particles(fb, scene);
    draw_sprites(fb, scene);
    draw_bin(fb, scene);
    draw_chrome(fb, scene, hud);
    draw_sticker_overlays(fb, scene, now);
}

fn draw_particles(fb: &mut FrameBuffer, scene: &Scene) {
    let Some(effect) = scene.particles().effect() else { return };
    for (i, p) in scene.particles().particles().iter().enumerate() {
        draw_particle(fb, effect, i, p);
    }
}

fn draw_particle(fb: &mut FrameBuffer, effect: Effect, index: usize, p: &Particle) {
    let center = Point::new(p.x, p.y);
    let alpha = p.alpha.clamp(0.0, 1.0);
    match effect {
        Effect::Bubbles => {
            fill_disc(fb, center, p.size, 0x00B3_E5FC, alpha * 0.25);
            stroke_circle(fb, center, p.size, 2.0, 0x00FF_FFFF, alpha * 0.8);
            fill_disc(fb, Point::new(p.x - p.size * 0.35, p.y - p.size * 0.35), p.size * 0.2, 0x00FF_FFFF, alpha);
        }
        Effect::Sparkles => {
            let twinkle = 0.5 + 0.5 * p.phase.sin();
            additive_disc(fb, p.x as i32, p.y as i32, p.size as i32, 0x00FF_F59D, alpha * twinkle);
            let arm = p.size * twinkle;
            stamp_segment(fb, Point::new(p.x - arm, p.y), Point::new(p.x + arm, p.y), 0.6, 0x00FF_FFFF, alpha * twinkle);
            stamp_segment(fb, Point::new(p.x, p.y - arm), Point::new(p.x, p.y + arm), 0.6, 0x00FF_FFFF, alpha * twinkle);
        }
        Effect::Confetti => {
            let half = p.size / 2.0;
            let color = p.color;
            fill_rotated(fb, center, half, p.angle, |_, ly| (ly.abs() < half * 0.5).then_some((color, 1.0)));
        }
        Effect::Snow => fill_disc(fb, center, p.size / 2.0, 0x00FF_FFFF, alpha),
        Effect::GlyphRain => {
            let glyph = Sticker::ALL[index % Sticker::ALL.len()];
            draw_sticker(fb, glyph, center, p.size, p.angle, alpha);
        }
    }
}

fn draw_sprites(fb: &mut FrameBuffer, scene: &mut Scene) {
    let size = scene.layout().sprite_size;
    let side = size.round().max(0.0) as usize;
    let dragged = scene.input().dragged_sprite();

    for (sprite, texture) in scene.store_mut().draw_list(side) {
        let Some(texture) = texture else { continue };
        let lifted = dragged == Some(sprite.id);
        let (scale, alpha) = if lifted { (DRAG_SCALE, DRAG_ALPHA) } else { (1.0, 1.0) };
        let center = sprite.rect(size).center();

        draw_trail(fb, sprite, size);
        if lifted {
            additive_disc(fb, center.x as i32, center.y as i32, (size * 0.75) as i32, 0x00FF_E082, 0.6);
        }

        let half_tex = side as f32 / 2.0;
        fill_rotated(fb, center, size * scale / 2.0, sprite.rotation, |lx, ly| {
            let px = texture.sample(lx / scale * (side as f32 / size) + half_tex, ly / scale * (side as f32 / size) + half_tex)?;
            let a = (px >> 24) as f32 / 255.0;
            (a > 0.0).then_some((px, a * alpha))
        });

        for d in &sprite.decorations {
            let (ox, oy) = rotate(d.rel.x * scale, d.rel.y * scale, sprite.rotation);
            let at = Point::new(center.x + ox, center.y + oy);
            let glyph_size = size * STICKER_SCALE * scale;
            draw_sticker(fb, d.glyph, at, glyph_size, sprite.rotation + d.rel_rotation, alpha);
        }
    }
}

/// Fading rainbow dots along the recent path of the sprite's center.
fn draw_trail(fb: &mut FrameBuffer, sprite: &SpriteState, size: f32) {
    let n = sprite.trail.len();
    for (i, t) in sprite.trail.iter().enumerate() {
        let age = (i + 1) as f32 / n as f32; // 1.0 = newest
        let color = hsl_to_rgb(i as f32 * 360.0 / n as f32, 0.85, 0.65);
        fill_disc(fb, Point::new(t.x, t.y), size * 0.06 * (0.4 + 0.6 * age), color, 0.35 * age);
    }
}

/// A sticker glyph `size` pixels wide, turned by `angle`.
fn draw_sticker(fb: &mut FrameBuffer, glyph: Sticker, center: Point, size: f32, angle: f32, alpha: f32) {
    let half = size / 2.0;
    let cell = size / 8.0;
    let color = glyph.color();
    fill_rotated(fb, center, half, angle, |lx, ly| {
        let col = ((lx + half) / cell) as i32;
        let row = ((ly + half) / cell) as i32;
        glyph.filled(col, row).then_some((color, alpha))
    });
}

fn draw_bin(fb: &mut FrameBuffer, scene: &Scene) {
    let layout = scene.layout();
    let disc = layout.bin_disc;
    if scene.bin_highlighted() {
        fill_disc(fb, disc.center, disc.radius, 0x00E5_3935, 0.85);
        stroke_circle(fb, disc.center, disc.radius, 3.0, 0x00FF_FFFF, 0.9);
    } else {
        fill_disc(fb, disc.center, disc.radius, INK, 0.55);
    }
    draw_bitmap8(fb, &BIN_ICON, disc.center, layout.bin_size * 0.6, 0.0, 0x00FF_FFFF, 1.0);
}

fn panel(fb: &mut FrameBuffer, rect: Rect) {
    fill_rect(fb, rect, PANEL, PANEL_ALPHA);
    stroke_rect(fb, rect, INK);
}

/// Text centered vertically, left-padded inside `rect`.
fn label(fb: &mut FrameBuffer, rect: Rect, text: &str) {
    draw_text_5x7(fb, rect.x as i32 + 12, (rect.center().y - 3.5) as i32, text, INK);
}

fn draw_chrome(fb: &mut FrameBuffer, scene: &Scene, hud: &Hud) {
    let layout = scene.layout();

    panel(fb, layout.backgrounds_menu);
    label(fb, layout.backgrounds_menu, &format!("B: BACKGROUND - {}", scene.backdrops().current().label()));

    panel(fb, layout.upload_button);
    let uploads = match hud.pending_uploads {
        0 => "UPLOADS: READY".to_string(),
        n => format!("UPLOADS: {n} PENDING"),
    };
    label(fb, layout.upload_button, &uploads);

    let active = scene.particles().effect();
    for (effect, slot) in layout.effect_slots() {
        let inner = slot.inflate(-3.0);
        if active == Some(effect) {
            fill_rect(fb, inner, ACCENT, 0.9);
        } else {
            fill_rect(fb, inner, PANEL, PANEL_ALPHA);
        }
        stroke_rect(fb, inner, INK);
        let text = effect.label();
        let x = (inner.center().x as i32) - text_width_5x7(text) / 2;
        draw_text_5x7(fb, x, (inner.center().y - 3.5) as i32, text, INK);
    }

    panel(fb, layout.sticker_palette);
    for (sticker, slot) in layout.palette_slots() {
        let glyph = slot.w.min(slot.h) * 0.6;
        draw_sticker(fb, sticker, slot.center(), glyph, 0.0, 1.0);
    }

    let line = format!("SPRITES: {} | FPS: {:.1} | R: RESET  1-5/0: EFFECTS", scene.store().len(), hud.fps);
    let x = fb.width as i32 - text_width_5x7(&line) - 8;
    draw_text_5x7(fb, x.max(8), 8, &line, 0x00FF_FFFF);
}

/// The sticker under the pointer, or the fading marker of one that missed.
fn draw_sticker_overlays(fb: &mut FrameBuffer, scene: &Scene, now: Duration) {
    let size = scene.layout().sprite_size * STICKER_SCALE;
    if let Some((glyph, at)) = scene.input().decoration_preview() {
        draw_sticker(fb, glyph, at, size, 0.0, 0.9);
    }
    let gesture = &scene.config().gesture;
    if let Some(failed) = scene.input().failed_attach(now, gesture) {
        let age = now.saturating_sub(failed.since).as_secs_f32() / gesture.failed_attach_duration.as_secs_f32();
        let fade = (1.0 - age).clamp(0.0, 1.0);
        draw_sticker(fb, failed.glyph, failed.at, size, 0.0, 0.6 * fade);
        let r = size * 0.5;
        let (c, red) = (failed.at, 0x00E5_3935);
        stamp_segment(fb, Point::new(c.x - r, c.y - r), Point::new(c.x + r, c.y + r), 2.0, red, fade);
        stamp_segment(fb, Point::new(c.x - r, c.y + r), Point::new(c.x + r, c.y - r), 2.0, red, fade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backdrop::Backdrops;
    use crate::config::SceneConfig;
    use image::{Rgba, RgbaImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scene(w: f32, h: f32) -> Scene {
        Scene::new(SceneConfig::default(), w, h, Backdrops::new(Vec::new()), StdRng::seed_from_u64(61))
    }

    #[test]
    fn sprite_pixels_reach_the_framebuffer() {
        let mut s = scene(640.0, 480.0);
        let id = s.on_segmented(RgbaImage::from_pixel(8, 8, Rgba([250, 0, 250, 255])));
        let sp = s.store_mut().get_mut(id).expect("sprite");
        (sp.x, sp.y, sp.rotation) = (200.0, 150.0, 0.0);
        let mut fb = FrameBuffer::new(640, 480);
        draw_frame(&mut fb, &mut s, Duration::ZERO, &Hud::default());
        // Sprite size is 120: the center (260,210) shows the drawing.
        assert_eq!(fb.pixels[210 * 640 + 260], 0x00FA_00FA);
    }

    #[test]
    fn transparent_drawing_leaves_backdrop_visible() {
        let mut s = scene(320.0, 240.0);
        let id = s.on_segmented(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        let sp = s.store_mut().get_mut(id).expect("sprite");
        // Below the menus and left of the bin.
        (sp.x, sp.y, sp.rotation) = (40.0, 170.0, 0.0);
        let mut fb = FrameBuffer::new(320, 240);
        draw_frame(&mut fb, &mut s, Duration::ZERO, &Hud::default());
        let backdrop = s.backdrops_mut().pixels(320, 240)[200 * 320 + 70];
        assert_eq!(fb.pixels[200 * 320 + 70], backdrop);
    }

    #[test]
    fn every_effect_renders_inside_a_small_window() {
        let mut s = scene(200.0, 150.0);
        let mut fb = FrameBuffer::new(200, 150);
        for effect in Effect::ALL {
            s.set_effect(Some(effect));
            for i in 0..5 {
                s.frame(Duration::from_millis(16 * i));
            }
            draw_frame(&mut fb, &mut s, Duration::from_millis(80), &Hud { fps: 60.0, pending_uploads: 2 });
        }
        assert!(fb.pixels.iter().all(|p| p >> 24 == 0));
    }

    #[test]
    fn empty_image_is_skipped() {
        let mut s = scene(320.0, 240.0);
        s.on_segmented(RgbaImage::new(0, 0));
        let mut fb = FrameBuffer::new(320, 240);
        draw_frame(&mut fb, &mut s, Duration::ZERO, &Hud::default());
        assert_eq!(s.store().cached_textures(), 0);
    }
}

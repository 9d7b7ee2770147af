// Window + software drawing utilities.
// Visual effects provided here:
// 1) A resizable window that shows the aquarium canvas.
// 2) Filled and translucent shapes: panels, discs, rings, glowing dots.
// 3) Rotated, scaled blits for sprites and sticker glyphs.
// 4) A tiny 5x7 bitmap font for labels and the HUD line.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::gamma::GammaLut;
use crate::geom::{Point, Rect, rotate};
use crate::types::FrameBuffer;

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window of the requested size.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Current client-area size; changes when the user resizes the window.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Pointer position in canvas pixels, `None` while it is outside the window.
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window.get_mouse_pos(MouseMode::Discard).map(|(x, y)| Point::new(x, y))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Keys that went down since the last update (no auto-repeat).
    pub fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::No)
    }
}

/* ---------- Pixels and flat shapes ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color & 0x00FF_FFFF;
}

/// Mix `color` into the pixel at (x,y) with opacity `alpha`.
#[inline]
pub fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32, alpha: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = GammaLut::shared().blend(fb.pixels[idx], color, alpha);
}

/// Pixel span of a float interval, clipped to `0..limit`.
fn span(lo: f32, hi: f32, limit: usize) -> std::ops::Range<i32> {
    let lo = lo.floor().max(0.0) as i32;
    let hi = hi.ceil().min(limit as f32).max(0.0) as i32;
    lo..hi.max(lo)
}

/// Fill an axis-aligned rectangle, optionally translucent.
/// Visual: menu panels, buttons, the palette strip.
pub fn fill_rect(fb: &mut FrameBuffer, rect: Rect, color: u32, alpha: f32) {
    for y in span(rect.y, rect.bottom(), fb.height) {
        for x in span(rect.x, rect.right(), fb.width) {
            blend_pixel(fb, x, y, color, alpha);
        }
    }
}

/// One-pixel rectangle outline.
pub fn stroke_rect(fb: &mut FrameBuffer, rect: Rect, color: u32) {
    let (x0, y0) = (rect.x as i32, rect.y as i32);
    let (x1, y1) = (rect.right() as i32 - 1, rect.bottom() as i32 - 1);
    for x in x0..=x1 {
        put_pixel(fb, x, y0, color);
        put_pixel(fb, x, y1, color);
    }
    for y in y0..=y1 {
        put_pixel(fb, x0, y, color);
        put_pixel(fb, x1, y, color);
    }
}

/// Solid disc with a one-pixel soft edge.
/// Visual: trail dots, the bin backdrop, bubbles and snowflakes.
pub fn fill_disc(fb: &mut FrameBuffer, center: Point, radius: f32, color: u32, alpha: f32) {
    if radius <= 0.0 {
        return;
    }
    for y in span(center.y - radius - 1.0, center.y + radius + 1.0, fb.height) {
        for x in span(center.x - radius - 1.0, center.x + radius + 1.0, fb.width) {
            let d = Point::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
            let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_pixel(fb, x, y, color, alpha * coverage);
            }
        }
    }
}

/// Ring of the given thickness.
/// Visual: bubble outlines and the highlighted bin rim.
pub fn stroke_circle(fb: &mut FrameBuffer, center: Point, radius: f32, thickness: f32, color: u32, alpha: f32) {
    let outer = radius + thickness / 2.0;
    let inner = (radius - thickness / 2.0).max(0.0);
    for y in span(center.y - outer - 1.0, center.y + outer + 1.0, fb.height) {
        for x in span(center.x - outer - 1.0, center.x + outer + 1.0, fb.width) {
            let d = Point::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
            let coverage = (outer - d + 0.5).clamp(0.0, 1.0) * (d - inner + 0.5).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_pixel(fb, x, y, color, alpha * coverage);
            }
        }
    }
}

/// Additive blend one RGB triplet at (x,y) with saturation to 255.
/// Visual: the pixel gets brighter; repeated draws stack until white.
#[inline]
fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, r: u8, g: u8, b: u8) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    let old = fb.pixels[idx];
    let nr = (((old >> 16) & 0xFF) as u16 + r as u16).min(255) as u32;
    let ng = (((old >> 8) & 0xFF) as u16 + g as u16).min(255) as u32;
    let nb = ((old & 0xFF) as u16 + b as u16).min(255) as u32;
    fb.pixels[idx] = (nr << 16) | (ng << 8) | nb;
}

/// Soft round glow centered at (cx,cy) with additive blending.
/// `strength` in [0,1] scales brightness; `base` is 0x00RRGGBB.
/// Visual: a fuzzy dot of light, brightest in the middle.
pub fn additive_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, base: u32, strength: f32) {
    if radius <= 0 {
        return;
    }
    let (base_r, base_g, base_b) = crate::types::unpack_rgb(base);
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;

    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            // Gaussian falloff: 1.0 at center → ~0 at edge
            let w = (-d2 / denom).exp() * strength;
            let r = (base_r as f32 * w).round().clamp(0.0, 255.0) as u8;
            let g = (base_g as f32 * w).round().clamp(0.0, 255.0) as u8;
            let b = (base_b as f32 * w).round().clamp(0.0, 255.0) as u8;
            add_rgb_saturating(fb, x, y, r, g, b);
        }
    }
}

/// Thick line made of stamped discs every ~2px.
/// Visual: the sparkle cross and the failed-attach "X".
pub fn stamp_segment(fb: &mut FrameBuffer, from: Point, to: Point, radius: f32, color: u32, alpha: f32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = (dx * dx + dy * dy).sqrt().max(1.0);
    let steps = (dist / 2.0).ceil() as i32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        fill_disc(fb, Point::new(from.x + dx * t, from.y + dy * t), radius, color, alpha);
    }
}

/* ---------- Rotated blits ---------- */

/// Paint a square of side `2 * half` centered at `center`, turned by `angle`.
/// `sample(lx, ly)` receives coordinates in the square's own frame (origin at
/// its center, each axis in `-half..half`) and returns the colour and opacity
/// there, or `None` for a hole.
/// Visual: sprites, stickers and confetti all go through here.
pub fn fill_rotated<F>(fb: &mut FrameBuffer, center: Point, half: f32, angle: f32, sample: F)
where
    F: Fn(f32, f32) -> Option<(u32, f32)>,
{
    if half <= 0.0 {
        return;
    }
    // A turned square never reaches past its circumscribed circle.
    let reach = half * std::f32::consts::SQRT_2;
    for y in span(center.y - reach, center.y + reach, fb.height) {
        for x in span(center.x - reach, center.x + reach, fb.width) {
            let (lx, ly) = rotate(x as f32 + 0.5 - center.x, y as f32 + 0.5 - center.y, -angle);
            if lx.abs() >= half || ly.abs() >= half {
                continue;
            }
            if let Some((color, alpha)) = sample(lx, ly) {
                blend_pixel(fb, x, y, color, alpha);
            }
        }
    }
}

/// 8x8 one-bit glyph scaled to `size` pixels and turned by `angle`.
/// Bit 7 of each row is the leftmost cell.
pub fn draw_bitmap8(fb: &mut FrameBuffer, rows: &[u8; 8], center: Point, size: f32, angle: f32, color: u32, alpha: f32) {
    let half = size / 2.0;
    let cell = size / 8.0;
    fill_rotated(fb, center, half, angle, |lx, ly| {
        let col = ((lx + half) / cell) as usize;
        let row = ((ly + half) / cell) as usize;
        let bits = rows.get(row.min(7))?;
        (bits & (0x80 >> col.min(7)) != 0).then_some((color, alpha))
    });
}

/* ---------- 5x7 bitmap font ---------- */

/// Return a 5x7 glyph bitmap. Lowercase letters are drawn as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b10001,0b01010,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, ink) in [(1, 0x0000_0000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, ink);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

/// Width in pixels of `text` as drawn by [`draw_text_5x7`].
pub fn text_width_5x7(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping_never_panics() {
        let mut fb = FrameBuffer::new(16, 16);
        fill_rect(&mut fb, Rect::new(-10.0, -10.0, 100.0, 100.0), 0x00FF_0000, 1.0);
        fill_disc(&mut fb, Point::new(-3.0, 20.0), 8.0, 0x0000_FF00, 0.5);
        stroke_circle(&mut fb, Point::new(8.0, 8.0), 30.0, 2.0, 0x0000_00FF, 1.0);
        additive_disc(&mut fb, 15, 15, 6, 0x00FF_FFFF, 1.0);
        fill_rotated(&mut fb, Point::new(0.0, 0.0), 20.0, 0.7, |_, _| Some((0x0012_3456, 1.0)));
        draw_text_5x7(&mut fb, 10, 12, "ABC xyz 0:9", 0x00FF_FFFF);
        assert_eq!(fb.pixels.len(), 256);
    }

    #[test]
    fn fill_rect_covers_exact_pixels() {
        let mut fb = FrameBuffer::new(8, 8);
        fill_rect(&mut fb, Rect::new(2.0, 3.0, 2.0, 1.0), 0x00AB_CDEF, 1.0);
        let lit: Vec<usize> = (0..64).filter(|&i| fb.pixels[i] != 0).collect();
        assert_eq!(lit, vec![3 * 8 + 2, 3 * 8 + 3]);
    }

    #[test]
    fn rotated_fill_respects_holes() {
        let mut fb = FrameBuffer::new(20, 20);
        // Left half opaque, right half a hole.
        fill_rotated(&mut fb, Point::new(10.0, 10.0), 5.0, 0.0, |lx, _| (lx < 0.0).then_some((0x00FF_FFFF, 1.0)));
        assert_eq!(fb.pixels[10 * 20 + 7], 0x00FF_FFFF);
        assert_eq!(fb.pixels[10 * 20 + 12], 0);
    }

    #[test]
    fn quarter_turn_moves_the_opaque_half() {
        let mut fb = FrameBuffer::new(20, 20);
        fill_rotated(&mut fb, Point::new(10.0, 10.0), 5.0, std::f32::consts::FRAC_PI_2, |lx, _| {
            (lx < 0.0).then_some((0x00FF_FFFF, 1.0))
        });
        // Local -x now points up the screen.
        assert_eq!(fb.pixels[7 * 20 + 10], 0x00FF_FFFF);
        assert_eq!(fb.pixels[12 * 20 + 10], 0);
    }

    #[test]
    fn every_letter_has_a_glyph() {
        for ch in ('A'..='Z').chain('a'..='z').chain('0'..='9') {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch}");
        }
        assert_eq!(text_width_5x7("FPS"), 18);
    }
}

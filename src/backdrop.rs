// Backgrounds behind the aquarium: user pictures and a few built-in scenes.
// Visual: the whole canvas is painted with the selected backdrop, stretched to
// the window. Pressing B cycles through them.
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::Error;
use crate::particles::hsl_to_rgb;
use crate::types::pack_rgb;

#[derive(Debug, Clone)]
pub enum Backdrop {
    /// A picture loaded from disk.
    Picture { name: String, image: Arc<RgbaImage> },
    /// Light-to-deep blue gradient.
    Sea,
    /// Seven soft horizontal stripes.
    Rainbow,
    /// Pale sky over green hills.
    Forest,
    /// Dark night with scattered stars.
    Space,
}

impl Backdrop {
    pub const BUILT_IN: [Backdrop; 4] = [Backdrop::Sea, Backdrop::Rainbow, Backdrop::Forest, Backdrop::Space];

    pub fn load(path: &Path) -> Result<Self, Error> {
        let image = image::open(path)
            .map_err(|source| Error::Decode { path: path.to_path_buf(), source })?
            .to_rgba8();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "picture".to_string());
        info!(%name, width = image.width(), height = image.height(), "background loaded");
        Ok(Backdrop::Picture { name, image: Arc::new(image) })
    }

    pub fn label(&self) -> &str {
        match self {
            Backdrop::Picture { name, .. } => name,
            Backdrop::Sea => "sea",
            Backdrop::Rainbow => "rainbow",
            Backdrop::Forest => "forest",
            Backdrop::Space => "space",
        }
    }

    /// Paint the backdrop at exactly `width`×`height` (0x00RRGGBB).
    pub fn render(&self, width: usize, height: usize) -> Vec<u32> {
        let mut out = vec![0u32; width * height];
        if width == 0 || height == 0 {
            return out;
        }
        match self {
            Backdrop::Picture { image, .. } => {
                let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else { return out };
                let scaled = imageops::resize(image.as_ref(), w, h, FilterType::Triangle);
                for (dst, px) in out.iter_mut().zip(scaled.pixels()) {
                    let [r, g, b, _] = px.0;
                    *dst = pack_rgb(r, g, b);
                }
            }
            Backdrop::Sea => fill_rows(&mut out, width, height, |t| lerp_rgb(0x00B3_E5FC, 0x0001_579B, t)),
            Backdrop::Rainbow => fill_rows(&mut out, width, height, |t| {
                let band = ((t * 7.0) as u32).min(6);
                hsl_to_rgb(band as f32 * 360.0 / 7.0, 0.75, 0.82)
            }),
            Backdrop::Forest => fill_rows(&mut out, width, height, |t| {
                if t < 0.55 {
                    lerp_rgb(0x00E1_F5FE, 0x00C8_E6C9, t / 0.55)
                } else {
                    lerp_rgb(0x0081_C784, 0x001B_5E20, (t - 0.55) / 0.45)
                }
            }),
            Backdrop::Space => {
                fill_rows(&mut out, width, height, |t| lerp_rgb(0x000D_0B26, 0x0023_1942, t));
                // Fixed seed: the sky looks the same every time it is shown.
                let mut rng = StdRng::seed_from_u64(0x5EED_57A2);
                for _ in 0..(width * height / 900).max(1) {
                    let x = rng.random_range(0..width);
                    let y = rng.random_range(0..height);
                    let level: u8 = rng.random_range(140..=255);
                    out[y * width + x] = pack_rgb(level, level, level);
                }
            }
        }
        out
    }
}

fn fill_rows(out: &mut [u32], width: usize, height: usize, color_at: impl Fn(f32) -> u32) {
    for (y, row) in out.chunks_exact_mut(width).enumerate() {
        let t = if height > 1 { y as f32 / (height - 1) as f32 } else { 0.0 };
        row.fill(color_at(t));
    }
}

fn lerp_rgb(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        (ca + (cb - ca) * t).round() as u32
    };
    (ch(16) << 16) | (ch(8) << 8) | ch(0)
}

/// The background list and the selected entry, plus the canvas-sized render of it.
pub struct Backdrops {
    list: Vec<Backdrop>,
    selected: usize,
    cache: Option<CachedBackdrop>,
}

struct CachedBackdrop {
    selected: usize,
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Backdrops {
    /// User pictures first, then the built-in scenes.
    pub fn new(pictures: Vec<Backdrop>) -> Self {
        let mut list = pictures;
        list.extend(Backdrop::BUILT_IN);
        Self { list, selected: 0, cache: None }
    }

    pub fn current(&self) -> &Backdrop {
        &self.list[self.selected]
    }

    /// Advance to the next backdrop, wrapping around.
    pub fn next(&mut self) -> &Backdrop {
        self.selected = (self.selected + 1) % self.list.len();
        info!(background = self.current().label(), "background switched");
        self.current()
    }

    /// The current backdrop at canvas size; re-rendered only when the
    /// selection or the canvas size changed since the last call.
    pub fn pixels(&mut self, width: usize, height: usize) -> &[u32] {
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|c| c.selected == self.selected && c.width == width && c.height == height);
        if !fresh {
            let pixels = self.list[self.selected].render(width, height);
            self.cache = Some(CachedBackdrop { selected: self.selected, width, height, pixels });
        }
        match &self.cache {
            Some(c) => &c.pixels,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn built_ins_fill_the_canvas() {
        for b in Backdrop::BUILT_IN {
            let px = b.render(32, 24);
            assert_eq!(px.len(), 32 * 24);
            assert!(px.iter().all(|p| p >> 24 == 0));
        }
        assert!(Backdrop::Sea.render(0, 10).is_empty());
    }

    #[test]
    fn sea_gets_darker_towards_the_bottom() {
        let px = Backdrop::Sea.render(4, 100);
        assert_eq!(px[0], 0x00B3_E5FC);
        assert_eq!(px[99 * 4], 0x0001_579B);
    }

    #[test]
    fn picture_is_stretched_to_canvas() {
        let image = Arc::new(RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255])));
        let b = Backdrop::Picture { name: "flat".into(), image };
        let px = b.render(17, 9);
        assert_eq!(px.len(), 17 * 9);
        assert!(px.iter().all(|&p| p == 0x000A_141E));
    }

    #[test]
    fn selection_cycles_and_cache_follows() {
        let mut list = Backdrops::new(Vec::new());
        assert_eq!(list.current().label(), "sea");
        let sea_top = list.pixels(8, 8)[0];
        list.next();
        assert_eq!(list.current().label(), "rainbow");
        assert_ne!(list.pixels(8, 8)[0], sea_top);
        assert_eq!(list.pixels(4, 4).len(), 16);
        for _ in 0..3 {
            list.next();
        }
        assert_eq!(list.current().label(), "sea");
    }
}

// Background removal for uploaded drawings.
// Visual expectation: the paper around a drawing (white, light grey, glare) turns
// transparent, while coloured strokes and dark outlines stay exactly as drawn.
use image::{Rgba, RgbaImage};

/// Which generation of the cutout rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentPreset {
    /// Aggressive near-white removal; dark outlines are preserved.
    #[default]
    Canonical,
    /// First-generation rules: strict white, drops near-black and dull greys.
    Classic,
}

/// Thresholds of the background predicate. Rules run in order; first match wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRules {
    /// Every channel strictly above this counts as near-white.
    pub white_channel_min: u8,
    /// Euclidean RGB distance to pure white below this counts as near-white.
    pub white_distance_max: Option<f32>,
    /// Every channel strictly below this counts as background (outline removal).
    pub black_channel_max: Option<u8>,
    pub saturation_max: f32,
    pub value_threshold: f32,
    /// `true`: low saturation AND value above the threshold (highlights/glare).
    /// `false`: low saturation AND value below it (dull greys).
    pub bright_only: bool,
}

impl SegmentRules {
    pub fn for_preset(preset: SegmentPreset) -> Self {
        match preset {
            SegmentPreset::Canonical => Self {
                white_channel_min: 160,
                white_distance_max: Some(110.0),
                black_channel_max: None,
                saturation_max: 0.08,
                value_threshold: 0.85,
                bright_only: true,
            },
            SegmentPreset::Classic => Self {
                white_channel_min: 220,
                white_distance_max: None,
                black_channel_max: Some(40),
                saturation_max: 0.18,
                value_threshold: 0.85,
                bright_only: false,
            },
        }
    }

    fn is_near_white(&self, r: u8, g: u8, b: u8) -> bool {
        let m = self.white_channel_min;
        if r > m && g > m && b > m {
            return true;
        }
        self.white_distance_max.is_some_and(|max| {
            let (dr, dg, db) = (255.0 - r as f32, 255.0 - g as f32, 255.0 - b as f32);
            (dr * dr + dg * dg + db * db).sqrt() < max
        })
    }

    /// True when the pixel belongs to the background and must become transparent.
    pub fn is_background(&self, r: u8, g: u8, b: u8) -> bool {
        if self.is_near_white(r, g, b) {
            return true;
        }
        if let Some(max) = self.black_channel_max {
            if r < max && g < max && b < max {
                return true;
            }
        }
        let (s, v) = saturation_value(r, g, b);
        if s >= self.saturation_max {
            return false;
        }
        if self.bright_only { v > self.value_threshold } else { v < self.value_threshold }
    }
}

/// HSV saturation and value in [0,1]; hue is never needed.
#[inline]
pub fn saturation_value(r: u8, g: u8, b: u8) -> (f32, f32) {
    let max = r.max(g).max(b) as f32 / 255.0;
    let min = r.min(g).min(b) as f32 / 255.0;
    let s = if max == 0.0 { 0.0 } else { (max - min) / max };
    (s, max)
}

/// Clear alpha on every background pixel, in place. Other pixels are untouched.
/// Returns how many pixels were cleared (already-transparent ones are skipped).
pub fn segment_in_place(img: &mut RgbaImage, rules: &SegmentRules) -> usize {
    let mut cleared = 0;
    for px in img.pixels_mut() {
        let Rgba([r, g, b, a]) = *px;
        if a == 0 {
            continue;
        }
        if rules.is_background(r, g, b) {
            px.0[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

/// Pure form: same-size copy with the background made transparent.
#[cfg(test)]
pub fn segment(img: &RgbaImage, rules: &SegmentRules) -> RgbaImage {
    let mut out = img.clone();
    segment_in_place(&mut out, rules);
    out
}

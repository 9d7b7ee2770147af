// Gamma-correct alpha blending with table lookups instead of powf.
// Visual: soft sprite edges and translucent panels blend without dark halos.
use std::sync::OnceLock;

use crate::types::{pack_rgb, unpack_rgb};

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

static SHARED: OnceLock<GammaLut> = OnceLock::new();

impl GammaLut {
    /// Build both tables.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = (i as f32) / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    /// Process-wide tables, built on first use.
    pub fn shared() -> &'static GammaLut {
        SHARED.get_or_init(GammaLut::new)
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Mix `src` over `dst` (both 0x00RRGGBB) in linear light; `alpha` in [0,1].
    #[inline]
    pub fn blend(&self, dst: u32, src: u32, alpha: f32) -> u32 {
        if alpha <= 0.0 {
            return dst;
        }
        if alpha >= 1.0 {
            return src & 0x00FF_FFFF;
        }
        let (dr, dg, db) = unpack_rgb(dst);
        let (sr, sg, sb) = unpack_rgb(src);
        let mix = |d: u8, s: u8| {
            let d = self.srgb_u8_to_linear(d);
            let s = self.srgb_u8_to_linear(s);
            self.linear_to_srgb_u8(d + (s - d) * alpha)
        };
        pack_rgb(mix(dr, sr), mix(dg, sg), mix(db, sb))
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_round_trip() {
        let lut = GammaLut::shared();
        for v in [0u8, 1, 64, 128, 200, 255] {
            assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(v)), v);
        }
    }

    #[test]
    fn blend_extremes_and_midpoint() {
        let lut = GammaLut::shared();
        assert_eq!(lut.blend(0x0000_0000, 0x00FF_FFFF, 0.0), 0);
        assert_eq!(lut.blend(0x0000_0000, 0xAAFF_FFFF, 1.0), 0x00FF_FFFF);
        // Half of white in linear light is brighter than 128 in sRGB.
        let (r, g, b) = unpack_rgb(lut.blend(0x0000_0000, 0x00FF_FFFF, 0.5));
        assert_eq!((r, g, b), (188, 188, 188));
    }
}

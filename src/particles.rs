// Ambient effects behind the sprites: bubbles, sparkles, confetti, snow, glyph rain.
// Visual outcomes:
// - Bubbles rise from below the window and slowly fade.
// - Sparkles twinkle in place, drifting a little.
// - Confetti, snow and glyph rain fall from the top and loop forever.
// Particles are never destroyed: when one leaves the window (or fades out)
// it is respawned at its edge, so the count stays constant.
use std::f32::consts::TAU;
use std::str::FromStr;

use rand::Rng;

use crate::sprite::uniform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Bubbles,
    Sparkles,
    Confetti,
    Snow,
    GlyphRain,
}

impl Effect {
    pub const ALL: [Effect; 5] = [Effect::Bubbles, Effect::Sparkles, Effect::Confetti, Effect::Snow, Effect::GlyphRain];

    pub fn label(self) -> &'static str {
        match self {
            Effect::Bubbles => "bubbles",
            Effect::Sparkles => "sparkles",
            Effect::Confetti => "confetti",
            Effect::Snow => "snow",
            Effect::GlyphRain => "rain",
        }
    }

    /// Fixed pool size per effect.
    pub fn pool_size(self) -> usize {
        match self {
            Effect::Bubbles => 18,
            Effect::Sparkles => 32,
            Effect::Confetti => 36,
            Effect::Snow => 28,
            Effect::GlyphRain => 24,
        }
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Effect::ALL
            .into_iter()
            .find(|e| e.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown effect `{s}` (expected one of: bubbles, sparkles, confetti, snow, rain)"))
    }
}

/// One ambient particle. Fields unused by an effect stay at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Radius for round particles, edge length for confetti and glyphs.
    pub size: f32,
    pub alpha: f32,
    pub angle: f32,
    pub spin: f32,
    /// Twinkle phase for sparkles.
    pub phase: f32,
    /// Confetti colour, 0x00RRGGBB.
    pub color: u32,
}

impl Particle {
    fn blank() -> Self {
        Self { x: 0.0, y: 0.0, vx: 0.0, vy: 0.0, size: 0.0, alpha: 1.0, angle: 0.0, spin: 0.0, phase: 0.0, color: 0 }
    }
}

/// The active effect and its particle pool.
#[derive(Default)]
pub struct ParticleField {
    effect: Option<Effect>,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Switch effects; the pool is emptied and reseeded on the next advance.
    pub fn set_effect(&mut self, effect: Option<Effect>) {
        self.effect = effect;
        self.particles.clear();
    }

    /// Step every particle once, seeding the pool first if it is empty.
    pub fn advance<R: Rng>(&mut self, width: f32, height: f32, rng: &mut R) {
        let Some(effect) = self.effect else { return };
        if self.particles.is_empty() {
            self.particles = (0..effect.pool_size()).map(|_| seed(effect, width, height, rng)).collect();
        }
        for p in &mut self.particles {
            if !advance_one(effect, p, width, height) {
                respawn(effect, p, width, height, rng);
            }
        }
    }
}

fn seed<R: Rng>(effect: Effect, w: f32, h: f32, rng: &mut R) -> Particle {
    let mut p = Particle::blank();
    match effect {
        Effect::Bubbles => {
            p.x = uniform(rng, 0.0, w);
            p.y = h + uniform(rng, 0.0, 100.0);
            p.size = uniform(rng, 12.0, 28.0);
            p.vy = -uniform(rng, 1.2, 2.4);
            p.alpha = uniform(rng, 0.5, 1.0);
        }
        Effect::Sparkles => {
            p.x = uniform(rng, 0.0, w);
            p.y = uniform(rng, 0.0, h);
            p.size = uniform(rng, 6.0, 14.0);
            p.vx = uniform(rng, -0.2, 0.2);
            p.vy = uniform(rng, -0.2, 0.2);
            p.alpha = uniform(rng, 0.7, 1.0);
            p.phase = uniform(rng, 0.0, TAU);
        }
        Effect::Confetti => {
            p.x = uniform(rng, 0.0, w);
            p.y = -uniform(rng, 0.0, 100.0);
            p.vy = uniform(rng, 1.5, 3.0);
            p.vx = uniform(rng, -1.0, 1.0);
            p.color = hsl_to_rgb(uniform(rng, 0.0, 360.0), 0.9, 0.6);
            p.size = uniform(rng, 8.0, 16.0);
            p.angle = uniform(rng, 0.0, TAU);
            p.spin = uniform(rng, -0.1, 0.1);
        }
        Effect::Snow => {
            p.x = uniform(rng, 0.0, w);
            p.y = -uniform(rng, 0.0, 100.0);
            p.vy = uniform(rng, 0.6, 1.3);
            p.vx = uniform(rng, -0.3, 0.3);
            p.size = uniform(rng, 7.0, 14.0);
            p.alpha = uniform(rng, 0.7, 1.0);
        }
        Effect::GlyphRain => {
            p.x = uniform(rng, 0.0, w);
            p.y = -uniform(rng, 0.0, h);
            p.vy = uniform(rng, 2.2, 4.4);
            p.size = uniform(rng, 32.0, 56.0);
            p.angle = uniform(rng, 0.0, TAU);
            p.spin = uniform(rng, -0.02, 0.02);
            p.alpha = uniform(rng, 0.92, 1.0);
        }
    }
    p
}

/// Move one particle; false once it has left the window or faded out.
fn advance_one(effect: Effect, p: &mut Particle, w: f32, h: f32) -> bool {
    match effect {
        Effect::Bubbles => {
            p.y += p.vy;
            p.alpha -= 0.0015;
            p.y + p.size >= 0.0 && p.alpha > 0.0
        }
        Effect::Sparkles => {
            p.x += p.vx;
            p.y += p.vy;
            p.phase += 0.2;
            (0.0..=w).contains(&p.x) && (0.0..=h).contains(&p.y)
        }
        Effect::Confetti => {
            p.x += p.vx;
            p.y += p.vy;
            p.angle += p.spin;
            p.y - p.size <= h
        }
        Effect::Snow => {
            p.x += p.vx;
            p.y += p.vy;
            p.y - p.size <= h
        }
        Effect::GlyphRain => {
            p.y += p.vy;
            p.angle += p.spin;
            p.y <= h + 40.0
        }
    }
}

/// Put a particle back at its spawn edge with fresh randomness.
fn respawn<R: Rng>(effect: Effect, p: &mut Particle, w: f32, h: f32, rng: &mut R) {
    match effect {
        Effect::Sparkles => {
            // Sparkles keep their size, speed and brightness; only place and phase change.
            p.x = uniform(rng, 0.0, w);
            p.y = uniform(rng, 0.0, h);
            p.phase = uniform(rng, 0.0, TAU);
        }
        Effect::Snow => {
            p.x = uniform(rng, 0.0, w);
            p.y = -uniform(rng, 0.0, 100.0);
            p.vy = uniform(rng, 0.6, 1.3);
            p.vx = uniform(rng, -0.3, 0.3);
        }
        Effect::GlyphRain => {
            *p = seed(effect, w, h, rng);
            p.y = -uniform(rng, 0.0, 60.0);
        }
        Effect::Bubbles | Effect::Confetti => *p = seed(effect, w, h, rng),
    }
}

/// Hue in degrees, saturation and lightness in [0,1] → 0x00RRGGBB.
pub fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> u32 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (hue.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u32;
    (to8(r1) << 16) | (to8(g1) << 8) | to8(b1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pool_size_is_constant_over_time() {
        let mut rng = StdRng::seed_from_u64(21);
        for effect in Effect::ALL {
            let mut field = ParticleField::new();
            field.set_effect(Some(effect));
            for _ in 0..3000 {
                field.advance(640.0, 480.0, &mut rng);
                assert_eq!(field.particles().len(), effect.pool_size());
            }
        }
    }

    #[test]
    fn falling_particles_stay_near_the_window() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut field = ParticleField::new();
        field.set_effect(Some(Effect::Snow));
        for _ in 0..5000 {
            field.advance(640.0, 480.0, &mut rng);
        }
        for p in field.particles() {
            assert!(p.y - p.size <= 480.0 + 1.3);
        }
    }

    #[test]
    fn bubbles_recycle_when_faded() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut p = Particle::blank();
        p.y = 200.0;
        p.size = 10.0;
        p.vy = -1.0;
        p.alpha = 0.001;
        assert!(!advance_one(Effect::Bubbles, &mut p, 640.0, 480.0));
        respawn(Effect::Bubbles, &mut p, 640.0, 480.0, &mut rng);
        assert!(p.y >= 480.0 && p.alpha >= 0.5);
    }

    #[test]
    fn switching_effects_clears_the_pool() {
        let mut rng = StdRng::seed_from_u64(24);
        let mut field = ParticleField::new();
        field.set_effect(Some(Effect::Confetti));
        field.advance(640.0, 480.0, &mut rng);
        assert_eq!(field.particles().len(), 36);
        field.set_effect(Some(Effect::Bubbles));
        assert!(field.particles().is_empty());
        field.set_effect(None);
        field.advance(640.0, 480.0, &mut rng);
        assert!(field.particles().is_empty());
    }

    #[test]
    fn effect_names_parse() {
        assert_eq!("Snow".parse::<Effect>(), Ok(Effect::Snow));
        assert_eq!("rain".parse::<Effect>(), Ok(Effect::GlyphRain));
        assert!("fireworks".parse::<Effect>().is_err());
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), 0x00FF_0000);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), 0x0000_FF00);
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), 0x0000_00FF);
    }
}

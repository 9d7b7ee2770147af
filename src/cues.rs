// Sound cue signals. Playback is not wired to an audio device; each cue is
// reported through the log, with bounce cues rate-limited like a single
// re-triggered audio element would be.
use std::collections::HashMap;
use std::time::Duration;

use tracing::info;

use crate::physics::Bounce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A sprite hit a left/right wall.
    Bounce,
    /// A sprite hit a top/bottom wall or a menu.
    Bubble,
    Bin,
    StickerAttach,
    Reset,
}

impl Cue {
    fn rate_limited(self) -> bool {
        matches!(self, Cue::Bounce | Cue::Bubble)
    }
}

pub struct CueBoard {
    cooldown: Duration,
    last: HashMap<Cue, Duration>,
    played: usize,
}

impl CueBoard {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last: HashMap::new(), played: 0 }
    }

    /// Fire a cue at scene time `now`. Returns false if it was swallowed by the cooldown.
    pub fn trigger(&mut self, cue: Cue, now: Duration) -> bool {
        if cue.rate_limited() {
            if let Some(prev) = self.last.get(&cue) {
                if now.saturating_sub(*prev) <= self.cooldown {
                    return false;
                }
            }
        }
        self.last.insert(cue, now);
        self.played += 1;
        info!(?cue, "cue");
        true
    }

    /// Horizontal walls play `Bounce`, vertical walls and menus play `Bubble`.
    pub fn bounce(&mut self, bounce: Bounce, now: Duration) {
        if bounce.horizontal {
            self.trigger(Cue::Bounce, now);
        }
        if bounce.vertical {
            self.trigger(Cue::Bubble, now);
        }
    }

    #[cfg(test)]
    pub fn played(&self) -> usize {
        self.played
    }
}

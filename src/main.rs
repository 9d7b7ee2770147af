// What you SEE:
// • Drawings (photos of kids' artwork on white paper) float around the window
//   as cutouts, tilting, bouncing off the edges and the menus.
// • Click a drawing to duplicate it; drag it to move and fling it; drop it on
//   the bin (bottom-right) to delete it.
// • Drag a sticker from the palette onto a drawing to glue it on.
// • Effects row: bubbles, sparkles, confetti, snow, glyph rain (keys 1-5, 0 = off).
// • B cycles backgrounds, R clears the aquarium, ESC quits.

mod backdrop;
mod config;
mod cues;
mod draw;
mod error;
mod gamma;
mod geom;
mod hit;
mod input;
mod loader;
mod particles;
mod physics;
mod render;
mod roster;
mod scene;
mod segment;
mod sprite;
mod stickers;
mod types;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use minifb::Key;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use backdrop::{Backdrop, Backdrops};
use config::SceneConfig;
use draw::Drawer;
use error::Error;
use geom::Point;
use input::{PointerEvent, PointerKind};
use loader::{Inbox, Uploader};
use particles::Effect;
use render::Hud;
use scene::Scene;
use segment::{SegmentPreset, SegmentRules};
use types::FrameBuffer;

#[derive(Parser, Debug)]
#[command(name = "drawing-aquarium", about = "Scanned drawings swimming in a window")]
struct Cli {
    /// Drawings to add at start, uploaded one after another.
    images: Vec<PathBuf>,

    /// Background picture; repeat to add several. Built-in scenes follow them.
    #[arg(long = "background")]
    backgrounds: Vec<PathBuf>,

    /// Folder watched for new drawings.
    #[arg(long)]
    inbox: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    width: usize,

    #[arg(long, default_value_t = 800)]
    height: usize,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Ambient effect at start: bubbles, sparkles, confetti, snow or rain.
    #[arg(long)]
    effect: Option<Effect>,

    /// Use the stricter first-generation paper filter (also removes black).
    #[arg(long)]
    classic_filter: bool,

    /// Treat the pointer as a touch screen (stricter tap rules).
    #[arg(long)]
    touch: bool,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    /* --- Scene setup ---
       Visual: window opens on the first backdrop, empty aquarium. */
    let mut cfg = SceneConfig::default();
    if cli.classic_filter {
        cfg.segment = SegmentPreset::Classic;
    }
    let rules = SegmentRules::for_preset(cfg.segment);

    let mut pictures = Vec::new();
    for path in &cli.backgrounds {
        match Backdrop::load(path) {
            Ok(b) => pictures.push(b),
            Err(e) => warn!(error = %e, "background skipped"),
        }
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut drawer = Drawer::new("Drawing Aquarium", cli.width, cli.height)?;
    let mut screen = FrameBuffer::new(cli.width, cli.height);
    let mut scene = Scene::new(cfg, cli.width as f32, cli.height as f32, Backdrops::new(pictures), rng);
    scene.set_effect(cli.effect);

    /* --- Upload intake ---
       Visual: command-line drawings pop in one by one as they finish decoding. */
    let mut uploader = Uploader::spawn(rules)?;
    for path in cli.images {
        uploader.enqueue(path);
    }
    let mut inbox = cli.inbox.map(|dir| Inbox::new(dir, Duration::from_secs(1)));

    let pointer_kind = if cli.touch { PointerKind::Touch } else { PointerKind::Mouse };
    let mut pointer_down = false;
    let mut last_pointer: Option<Point> = None;

    /* --- HUD / FPS --- */
    let started = Instant::now();
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud = Hud::default();

    /* ------------------------------ Main loop ------------------------------ */
    'frames: while drawer.is_open() {
        let now = started.elapsed();

        /* 1) Window size: the layout and sprite size follow the window. */
        let (w, h) = drawer.size();
        if (w, h) != (screen.width, screen.height) && w > 0 && h > 0 {
            screen.resize(w, h);
            scene.resize(w as f32, h as f32);
        }

        /* 2) Keys */
        for key in drawer.keys_pressed() {
            match key {
                Key::Escape => break 'frames,
                Key::R => scene.reset(now),
                Key::B => scene.next_backdrop(),
                Key::Key0 => scene.set_effect(None),
                Key::Key1 => scene.set_effect(Some(Effect::Bubbles)),
                Key::Key2 => scene.set_effect(Some(Effect::Sparkles)),
                Key::Key3 => scene.set_effect(Some(Effect::Confetti)),
                Key::Key4 => scene.set_effect(Some(Effect::Snow)),
                Key::Key5 => scene.set_effect(Some(Effect::GlyphRain)),
                _ => {}
            }
        }

        /* 3) Pointer: press, move, release become gesture events. */
        let pos = drawer.mouse_pos();
        let down = drawer.left_mouse_down();
        let event = |p: Point| PointerEvent { pos: p, at: now, kind: pointer_kind };
        match (pointer_down, down, pos) {
            (false, true, Some(p)) => {
                scene.pointer_down(event(p));
                pointer_down = true;
            }
            (true, true, Some(p)) if Some(p) != last_pointer => scene.pointer_move(event(p)),
            (true, false, _) => {
                // Released outside the window: finish where the pointer was last seen.
                if let Some(p) = pos.or(last_pointer) {
                    scene.pointer_up(event(p));
                }
                pointer_down = false;
            }
            _ => {}
        }
        if pos.is_some() {
            last_pointer = pos;
        }

        /* 4) Uploads that finished decoding become sprites. */
        if let Some(inbox) = inbox.as_mut() {
            match inbox.scan_due(now) {
                Ok(found) => found.into_iter().for_each(|p| uploader.enqueue(p)),
                Err(e) => warn!(error = %e, "inbox scan failed"),
            }
        }
        for ready in uploader.poll() {
            let id = scene.on_segmented(ready.image);
            debug!(?id, path = %ready.path.display(), "drawing placed");
        }

        /* 5) Simulate, draw, present. */
        scene.frame(now);
        hud.pending_uploads = uploader.pending();
        render::draw_frame(&mut screen, &mut scene, now, &hud);
        drawer.present(&screen)?;

        /* 6) FPS counter (logged + HUD once per second) */
        frames_this_second += 1;
        let tick = Instant::now();
        if tick.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = tick.duration_since(last_fps_time).as_secs_f32();
            hud.fps = frames_this_second as f32 / secs;
            info!(fps = hud.fps, sprites = scene.store().len(), "frame rate");
            frames_this_second = 0;
            last_fps_time = tick;
        }
    }

    Ok(())
}

// Upload intake: drawings are decoded and segmented off the frame loop.
// A single worker thread takes jobs over a channel; the frame loop polls for
// finished cutouts without blocking. Each submission bumps a generation
// counter and only the newest generation's result is accepted, so a drawing
// that was superseded while still decoding never shows up.
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use image::imageops::FilterType;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::segment::{SegmentRules, segment_in_place};

/// Long side above which drawings are scaled down before segmentation.
pub const MAX_SIDE: u32 = 1024;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// A finished upload, ready to become a sprite.
#[derive(Debug)]
pub struct Segmented {
    pub path: PathBuf,
    pub image: RgbaImage,
}

struct Job {
    generation: u64,
    path: PathBuf,
}

struct Done {
    generation: u64,
    path: PathBuf,
    result: Result<RgbaImage, Error>,
}

/// Decode a drawing, shrink it if needed, and cut its paper background away.
pub fn load_drawing(path: &Path, rules: &SegmentRules) -> Result<RgbaImage, Error> {
    let decoded = image::open(path).map_err(|source| Error::Decode { path: path.to_path_buf(), source })?;
    let decoded = if decoded.width().max(decoded.height()) > MAX_SIDE {
        decoded.resize(MAX_SIDE, MAX_SIDE, FilterType::Triangle)
    } else {
        decoded
    };
    let mut rgba = decoded.to_rgba8();
    let removed = segment_in_place(&mut rgba, rules);
    debug!(path = %path.display(), width = rgba.width(), height = rgba.height(), removed, "drawing segmented");
    Ok(rgba)
}

pub struct Uploader {
    jobs: Sender<Job>,
    done: Receiver<Done>,
    generation: u64,
    /// Generation of the upload currently being decoded, if any.
    in_flight: Option<u64>,
    queue: VecDeque<PathBuf>,
}

impl Uploader {
    /// Start the decoder thread.
    pub fn spawn(rules: SegmentRules) -> Result<Self, Error> {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done) = mpsc::channel::<Done>();
        thread::Builder::new()
            .name("drawing-decoder".into())
            .spawn(move || {
                for job in job_rx {
                    let result = load_drawing(&job.path, &rules);
                    if done_tx.send(Done { generation: job.generation, path: job.path, result }).is_err() {
                        break;
                    }
                }
            })
            .map_err(Error::Spawn)?;
        Ok(Self { jobs, done, generation: 0, in_flight: None, queue: VecDeque::new() })
    }

    /// Start decoding `path` right away. Anything still decoding is superseded.
    pub fn submit(&mut self, path: PathBuf) {
        self.generation += 1;
        if let Some(stale) = self.in_flight.replace(self.generation) {
            debug!(stale, "pending upload superseded");
        }
        info!(path = %path.display(), generation = self.generation, "upload submitted");
        if self.jobs.send(Job { generation: self.generation, path }).is_err() {
            warn!("decoder thread is gone; upload dropped");
            self.in_flight = None;
        }
    }

    /// Line `path` up behind the current upload.
    pub fn enqueue(&mut self, path: PathBuf) {
        debug!(path = %path.display(), "upload queued");
        self.queue.push_back(path);
    }

    /// Collect finished uploads and start the next queued one once idle.
    pub fn poll(&mut self) -> Vec<Segmented> {
        let mut ready = Vec::new();
        loop {
            match self.done.try_recv() {
                Ok(done) => {
                    if self.in_flight != Some(done.generation) {
                        debug!(generation = done.generation, path = %done.path.display(), "stale upload discarded");
                        continue;
                    }
                    self.in_flight = None;
                    match done.result {
                        Ok(image) => {
                            info!(path = %done.path.display(), "upload ready");
                            ready.push(Segmented { path: done.path, image });
                        }
                        Err(e) => warn!(error = %e, "upload failed"),
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.in_flight.take().is_some() {
                        warn!("decoder thread stopped mid-upload");
                    }
                    break;
                }
            }
        }
        if self.in_flight.is_none() {
            if let Some(next) = self.queue.pop_front() {
                self.submit(next);
            }
        }
        ready
    }

    /// Uploads not yet turned into sprites (queued plus in flight).
    pub fn pending(&self) -> usize {
        self.queue.len() + usize::from(self.in_flight.is_some())
    }
}

/// A folder watched for new drawings, rescanned at a fixed interval.
/// A file is reported once its size is unchanged between two scans, so a
/// drawing still being copied in is not decoded half-written.
pub struct Inbox {
    dir: PathBuf,
    interval: Duration,
    last_scan: Option<Duration>,
    seen: HashSet<PathBuf>,
    /// Unreported files and their size at the last scan.
    settling: HashMap<PathBuf, u64>,
}

impl Inbox {
    pub fn new(dir: PathBuf, interval: Duration) -> Self {
        Self { dir, interval, last_scan: None, seen: HashSet::new(), settling: HashMap::new() }
    }

    /// Newly settled image files, in name order. Empty until the interval
    /// has elapsed.
    pub fn scan_due(&mut self, now: Duration) -> Result<Vec<PathBuf>, Error> {
        if self.last_scan.is_some_and(|last| now.saturating_sub(last) < self.interval) {
            return Ok(Vec::new());
        }
        self.last_scan = Some(now);
        self.scan()
    }

    fn scan(&mut self) -> Result<Vec<PathBuf>, Error> {
        let io = |source| Error::Io { path: self.dir.clone(), source };
        let mut listed = HashMap::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io)? {
            let entry = entry.map_err(io)?;
            let path = entry.path();
            if is_image(&path) && !self.seen.contains(&path) {
                listed.insert(path, entry.metadata().map_err(io)?.len());
            }
        }
        let mut found: Vec<PathBuf> = listed
            .iter()
            .filter(|&(path, &len)| len > 0 && self.settling.get(path) == Some(&len))
            .map(|(path, _)| path.clone())
            .collect();
        found.sort();
        for path in &found {
            listed.remove(path);
        }
        // Files that disappeared before settling are forgotten.
        self.settling = listed;
        self.seen.extend(found.iter().cloned());
        if !found.is_empty() {
            info!(dir = %self.dir.display(), count = found.len(), "new drawings in inbox");
        }
        Ok(found)
    }
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentPreset;
    use image::Rgba;
    use std::time::Instant;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("drawing-aquarium-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    /// White paper with a red square in the middle.
    fn write_drawing(path: &Path, w: u32, h: u32) {
        let mut img = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
        for y in h / 4..3 * h / 4 {
            for x in w / 4..3 * w / 4 {
                img.put_pixel(x, y, Rgba([220, 20, 20, 255]));
            }
        }
        img.save(path).expect("write png");
    }

    fn rules() -> SegmentRules {
        SegmentRules::for_preset(SegmentPreset::Canonical)
    }

    fn wait_for(up: &mut Uploader) -> Vec<Segmented> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let ready = up.poll();
            if !ready.is_empty() || Instant::now() > deadline {
                return ready;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn drawing_is_segmented_and_downscaled() {
        let dir = scratch_dir("downscale");
        let path = dir.join("big.png");
        write_drawing(&path, 2048, 512);
        let img = load_drawing(&path, &rules()).expect("load");
        assert_eq!((img.width(), img.height()), (1024, 256));
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(512, 128).0[3], 255);
    }

    #[test]
    fn broken_file_is_a_decode_error() {
        let dir = scratch_dir("broken");
        let path = dir.join("broken.png");
        std::fs::write(&path, b"not a png").expect("write");
        assert!(matches!(load_drawing(&path, &rules()), Err(Error::Decode { .. })));
    }

    #[test]
    fn superseded_upload_is_discarded() {
        let dir = scratch_dir("stale");
        let (a, b) = (dir.join("a.png"), dir.join("b.png"));
        write_drawing(&a, 64, 64);
        write_drawing(&b, 32, 32);
        let mut up = Uploader::spawn(rules()).expect("spawn");
        up.submit(a);
        up.submit(b.clone());
        let ready = wait_for(&mut up);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].path, b);
        assert_eq!(up.pending(), 0);
    }

    #[test]
    fn queue_runs_one_at_a_time_in_order() {
        let dir = scratch_dir("queue");
        let paths: Vec<_> = (0..3).map(|i| dir.join(format!("{i}.png"))).collect();
        for p in &paths {
            write_drawing(p, 16, 16);
        }
        let mut up = Uploader::spawn(rules()).expect("spawn");
        for p in &paths {
            up.enqueue(p.clone());
        }
        assert_eq!(up.pending(), 3);
        let mut got = Vec::new();
        while got.len() < 3 {
            let ready = wait_for(&mut up);
            assert!(!ready.is_empty(), "upload timed out");
            got.extend(ready.into_iter().map(|s| s.path));
        }
        assert_eq!(got, paths);
    }

    #[test]
    fn failed_upload_does_not_block_the_queue() {
        let dir = scratch_dir("failed");
        let good = dir.join("good.png");
        write_drawing(&good, 16, 16);
        let mut up = Uploader::spawn(rules()).expect("spawn");
        up.enqueue(dir.join("missing.png"));
        up.enqueue(good.clone());
        let ready = wait_for(&mut up);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].path, good);
    }

    #[test]
    fn inbox_reports_each_file_once() {
        let dir = scratch_dir("inbox");
        write_drawing(&dir.join("one.png"), 8, 8);
        std::fs::write(dir.join("notes.txt"), b"hi").expect("write");
        let mut inbox = Inbox::new(dir.clone(), Duration::from_secs(1));
        assert!(inbox.scan_due(Duration::ZERO).expect("scan").is_empty());
        assert_eq!(inbox.scan_due(Duration::from_millis(1000)).expect("scan"), vec![dir.join("one.png")]);

        let staged = std::env::temp_dir().join(format!("drawing-aquarium-{}-two.png", std::process::id()));
        write_drawing(&staged, 8, 8);
        std::fs::rename(&staged, dir.join("two.PNG")).expect("move into inbox");
        assert!(inbox.scan_due(Duration::from_millis(1500)).expect("scan").is_empty());
        assert!(inbox.scan_due(Duration::from_millis(2000)).expect("scan").is_empty());
        assert_eq!(inbox.scan_due(Duration::from_millis(3000)).expect("scan"), vec![dir.join("two.PNG")]);
        assert!(inbox.scan_due(Duration::from_millis(4000)).expect("scan").is_empty());
    }

    #[test]
    fn inbox_waits_for_a_growing_file() {
        let dir = scratch_dir("growing");
        let path = dir.join("copying.png");
        let mut inbox = Inbox::new(dir.clone(), Duration::from_secs(1));
        std::fs::write(&path, b"").expect("write");
        assert!(inbox.scan_due(Duration::ZERO).expect("scan").is_empty());
        std::fs::write(&path, b"\x89PNG").expect("write");
        assert!(inbox.scan_due(Duration::from_millis(1000)).expect("scan").is_empty());
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").expect("write");
        assert!(inbox.scan_due(Duration::from_millis(2000)).expect("scan").is_empty());
        assert_eq!(inbox.scan_due(Duration::from_millis(3000)).expect("scan"), vec![path.clone()]);
        assert!(inbox.scan_due(Duration::from_millis(4000)).expect("scan").is_empty());
    }

    #[test]
    fn missing_inbox_is_an_io_error() {
        let mut inbox = Inbox::new(PathBuf::from("/definitely/not/here"), Duration::from_secs(1));
        assert!(matches!(inbox.scan_due(Duration::ZERO), Err(Error::Io { .. })));
    }
}

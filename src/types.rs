// Core pixel types shared by the renderer, the segmentation filter and the sprite store.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the canvas is on screen (pixels)
    pub height: usize,     // how tall the canvas is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Resize in place; contents are undefined afterwards (the renderer clears every frame).
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width * height, 0);
    }
}

/// A sprite texture scaled to its on-screen size.
/// Each entry is 0xAARRGGBB; alpha 0 means "background removed here".
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Texture {
    /// Nearest-neighbour sample at texture coordinates; `None` outside the texture.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Option<u32> {
        if u < 0.0 || v < 0.0 {
            return None;
        }
        let (x, y) = (u as usize, v as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

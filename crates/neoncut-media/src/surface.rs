// crates/neoncut-media/src/surface.rs
//
// Plain RGBA8 pixel buffer, row-major, no stride padding, straight alpha.
// The compositor draws into one; sources and the text rasterizer hand them
// out; the recorder consumes them.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width:  u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![0; width as usize * height as usize * 4] }
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut s = Self::new(width, height);
        s.fill(rgba);
        s
    }

    /// Wrap an existing RGBA buffer. `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4)
            .then_some(Self { width, height, pixels })
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * 4
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Bilinear sample at continuous coordinates (pixel centres at +0.5),
    /// as straight RGBA in 0..=1. Outside the surface is transparent, and
    /// edge texels fade out over half a pixel so rotated edges stay smooth.
    pub fn sample(&self, fx: f32, fy: f32) -> [f32; 4] {
        if self.is_empty() {
            return [0.0; 4];
        }
        let x = fx - 0.5;
        let y = fy - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let mut acc = [0.0_f32; 4];
        let mut wsum = 0.0_f32;
        for (dx, dy, w) in [
            (0, 0, (1.0 - tx) * (1.0 - ty)),
            (1, 0, tx * (1.0 - ty)),
            (0, 1, (1.0 - tx) * ty),
            (1, 1, tx * ty),
        ] {
            let (sx, sy) = (x0 + dx, y0 + dy);
            if w <= 0.0 || sx < 0 || sy < 0 || sx >= self.width as i64 || sy >= self.height as i64 {
                continue;
            }
            let p = self.pixel(sx as u32, sy as u32);
            let a = p[3] as f32 / 255.0;
            // Premultiply while filtering so transparent texels don't bleed color.
            acc[0] += p[0] as f32 / 255.0 * a * w;
            acc[1] += p[1] as f32 / 255.0 * a * w;
            acc[2] += p[2] as f32 / 255.0 * a * w;
            acc[3] += a * w;
            wsum += w;
        }
        if wsum <= 0.0 || acc[3] <= 0.0 {
            return [0.0; 4];
        }
        [acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3]]
    }

    /// Drop alpha: packed RGB8, what the recorder writes.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect()
    }
}

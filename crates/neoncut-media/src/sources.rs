// crates/neoncut-media/src/sources.rs
//
// Where the compositor gets pixels from. Decoding lives with the host (the
// import flow hands over decoded stills or frame sequences); this module
// only indexes them by `SourceRef`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use fontdue::{Font, FontSettings};
use neoncut_core::state::{SourceRef, TextStyle};
use tracing::{debug, warn};

use crate::surface::Surface;

/// Frame lookup by source handle and source-media time.
pub trait FrameSource {
    fn frame(&self, source: &SourceRef, at: f64) -> Option<&Surface>;
}

/// Turns a text clip into an RGBA surface. `None` means "draw nothing".
pub trait TextRasterizer {
    fn rasterize(&self, text: &str, style: &TextStyle) -> Option<Surface>;
}

// ── Stills ───────────────────────────────────────────────────────────────────

/// Decoded images. `at` is ignored.
#[derive(Default)]
pub struct ImageLibrary {
    images: HashMap<SourceRef, Surface>,
}

impl ImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: SourceRef, surface: Surface) {
        self.images.insert(source, surface);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Decode a PNG file and register it under `source`.
    pub fn load_png(&mut self, source: SourceRef, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image {}", path.display()))?;
        let surface = decode_png(&bytes)
            .with_context(|| format!("decode image {}", path.display()))?;
        debug!(source = source.as_str(), w = surface.width, h = surface.height, "image loaded");
        self.insert(source, surface);
        Ok(())
    }
}

impl FrameSource for ImageLibrary {
    fn frame(&self, source: &SourceRef, _at: f64) -> Option<&Surface> {
        self.images.get(source)
    }
}

/// Decode PNG bytes of any 8/16-bit color type into straight RGBA8.
pub fn decode_png(bytes: &[u8]) -> Result<Surface> {
    let mut decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().context("read PNG header")?;
    let size = reader.output_buffer_size().context("PNG too large to buffer")?;
    let mut buf = vec![0u8; size];
    let info = reader.next_frame(&mut buf).context("decode PNG frame")?;
    let data = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba           => data.to_vec(),
        png::ColorType::Rgb            => data.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
        png::ColorType::GrayscaleAlpha => data.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect(),
        png::ColorType::Grayscale      => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        other => bail!("unsupported PNG color type {other:?}"),
    };
    Surface::from_rgba(info.width, info.height, rgba)
        .context("PNG pixel buffer does not match its dimensions")
}

// ── Video frames ─────────────────────────────────────────────────────────────

struct Sequence {
    fps:    f64,
    frames: Vec<Surface>,
}

/// Pre-decoded video frames at a fixed rate per source.
#[derive(Default)]
pub struct FrameSequences {
    sequences: HashMap<SourceRef, Sequence>,
}

impl FrameSequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `frames` sampled at `fps`. Empty sequences and non-positive
    /// rates are refused.
    pub fn insert(&mut self, source: SourceRef, fps: f64, frames: Vec<Surface>) -> bool {
        if frames.is_empty() || !(fps > 0.0) {
            warn!(source = source.as_str(), fps, "frame sequence rejected");
            return false;
        }
        self.sequences.insert(source, Sequence { fps, frames });
        true
    }
}

impl FrameSource for FrameSequences {
    fn frame(&self, source: &SourceRef, at: f64) -> Option<&Surface> {
        let seq = self.sequences.get(source)?;
        let idx = (at.max(0.0) * seq.fps).floor() as usize;
        seq.frames.get(idx.min(seq.frames.len() - 1))
    }
}

/// Chain two sources; the first one that knows the handle wins.
impl<A: FrameSource, B: FrameSource> FrameSource for (A, B) {
    fn frame(&self, source: &SourceRef, at: f64) -> Option<&Surface> {
        self.0.frame(source, at).or_else(|| self.1.frame(source, at))
    }
}

// ── Text ─────────────────────────────────────────────────────────────────────

/// Skips text clips entirely.
pub struct NoText;

impl TextRasterizer for NoText {
    fn rasterize(&self, _text: &str, _style: &TextStyle) -> Option<Surface> {
        None
    }
}

/// Single-line text via fontdue. One default face, plus optional faces keyed
/// by family name.
pub struct FontdueRasterizer {
    default:  Font,
    families: HashMap<String, Font>,
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self { default: parse_font(bytes)?, families: HashMap::new() })
    }

    pub fn with_family(mut self, family: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let family = family.into();
        let font = parse_font(bytes).with_context(|| format!("font family {family}"))?;
        self.families.insert(family.to_ascii_lowercase(), font);
        Ok(self)
    }

    fn font_for(&self, family: &str) -> &Font {
        self.families.get(&family.to_ascii_lowercase()).unwrap_or(&self.default)
    }
}

fn parse_font(bytes: &[u8]) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|e| anyhow::anyhow!("parse font: {e}"))
}

impl TextRasterizer for FontdueRasterizer {
    fn rasterize(&self, text: &str, style: &TextStyle) -> Option<Surface> {
        if text.is_empty() || !(style.font_size > 0.0) {
            return None;
        }
        let font = self.font_for(&style.font_family);
        let px = style.font_size;

        // First pass: extents.
        let mut ascent = 0i32;
        let mut descent = 0i32;
        let mut width = 0i32;
        for ch in text.chars() {
            let m = font.metrics(ch, px);
            ascent  = ascent.max(m.height as i32 + m.ymin);
            descent = descent.max(-m.ymin);
            width  += m.advance_width.ceil() as i32;
        }
        let (w, h) = (width.max(1) as u32, (ascent + descent).max(1) as u32);
        let mut out = Surface::new(w, h);
        let [r, g, b, a] = style.color;

        // Second pass: glyph coverage → alpha.
        let mut cursor = 0i32;
        for ch in text.chars() {
            let (m, bitmap) = font.rasterize(ch, px);
            let gx0 = cursor + m.xmin;
            let gy0 = ascent - (m.height as i32 + m.ymin);
            for gy in 0..m.height {
                for gx in 0..m.width {
                    let coverage = bitmap[gy * m.width + gx];
                    let (x, y) = (gx0 + gx as i32, gy0 + gy as i32);
                    if coverage == 0 || x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                        continue;
                    }
                    let alpha = (coverage as u16 * a as u16 / 255) as u8;
                    let prev = out.pixel(x as u32, y as u32)[3];
                    out.set_pixel(x as u32, y as u32, [r, g, b, prev.max(alpha)]);
                }
            }
            cursor += m.advance_width.ceil() as i32;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufWriter;

    fn write_png(path: &Path, w: u32, h: u32, color: png::ColorType, data: &[u8]) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), w, h);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }

    #[test]
    fn load_rgb_png_adds_opaque_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        write_png(&path, 2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);

        let mut lib = ImageLibrary::new();
        let src = SourceRef::new("blob:still");
        lib.load_png(src.clone(), &path).unwrap();

        let s = lib.frame(&src, 42.0).unwrap();
        assert_eq!((s.width, s.height), (2, 1));
        assert_eq!(s.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(s.pixel(1, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn grey_alpha_png_expands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ga.png");
        write_png(&path, 1, 1, png::ColorType::GrayscaleAlpha, &[100, 50]);
        let s = decode_png(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(s.pixel(0, 0), [100, 100, 100, 50]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let mut lib = ImageLibrary::new();
        let err = lib.load_png(SourceRef::new("x"), Path::new("/no/such/file.png")).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/file.png"));
        assert!(lib.is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_png(b"definitely not a png").is_err());
    }

    #[test]
    fn sequence_picks_frame_by_time_and_clamps() {
        let src = SourceRef::new("blob:video");
        let frames: Vec<_> = (0..4).map(|i| Surface::filled(1, 1, [i * 10, 0, 0, 255])).collect();
        let mut seqs = FrameSequences::new();
        assert!(seqs.insert(src.clone(), 2.0, frames));

        assert_eq!(seqs.frame(&src, 0.0).unwrap().pixel(0, 0)[0], 0);
        assert_eq!(seqs.frame(&src, 1.2).unwrap().pixel(0, 0)[0], 20);
        assert_eq!(seqs.frame(&src, 99.0).unwrap().pixel(0, 0)[0], 30);
        assert!(seqs.frame(&SourceRef::new("other"), 0.0).is_none());
    }

    #[test]
    fn empty_sequence_is_refused() {
        let mut seqs = FrameSequences::new();
        assert!(!seqs.insert(SourceRef::new("v"), 30.0, vec![]));
        assert!(!seqs.insert(SourceRef::new("v"), 0.0, vec![Surface::new(1, 1)]));
    }

    #[test]
    fn tuple_source_falls_through() {
        let mut lib = ImageLibrary::new();
        lib.insert(SourceRef::new("img"), Surface::filled(1, 1, [1, 2, 3, 255]));
        let mut seqs = FrameSequences::new();
        seqs.insert(SourceRef::new("vid"), 1.0, vec![Surface::filled(1, 1, [9, 9, 9, 255])]);

        let both = (lib, seqs);
        assert_eq!(both.frame(&SourceRef::new("img"), 0.0).unwrap().pixel(0, 0)[0], 1);
        assert_eq!(both.frame(&SourceRef::new("vid"), 0.0).unwrap().pixel(0, 0)[0], 9);
        assert!(both.frame(&SourceRef::new("none"), 0.0).is_none());
    }

    const DEJAVU: &[u8] = include_bytes!("../testdata/DejaVuSans.ttf");

    fn red(px: f32) -> TextStyle {
        TextStyle { font_size: px, color: [255, 0, 0, 255], ..TextStyle::default() }
    }

    #[test]
    fn fontdue_lays_out_a_line() {
        let r = FontdueRasterizer::from_bytes(DEJAVU).unwrap();
        let s = r.rasterize("Hi", &red(48.0)).unwrap();
        assert!(s.width > 30 && s.width < 100, "width {}", s.width);
        assert!(s.height > 20 && s.height <= 60, "height {}", s.height);

        let covered: Vec<_> = s.pixels.chunks_exact(4).filter(|p| p[3] > 0).collect();
        assert!(!covered.is_empty());
        assert!(covered.len() < (s.width * s.height) as usize, "gaps stay transparent");
        assert!(covered.iter().any(|p| p[3] == 255), "glyph stems are fully covered");
        assert!(covered.iter().all(|p| p[..3] == [255, 0, 0]));
    }

    #[test]
    fn longer_text_and_bigger_size_grow_the_surface() {
        let r = FontdueRasterizer::from_bytes(DEJAVU).unwrap();
        let short = r.rasterize("Hi", &red(48.0)).unwrap();
        let long  = r.rasterize("Hi there", &red(48.0)).unwrap();
        let big   = r.rasterize("Hi", &red(96.0)).unwrap();
        assert!(long.width > short.width);
        assert!(big.height > short.height);
        assert!(r.rasterize("", &red(48.0)).is_none());
        assert!(r.rasterize("Hi", &red(0.0)).is_none());
    }

    #[test]
    fn family_lookup_ignores_case_and_falls_back() {
        let r = FontdueRasterizer::from_bytes(DEJAVU).unwrap()
            .with_family("DejaVu Sans", DEJAVU).unwrap();
        let named = TextStyle { font_family: "dejavu sans".into(), ..red(32.0) };
        let unknown = TextStyle { font_family: "Impact".into(), ..red(32.0) };
        assert_eq!(r.rasterize("Ok", &named), r.rasterize("Ok", &unknown));
    }

    #[test]
    fn bad_font_bytes_error() {
        assert!(FontdueRasterizer::from_bytes(&[0, 1, 2, 3]).is_err());
    }

    #[test]
    fn no_text_draws_nothing() {
        assert!(NoText.rasterize("hello", &TextStyle::default()).is_none());
    }
}

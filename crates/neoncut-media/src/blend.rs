// crates/neoncut-media/src/blend.rs
//
// Per-pixel math for the compositor, on f32 channels in [0, 1].
//
//   - Clamp / lerp
//   - Color adjustments  (brightness → contrast → saturate → hue-rotate)
//   - Blend modes        (separable, canvas composite-operation semantics)
//   - Box blur           (whole-surface, rows in parallel)

use neoncut_core::state::{BlendMode, VisualProperties};
use rayon::prelude::*;

use crate::surface::Surface;

// ── Clamp / lerp ─────────────────────────────────────────────────────────────

#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn to_unit(b: u8) -> f32 {
    b as f32 / 255.0
}

#[inline]
pub fn to_byte(v: f32) -> u8 {
    (clamp01(v) * 255.0).round() as u8
}

// ── Color adjustments ────────────────────────────────────────────────────────

/// The filter chain a clip asks for, pre-resolved so the per-pixel loop only
/// does multiplies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorAdjust {
    pub brightness: f32,
    pub contrast:   f32,
    /// Saturation and hue folded into one 3×3 matrix.
    matrix:         [[f32; 3]; 3],
    identity:       bool,
}

impl ColorAdjust {
    pub fn from_visual(v: &VisualProperties) -> Self {
        let sat = saturate_matrix(v.saturation);
        let hue = hue_rotate_matrix(v.hue.to_radians());
        let matrix = mat_mul(&hue, &sat);
        let identity = v.brightness == 1.0 && v.contrast == 1.0 && v.saturation == 1.0 && v.hue == 0.0;
        Self { brightness: v.brightness, contrast: v.contrast, matrix, identity }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.identity {
            return rgb;
        }
        let b = rgb.map(|c| c * self.brightness);
        let c = b.map(|c| clamp01((c - 0.5) * self.contrast + 0.5));
        let m = &self.matrix;
        [
            clamp01(m[0][0] * c[0] + m[0][1] * c[1] + m[0][2] * c[2]),
            clamp01(m[1][0] * c[0] + m[1][1] * c[1] + m[1][2] * c[2]),
            clamp01(m[2][0] * c[0] + m[2][1] * c[1] + m[2][2] * c[2]),
        ]
    }

    /// Adjust every pixel of `s` in place.
    pub fn apply_to_surface(&self, s: &mut Surface) {
        if self.identity {
            return;
        }
        let row = s.row_bytes().max(4);
        s.pixels.par_chunks_mut(row).for_each(|line| {
            for px in line.chunks_exact_mut(4) {
                let out = self.apply([to_unit(px[0]), to_unit(px[1]), to_unit(px[2])]);
                px[0] = to_byte(out[0]);
                px[1] = to_byte(out[1]);
                px[2] = to_byte(out[2]);
            }
        });
    }
}

// Luminance-preserving matrices from the Filter Effects spec.
fn saturate_matrix(s: f32) -> [[f32; 3]; 3] {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(rad: f32) -> [[f32; 3]; 3] {
    let (sin, cos) = rad.sin_cos();
    [
        [0.213 + cos * 0.787 - sin * 0.213, 0.715 - cos * 0.715 - sin * 0.715, 0.072 - cos * 0.072 + sin * 0.928],
        [0.213 - cos * 0.213 + sin * 0.143, 0.715 + cos * 0.285 + sin * 0.140, 0.072 - cos * 0.072 - sin * 0.283],
        [0.213 - cos * 0.213 - sin * 0.787, 0.715 - cos * 0.715 + sin * 0.715, 0.072 + cos * 0.928 + sin * 0.072],
    ]
}

fn mat_mul(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

// ── Blend modes ──────────────────────────────────────────────────────────────

/// Blend function B(dst, src) for one channel.
#[inline]
pub fn blend_channel(mode: BlendMode, dst: f32, src: f32) -> f32 {
    match mode {
        BlendMode::Normal     => src,
        BlendMode::Multiply   => dst * src,
        BlendMode::Screen     => dst + src - dst * src,
        BlendMode::Overlay    => {
            if dst <= 0.5 { 2.0 * dst * src } else { 1.0 - 2.0 * (1.0 - dst) * (1.0 - src) }
        }
        BlendMode::Darken     => dst.min(src),
        BlendMode::Lighten    => dst.max(src),
        BlendMode::Add        => (dst + src).min(1.0),
        BlendMode::Difference => (dst - src).abs(),
    }
}

/// Composite `src` with coverage `alpha` over an opaque `dst`.
#[inline]
pub fn composite(mode: BlendMode, dst: [f32; 3], src: [f32; 3], alpha: f32) -> [f32; 3] {
    let a = clamp01(alpha);
    [
        lerp(dst[0], blend_channel(mode, dst[0], src[0]), a),
        lerp(dst[1], blend_channel(mode, dst[1], src[1]), a),
        lerp(dst[2], blend_channel(mode, dst[2], src[2]), a),
    ]
}

// ── Blur ─────────────────────────────────────────────────────────────────────

/// Approximate a Gaussian of std-dev `radius` px with three box passes per
/// axis. Works on premultiplied values so transparent edges stay clean.
pub fn blur(s: &Surface, radius: f32) -> Surface {
    if radius < 0.5 || s.is_empty() {
        return s.clone();
    }
    // Box width for three passes approximating sigma = radius.
    let r = (((12.0 * radius * radius / 3.0) + 1.0).sqrt() / 2.0).round().max(1.0) as usize;

    let (w, h) = (s.width as usize, s.height as usize);
    let mut buf: Vec<[f32; 4]> = s.pixels.chunks_exact(4)
        .map(|p| {
            let a = to_unit(p[3]);
            [to_unit(p[0]) * a, to_unit(p[1]) * a, to_unit(p[2]) * a, a]
        })
        .collect();

    for _ in 0..3 {
        buf = box_rows(&buf, w, r);
        buf = transpose(&box_rows(&transpose(&buf, w, h), h, r), h, w);
    }

    let mut out = Surface::new(s.width, s.height);
    for (dst, p) in out.pixels.chunks_exact_mut(4).zip(&buf) {
        let a = p[3];
        if a > 0.0 {
            dst.copy_from_slice(&[to_byte(p[0] / a), to_byte(p[1] / a), to_byte(p[2] / a), to_byte(a)]);
        }
    }
    out
}

fn box_rows(src: &[[f32; 4]], w: usize, r: usize) -> Vec<[f32; 4]> {
    let mut out = vec![[0.0_f32; 4]; src.len()];
    out.par_chunks_mut(w).zip(src.par_chunks(w)).for_each(|(dst, row)| {
        let norm = 1.0 / (2 * r + 1) as f32;
        for (x, d) in dst.iter_mut().enumerate() {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(w - 1);
            let mut acc = [0.0_f32; 4];
            for p in &row[lo..=hi] {
                for c in 0..4 {
                    acc[c] += p[c];
                }
            }
            *d = acc.map(|v| v * norm);
        }
    });
    out
}

fn transpose(src: &[[f32; 4]], w: usize, h: usize) -> Vec<[f32; 4]> {
    let mut out = vec![[0.0_f32; 4]; src.len()];
    for y in 0..h {
        for x in 0..w {
            out[x * h + y] = src[y * w + x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn neutral_adjust_is_identity() {
        let adj = ColorAdjust::from_visual(&VisualProperties::default());
        assert!(adj.is_identity());
        assert_eq!(adj.apply([0.2, 0.4, 0.6]), [0.2, 0.4, 0.6]);
    }

    #[test]
    fn zero_saturation_is_grey() {
        let v = VisualProperties { saturation: 0.0, ..VisualProperties::default() };
        let out = ColorAdjust::from_visual(&v).apply([1.0, 0.0, 0.0]);
        assert!((out[0] - out[1]).abs() < 1e-3 && (out[1] - out[2]).abs() < 1e-3);
        assert!((out[0] - 0.213).abs() < 1e-3);
    }

    #[test]
    fn full_hue_turn_is_identity() {
        let v = VisualProperties { hue: 360.0, ..VisualProperties::default() };
        assert!(close(ColorAdjust::from_visual(&v).apply([0.3, 0.6, 0.9]), [0.3, 0.6, 0.9]));
    }

    #[test]
    fn brightness_and_contrast() {
        let v = VisualProperties { brightness: 2.0, ..VisualProperties::default() };
        assert!(close(ColorAdjust::from_visual(&v).apply([0.25, 0.5, 0.75]), [0.5, 1.0, 1.0]));
        let v = VisualProperties { contrast: 0.0, ..VisualProperties::default() };
        assert!(close(ColorAdjust::from_visual(&v).apply([0.1, 0.9, 0.4]), [0.5, 0.5, 0.5]));
    }

    #[test]
    fn blend_modes_match_canvas() {
        assert_eq!(blend_channel(BlendMode::Multiply, 0.5, 0.5), 0.25);
        assert_eq!(blend_channel(BlendMode::Screen, 0.5, 0.5), 0.75);
        assert_eq!(blend_channel(BlendMode::Add, 0.8, 0.8), 1.0);
        assert_eq!(blend_channel(BlendMode::Difference, 0.2, 0.7), 0.5);
    }

    #[test]
    fn composite_respects_alpha() {
        let out = composite(BlendMode::Normal, [0.0; 3], [1.0; 3], 0.25);
        assert!(close(out, [0.25; 3]));
        assert_eq!(composite(BlendMode::Normal, [0.3; 3], [1.0; 3], 0.0), [0.3; 3]);
    }

    #[test]
    fn blur_spreads_a_point() {
        let mut s = Surface::new(9, 9);
        s.set_pixel(4, 4, [255, 255, 255, 255]);
        let b = blur(&s, 1.0);
        assert!(b.pixel(4, 4)[3] < 255);
        assert!(b.pixel(5, 4)[3] > 0);
        assert_eq!(b.pixel(5, 4)[0], 255, "color stays white under premultiplied blur");
    }

    #[test]
    fn tiny_blur_is_noop() {
        let s = Surface::filled(3, 3, [10, 20, 30, 255]);
        assert_eq!(blur(&s, 0.2), s);
    }
}

// crates/neoncut-media/src/compositor.rs
//
// Draws one timeline instant onto an RGBA surface.
//
// Per clip, back to front:
//   1. fetch the layer     (video frame / still / rasterised text)
//   2. color-adjust + blur (visual media only; text is drawn unfiltered)
//   3. place it            centre + (x, y), rotate, scale; sampled through
//                          the inverse transform so every canvas pixel reads
//                          exactly one filtered layer sample
//   4. composite           opacity × fade ramp, clip blend mode

use std::borrow::Cow;

use neoncut_core::query::{fade_factor, render_order, source_time};
use neoncut_core::state::{Clip, MediaKind, Track};
use rayon::prelude::*;
use tracing::trace;

use crate::blend::{blur, clamp01, composite, to_byte, to_unit, ColorAdjust};
use crate::sources::{FrameSource, TextRasterizer};
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq)]
pub struct Compositor {
    pub width:      u32,
    pub height:     u32,
    /// Opaque fill drawn under everything.
    pub background: [u8; 4],
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: [0, 0, 0, 255] }
    }

    /// A fresh surface of the canvas size.
    pub fn surface(&self) -> Surface {
        Surface::filled(self.width, self.height, self.background)
    }

    /// Render timeline time `t` into `target`. Returns how many clips drew
    /// something.
    pub fn render(
        &self,
        target:  &mut Surface,
        clips:   &[Clip],
        tracks:  &[Track],
        t:       f64,
        sources: &dyn FrameSource,
        text:    &dyn TextRasterizer,
    ) -> usize {
        if target.width != self.width || target.height != self.height {
            *target = self.surface();
        } else {
            target.fill(self.background);
        }

        let mut drawn = 0;
        for clip in render_order(clips, tracks, t) {
            let Some(layer) = self.layer_for(clip, t, sources, text) else {
                trace!(clip = %clip.id, "no pixels for clip");
                continue;
            };
            let alpha = clamp01(clip.visual.opacity) * fade_factor(clip, t);
            if alpha <= 0.0 || layer.is_empty() {
                continue;
            }
            self.draw_layer(target, clip, &layer, alpha);
            drawn += 1;
        }
        drawn
    }

    fn layer_for<'s>(
        &self,
        clip:    &Clip,
        t:       f64,
        sources: &'s dyn FrameSource,
        text:    &dyn TextRasterizer,
    ) -> Option<Cow<'s, Surface>> {
        if clip.media_kind == MediaKind::Text {
            return text.rasterize(clip.text_content(), &clip.visual.text).map(Cow::Owned);
        }

        let source = clip.source_ref.as_ref()?;
        let mut layer = Cow::Borrowed(sources.frame(source, source_time(clip, t))?);

        let adjust = ColorAdjust::from_visual(&clip.visual);
        if !adjust.is_identity() {
            adjust.apply_to_surface(layer.to_mut());
        }
        if clip.visual.blur > 0.0 {
            layer = Cow::Owned(blur(&layer, clip.visual.blur));
        }
        Some(layer)
    }

    fn draw_layer(&self, target: &mut Surface, clip: &Clip, layer: &Surface, alpha: f32) {
        let v = &clip.visual;
        if !(v.scale > 0.0) {
            return;
        }
        let (sin, cos) = v.rotation.to_radians().sin_cos();
        let ox = self.width as f32 / 2.0 + v.x;
        let oy = self.height as f32 / 2.0 + v.y;
        let (hw, hh) = (layer.width as f32 / 2.0, layer.height as f32 / 2.0);

        // Canvas-space bounding box of the transformed layer.
        let corners = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(lx, ly)| {
            let (sx, sy) = (lx * v.scale, ly * v.scale);
            (ox + sx * cos - sy * sin, oy + sx * sin + sy * cos)
        });
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

        let x0 = (min_x.floor() - 1.0).max(0.0) as usize;
        let x1 = (max_x.ceil() + 1.0).clamp(0.0, self.width as f32) as usize;
        let y0 = (min_y.floor() - 1.0).max(0.0) as usize;
        let y1 = (max_y.ceil() + 1.0).clamp(0.0, self.height as f32) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let mode = v.blend_mode;
        let inv = 1.0 / v.scale;
        let row = target.row_bytes();

        target.pixels.par_chunks_mut(row).enumerate()
            .skip(y0)
            .take(y1 - y0)
            .for_each(|(y, line)| {
                let dy = y as f32 + 0.5 - oy;
                for x in x0..x1 {
                    let dx = x as f32 + 0.5 - ox;
                    let lx = (dx * cos + dy * sin) * inv + hw;
                    let ly = (-dx * sin + dy * cos) * inv + hh;
                    let src = layer.sample(lx, ly);
                    if src[3] <= 0.0 {
                        continue;
                    }
                    let px = &mut line[x * 4..x * 4 + 4];
                    let dst = [to_unit(px[0]), to_unit(px[1]), to_unit(px[2])];
                    let cov = src[3] * alpha;
                    let out = composite(mode, dst, [src[0], src[1], src[2]], cov);
                    let da  = to_unit(px[3]);
                    px[0] = to_byte(out[0]);
                    px[1] = to_byte(out[1]);
                    px[2] = to_byte(out[2]);
                    px[3] = to_byte(da + cov * (1.0 - da));
                }
            });
    }
}

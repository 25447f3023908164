//! Drawable layers of a keyframe, painted back to front onto a `vello_cpu` context.

use std::sync::Arc;

use crate::assets::template::{BackgroundTemplate, pixmap_from_premul};
use crate::foundation::core::{CANVAS, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::text::{TextStyle, Typesetter};
use crate::model::ImageAsset;

/// Something that paints itself onto the keyframe canvas.
pub trait Renderable {
    fn render(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        typesetter: &mut dyn Typesetter,
    ) -> ReelResult<()>;
}

fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn reset_transforms(ctx: &mut vello_cpu::RenderContext) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

/// Full-canvas copy of the background template.
pub struct BackgroundLayer<'a> {
    pub template: &'a BackgroundTemplate,
}

impl Renderable for BackgroundLayer<'_> {
    fn render(&self, ctx: &mut vello_cpu::RenderContext, _: &mut dyn Typesetter) -> ReelResult<()> {
        reset_transforms(ctx);
        ctx.set_paint(self.template.paint());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(CANVAS.width),
            f64::from(CANVAS.height),
        ));
        Ok(())
    }
}

/// Semi-transparent full-width band behind a text block.
///
/// The top and bottom `feather_ratio` of the band ramp linearly from transparent to the panel
/// alpha.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelLayer {
    pub bounds: kurbo::Rect,
    pub color: Rgba8,
    pub feather_ratio: f32,
}

impl PanelLayer {
    /// Alpha of the 1-px row starting at `y`, or `None` outside the band.
    pub fn row_alpha(&self, y: u32) -> Option<u8> {
        let top = self.bounds.y0.round() as i64;
        let bottom = self.bounds.y1.round() as i64;
        let y = i64::from(y);
        if y < top || y >= bottom {
            return None;
        }
        let feather = self.feather_rows();
        let from_edge = (y - top).min(bottom - 1 - y);
        if from_edge >= feather {
            return Some(self.color.a);
        }
        let t = (from_edge as f64 + 0.5) / feather as f64;
        Some((f64::from(self.color.a) * t).round() as u8)
    }

    fn feather_rows(&self) -> i64 {
        (self.bounds.height() * f64::from(self.feather_ratio)).round() as i64
    }
}

impl Renderable for PanelLayer {
    fn render(&self, ctx: &mut vello_cpu::RenderContext, _: &mut dyn Typesetter) -> ReelResult<()> {
        reset_transforms(ctx);
        let top = self.bounds.y0.round() as i64;
        let bottom = self.bounds.y1.round() as i64;
        if bottom <= top || self.color.a == 0 {
            return Ok(());
        }
        let (x0, x1) = (self.bounds.x0, self.bounds.x1);
        let feather = self.feather_rows().min((bottom - top) / 2);

        for i in 0..feather {
            let Some(alpha) = self.row_alpha((top + i) as u32) else {
                continue;
            };
            ctx.set_paint(self.color.with_alpha(alpha).to_paint());
            for y in [top + i, bottom - 1 - i] {
                ctx.fill_rect(&rect_to_cpu(kurbo::Rect::new(x0, y as f64, x1, (y + 1) as f64)));
            }
        }
        let (solid_top, solid_bottom) = (top + feather, bottom - feather);
        if solid_bottom > solid_top {
            ctx.set_paint(self.color.to_paint());
            let solid = kurbo::Rect::new(x0, solid_top as f64, x1, solid_bottom as f64);
            ctx.fill_rect(&rect_to_cpu(solid));
        }
        Ok(())
    }
}

/// An input image resized to its placement and drawn at an integer offset.
pub struct ImageLayer {
    pub x: u32,
    pub y: u32,
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl ImageLayer {
    /// Resample `asset` to exactly `width × height` (Lanczos3) and wrap it as a paint.
    pub fn prepare(asset: &ImageAsset, x: u32, y: u32, width: u32, height: u32) -> ReelResult<Self> {
        let src = asset.pixels();
        let data = if (src.width, src.height) == (width, height) {
            src.rgba8_premul.as_ref().clone()
        } else {
            let img = image::RgbaImage::from_raw(
                src.width,
                src.height,
                src.rgba8_premul.as_ref().clone(),
            )
            .ok_or_else(|| ReelError::Other(anyhow::anyhow!("image buffer size mismatch")))?;
            let mut data = image::imageops::resize(
                &img,
                width,
                height,
                image::imageops::FilterType::Lanczos3,
            )
            .into_raw();
            clamp_premultiplied(&mut data);
            data
        };
        let pixmap = pixmap_from_premul(&data, width, height)?;
        Ok(Self {
            x,
            y,
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Lanczos ringing can push color channels above alpha; keep the buffer valid premultiplied.
fn clamp_premultiplied(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
}

impl Renderable for ImageLayer {
    fn render(&self, ctx: &mut vello_cpu::RenderContext, _: &mut dyn Typesetter) -> ReelResult<()> {
        reset_transforms(ctx);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            f64::from(self.x),
            f64::from(self.y),
        )));
        ctx.set_paint(self.paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
        reset_transforms(ctx);
        Ok(())
    }
}

/// Glow halo drawn around a line: color and offset in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub color: Rgba8,
    pub radius: f32,
}

/// Drop shadow drawn under a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    pub offset: f32,
}

/// One wrapped line with its final position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: TextStyle,
    /// Left edge of the line's advance box.
    pub x: f32,
    /// Top of the line box.
    pub top: f32,
    pub width: f32,
    pub color: Rgba8,
    pub glow: Option<Glow>,
    pub shadow: Option<Shadow>,
}

/// A block of placed lines, drawn glow first, then shadow, then the fill.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayer {
    pub lines: Vec<PlacedLine>,
}

impl Renderable for TextLayer {
    fn render(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        typesetter: &mut dyn Typesetter,
    ) -> ReelResult<()> {
        for line in &self.lines {
            let (x, top) = (line.x, line.top);
            if let Some(glow) = line.glow.filter(|g| g.radius > 0.0 && g.color.a > 0) {
                let r = glow.radius;
                for (dx, dy) in [(-r, 0.0), (r, 0.0), (0.0, -r), (0.0, r)] {
                    typesetter.draw_line(ctx, line.style, &line.text, x + dx, top + dy, glow.color)?;
                }
            }
            if let Some(shadow) = line.shadow.filter(|s| s.offset > 0.0 && s.color.a > 0) {
                let o = shadow.offset;
                typesetter.draw_line(ctx, line.style, &line.text, x + o, top + o, shadow.color)?;
            }
            typesetter.draw_line(ctx, line.style, &line.text, x, top, line.color)?;
        }
        reset_transforms(ctx);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/layers.rs"]
mod tests;

use std::borrow::Cow;
use std::collections::HashMap;

use crate::assets::fonts::{FontFile, FontSet};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReelError, ReelResult};

/// Which font face a text role is set in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Title,
    Body,
}

/// Face and pixel size of one text role.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub face: Face,
    pub size_px: f32,
}

/// Measures and draws single lines of text.
///
/// Layout code only talks to this trait, so the keyframe geometry can be exercised without real
/// fonts.
pub trait Typesetter {
    /// Advance width of `text` in pixels.
    fn measure(&mut self, style: TextStyle, text: &str) -> f32;

    /// Height of one line (ascent + descent) in pixels.
    fn line_height(&mut self, style: TextStyle) -> f32;

    /// Draw `text` with its top-left corner at `(x, top)`.
    fn draw_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        style: TextStyle,
        text: &str,
        x: f32,
        top: f32,
        color: Rgba8,
    ) -> ReelResult<()>;
}

/// One registered font file with its own font context, so family lookups can only resolve to
/// this file's faces.
struct LoadedFace {
    font_ctx: parley::FontContext,
    family: String,
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
    font: vello_cpu::peniko::FontData,
}

/// Production typesetter: parley shaping, vello_cpu glyph rasterization.
pub struct ParleyTypesetter {
    layout_ctx: parley::LayoutContext<()>,
    title: LoadedFace,
    body: LoadedFace,
    line_heights: HashMap<(Face, u32), f32>,
}

impl ParleyTypesetter {
    pub fn new(fonts: &FontSet) -> ReelResult<Self> {
        Ok(Self {
            layout_ctx: parley::LayoutContext::new(),
            title: register_face(&fonts.title)?,
            body: register_face(&fonts.body)?,
            line_heights: HashMap::new(),
        })
    }

    fn layout(&mut self, style: TextStyle, text: &str) -> parley::Layout<()> {
        let face = match style.face {
            Face::Title => &mut self.title,
            Face::Body => &mut self.body,
        };
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(face.weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(face.style));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

fn register_face(file: &FontFile) -> ReelResult<LoadedFace> {
    let mut font_ctx = parley::FontContext::default();
    let families = font_ctx.collection.register_fonts(
        parley::fontique::Blob::from(file.bytes.to_vec()),
        None,
    );
    let (family_id, info) = families
        .first()
        .and_then(|(id, fonts)| fonts.first().map(|info| (*id, info.clone())))
        .ok_or_else(|| {
            ReelError::config(format!(
                "no font families registered from '{}'",
                file.path.display()
            ))
        })?;
    let family = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ReelError::config("registered font family has no name"))?
        .to_string();
    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(file.bytes.to_vec()),
        0,
    );
    Ok(LoadedFace {
        font_ctx,
        family,
        weight: info.weight(),
        style: info.style(),
        font,
    })
}

impl Typesetter for ParleyTypesetter {
    fn measure(&mut self, style: TextStyle, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.layout(style, text).width()
    }

    fn line_height(&mut self, style: TextStyle) -> f32 {
        let key = (style.face, style.size_px.to_bits());
        if let Some(h) = self.line_heights.get(&key) {
            return *h;
        }
        let layout = self.layout(style, "Hg");
        let h = layout
            .lines()
            .next()
            .map(|l| {
                let m = l.metrics();
                m.ascent + m.descent
            })
            .unwrap_or(style.size_px * 1.2);
        self.line_heights.insert(key, h);
        h
    }

    fn draw_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        style: TextStyle,
        text: &str,
        x: f32,
        top: f32,
        color: Rgba8,
    ) -> ReelResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let layout = self.layout(style, text);
        let font = match style.face {
            Face::Title => self.title.font.clone(),
            Face::Body => self.body.font.clone(),
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            f64::from(x),
            f64::from(top),
        )));
        ctx.set_paint(color.to_paint());
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

/// Font-free typesetter that draws every non-space character as a solid block.
///
/// Each character advances `size_px * advance_ratio`; blocks span the middle of the line. Used
/// by tests and for geometry previews on hosts without fonts.
#[derive(Clone, Debug)]
pub struct BlockTypesetter {
    pub advance_ratio: f32,
    pub line_height_ratio: f32,
}

impl Default for BlockTypesetter {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            line_height_ratio: 1.2,
        }
    }
}

impl Typesetter for BlockTypesetter {
    fn measure(&mut self, style: TextStyle, text: &str) -> f32 {
        text.chars().count() as f32 * style.size_px * self.advance_ratio
    }

    fn line_height(&mut self, style: TextStyle) -> f32 {
        style.size_px * self.line_height_ratio
    }

    fn draw_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        style: TextStyle,
        text: &str,
        x: f32,
        top: f32,
        color: Rgba8,
    ) -> ReelResult<()> {
        let advance = f64::from(style.size_px * self.advance_ratio);
        let h = f64::from(self.line_height(style));
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color.to_paint());
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = f64::from(x) + advance * i as f64;
            let y0 = f64::from(top) + h * 0.2;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                x0 + advance * 0.1,
                y0,
                x0 + advance * 0.9,
                y0 + h * 0.6,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;

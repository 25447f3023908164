use crate::assets::template::BackgroundTemplate;
use crate::config::LayoutConfig;
use crate::foundation::core::{CANVAS, FrameRGBA, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::fit_inside;
use crate::layout::layers::{
    BackgroundLayer, Glow, ImageLayer, PanelLayer, PlacedLine, Renderable, Shadow, TextLayer,
};
use crate::layout::text::{Face, TextStyle, Typesetter};
use crate::layout::wrap::wrap_text;
use crate::model::{ImageAsset, Keyframe, split_title};
use crate::resources::ResourceManager;

/// Smallest content region height, in pixels, a layout may leave for the image.
const MIN_CONTENT_HEIGHT: f64 = 16.0;

/// Fixed regions of the canvas, derived once from the layout config and font metrics.
///
/// The title and summary bands are sized for their maximum line counts, so the image region is
/// the same for every keyframe regardless of how much text a frame carries.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub text_left: f32,
    pub text_width: f32,
    /// Top of the first title line.
    pub title_text_top: f32,
    /// Top of the first summary line.
    pub summary_text_top: f32,
    pub title_panel: kurbo::Rect,
    pub summary_panel: kurbo::Rect,
    /// Region the image is fitted into.
    pub content: kurbo::Rect,
}

impl Geometry {
    pub fn compute(cfg: &LayoutConfig, typesetter: &mut dyn Typesetter) -> ReelResult<Self> {
        let (w, h) = (f64::from(CANVAS.width), f64::from(CANVAS.height));
        let margin = (w * f64::from(cfg.margin_ratio)) as f32;
        let text_width = w as f32 - 2.0 * margin;

        let title_lh = typesetter.line_height(title_style(cfg));
        let subtitle_lh = typesetter.line_height(subtitle_style(cfg));
        let summary_lh = typesetter.line_height(summary_style(cfg));

        let mut title_block = block_height(cfg.title_max_lines, title_lh, cfg.title_line_gap);
        if cfg.subtitle_max_lines > 0 {
            title_block += cfg.subtitle_offset
                + block_height(cfg.subtitle_max_lines, subtitle_lh, cfg.subtitle_line_gap);
        }
        let title_text_top = (h * f64::from(cfg.title_top_ratio)) as f32;
        let title_panel = band(
            f64::from(title_text_top - cfg.title_panel_padding.top),
            f64::from(title_text_top + title_block + cfg.title_panel_padding.bottom),
        );

        let summary_bottom = (h * f64::from(cfg.summary_bottom_ratio)) as f32;
        let summary_text_top = summary_bottom
            - block_height(cfg.summary_max_lines, summary_lh, cfg.summary_line_gap);
        let summary_panel = band(
            f64::from(summary_text_top - cfg.summary_panel_padding.top),
            f64::from(summary_bottom + cfg.summary_panel_padding.bottom),
        );

        let content = kurbo::Rect::new(
            0.0,
            title_panel.y1 + f64::from(cfg.image_gap_top),
            w,
            summary_panel.y0 - f64::from(cfg.image_gap_bottom),
        );
        if content.height() < MIN_CONTENT_HEIGHT {
            return Err(ReelError::config(format!(
                "text bands leave {:.0}px for the image; reduce line budgets or font sizes",
                content.height().max(0.0)
            )));
        }

        Ok(Self {
            text_left: margin,
            text_width,
            title_text_top,
            summary_text_top,
            title_panel,
            summary_panel,
            content,
        })
    }

    /// Integer placement of an image of `src_w × src_h` fitted and centered in the content region.
    pub fn place_image(&self, src_w: u32, src_h: u32) -> Option<ImagePlacement> {
        let region_top = self.content.y0.round() as u32;
        let region_h = (self.content.y1.round() as u32).saturating_sub(region_top);
        let region_w = self.content.width().round() as u32;
        let (width, height) = fit_inside(src_w, src_h, region_w, region_h);
        if width == 0 || height == 0 {
            return None;
        }
        Some(ImagePlacement {
            x: self.content.x0.round() as u32 + (region_w - width) / 2,
            y: region_top + (region_h - height) / 2,
            width,
            height,
        })
    }
}

fn block_height(lines: usize, line_height: f32, gap: f32) -> f32 {
    if lines == 0 {
        return 0.0;
    }
    lines as f32 * line_height + (lines - 1) as f32 * gap
}

fn band(top: f64, bottom: f64) -> kurbo::Rect {
    let h = f64::from(CANVAS.height);
    kurbo::Rect::new(0.0, top.clamp(0.0, h), f64::from(CANVAS.width), bottom.clamp(0.0, h))
}

fn title_style(cfg: &LayoutConfig) -> TextStyle {
    TextStyle {
        face: Face::Title,
        size_px: cfg.title_size,
    }
}

fn subtitle_style(cfg: &LayoutConfig) -> TextStyle {
    TextStyle {
        face: Face::Title,
        size_px: cfg.subtitle_size,
    }
}

fn summary_style(cfg: &LayoutConfig) -> TextStyle {
    TextStyle {
        face: Face::Body,
        size_px: cfg.summary_size,
    }
}

/// Where the fitted image lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImagePlacement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Everything drawn on one keyframe, fully positioned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameLayout {
    /// Title and subtitle lines.
    pub title: TextLayer,
    pub summary: TextLayer,
    pub title_panel: Option<PanelLayer>,
    pub summary_panel: Option<PanelLayer>,
    pub image: Option<ImagePlacement>,
    pub title_truncated: bool,
    pub summary_truncated: bool,
}

/// Positions text and images on the fixed canvas and rasterizes keyframes.
pub struct LayoutEngine {
    config: LayoutConfig,
    geometry: Geometry,
    typesetter: Box<dyn Typesetter>,
    resources: ResourceManager,
    ctx: Option<vello_cpu::RenderContext>,
}

impl LayoutEngine {
    pub fn new(
        config: LayoutConfig,
        mut typesetter: Box<dyn Typesetter>,
        resources: ResourceManager,
    ) -> ReelResult<Self> {
        let geometry = Geometry::compute(&config, typesetter.as_mut())?;
        tracing::debug!(
            content_top = geometry.content.y0,
            content_bottom = geometry.content.y1,
            "layout geometry"
        );
        Ok(Self {
            config,
            geometry,
            typesetter,
            resources,
            ctx: None,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Position all text and the image for one keyframe without drawing anything.
    ///
    /// `image` is the upright size of the keyframe's image, `None` for a text-only frame.
    pub fn layout(&mut self, image: Option<(u32, u32)>, title: &str, summary: &str) -> FrameLayout {
        let cfg = &self.config;
        let g = &self.geometry;
        let ts = self.typesetter.as_mut();
        let mut out = FrameLayout::default();

        let (main, sub) = split_title(title, cfg.subtitle_separator);
        let title_glow = Glow {
            color: cfg.title_glow,
            radius: cfg.glow_radius,
        };
        let subtitle_glow = Glow {
            color: cfg.subtitle_glow,
            radius: cfg.glow_radius,
        };
        let title_shadow = Shadow {
            color: cfg.shadow_color,
            offset: cfg.title_shadow_offset,
        };

        let mut y = g.title_text_top;
        let main_block = place_block(
            ts,
            g,
            main,
            BlockStyle {
                style: title_style(cfg),
                max_lines: cfg.title_max_lines,
                line_gap: cfg.title_line_gap,
                color: cfg.title_color,
                glow: Some(title_glow),
                shadow: Some(title_shadow),
            },
            &cfg.ellipsis,
            y,
        );
        out.title_truncated |= main_block.truncated;
        if let Some(bottom) = main_block.bottom {
            y = bottom + cfg.subtitle_offset;
        }
        out.title.lines.extend(main_block.lines);

        if let Some(sub) = sub
            && cfg.subtitle_max_lines > 0
        {
            let sub_block = place_block(
                ts,
                g,
                sub,
                BlockStyle {
                    style: subtitle_style(cfg),
                    max_lines: cfg.subtitle_max_lines,
                    line_gap: cfg.subtitle_line_gap,
                    color: cfg.subtitle_color,
                    glow: Some(subtitle_glow),
                    shadow: Some(title_shadow),
                },
                &cfg.ellipsis,
                y,
            );
            out.title_truncated |= sub_block.truncated;
            out.title.lines.extend(sub_block.lines);
        }

        let summary_block = place_block(
            ts,
            g,
            summary,
            BlockStyle {
                style: summary_style(cfg),
                max_lines: cfg.summary_max_lines,
                line_gap: cfg.summary_line_gap,
                color: cfg.summary_color,
                glow: None,
                shadow: Some(Shadow {
                    color: cfg.shadow_color,
                    offset: cfg.summary_shadow_offset,
                }),
            },
            &cfg.ellipsis,
            g.summary_text_top,
        );
        out.summary_truncated = summary_block.truncated;
        out.summary.lines = summary_block.lines;

        let panel = |bounds| PanelLayer {
            bounds,
            color: cfg.panel_color,
            feather_ratio: cfg.panel_feather_ratio,
        };
        out.title_panel = (!out.title.lines.is_empty()).then(|| panel(g.title_panel));
        out.summary_panel = (!out.summary.lines.is_empty()).then(|| panel(g.summary_panel));
        out.image = image.and_then(|(w, h)| g.place_image(w, h));
        out
    }

    /// Rasterize one keyframe: background, panels, image, then text.
    pub fn render_frame(
        &mut self,
        background: &BackgroundTemplate,
        image: Option<&ImageAsset>,
        title: &str,
        summary: &str,
    ) -> ReelResult<(FrameRGBA, FrameLayout)> {
        let layout = self.layout(image.map(|i| (i.width, i.height)), title, summary);

        let mut layers: Vec<Box<dyn Renderable + '_>> = vec![Box::new(BackgroundLayer {
            template: background,
        })];
        if let Some(p) = &layout.title_panel {
            layers.push(Box::new(p.clone()));
        }
        if let Some(p) = &layout.summary_panel {
            layers.push(Box::new(p.clone()));
        }
        if let (Some(asset), Some(place)) = (image, layout.image) {
            layers.push(Box::new(ImageLayer::prepare(
                asset,
                place.x,
                place.y,
                place.width,
                place.height,
            )?));
        }
        layers.push(Box::new(layout.title.clone()));
        layers.push(Box::new(layout.summary.clone()));

        let (w, h) = CANVAS.as_tuple();
        let (w16, h16) = (w as u16, h as u16);
        let ctx = self
            .ctx
            .get_or_insert_with(|| vello_cpu::RenderContext::new(w16, h16));
        ctx.reset();
        for layer in &layers {
            layer.render(ctx, self.typesetter.as_mut())?;
        }
        drop(layers);

        let _scratch = self.resources.lease(CANVAS.rgba_len());
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok((
            FrameRGBA {
                width: w,
                height: h,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            },
            layout,
        ))
    }

    /// Compose keyframe `index` and hand its raster to the resource manager.
    #[tracing::instrument(
        level = "debug",
        skip(self, background, image, title, summary),
        fields(text_only = image.is_none())
    )]
    pub fn compose(
        &mut self,
        index: usize,
        background: &BackgroundTemplate,
        image: Option<&ImageAsset>,
        title: &str,
        summary: &str,
    ) -> ReelResult<Keyframe> {
        let (frame, layout) = self.render_frame(background, image, title, summary)?;
        if layout.title_truncated || layout.summary_truncated {
            tracing::debug!(
                title = layout.title_truncated,
                summary = layout.summary_truncated,
                "text truncated to fit"
            );
        }
        let raster = self.resources.admit_keyframe(frame)?;
        Ok(Keyframe {
            index,
            source: image.map(|i| i.source.clone()),
            raster,
        })
    }
}

struct BlockStyle {
    style: TextStyle,
    max_lines: usize,
    line_gap: f32,
    color: Rgba8,
    glow: Option<Glow>,
    shadow: Option<Shadow>,
}

struct PlacedBlock {
    lines: Vec<PlacedLine>,
    truncated: bool,
    /// Bottom of the last line, `None` when nothing was placed.
    bottom: Option<f32>,
}

/// Wrap `text` into the text column and center each line horizontally, starting at `top`.
fn place_block(
    ts: &mut dyn Typesetter,
    g: &Geometry,
    text: &str,
    block: BlockStyle,
    ellipsis: &str,
    top: f32,
) -> PlacedBlock {
    let wrapped = wrap_text(text, g.text_width, block.max_lines, ellipsis, |s| {
        ts.measure(block.style, s)
    });
    let lh = ts.line_height(block.style);

    let mut lines = Vec::with_capacity(wrapped.lines.len());
    let mut y = top;
    let mut bottom = None;
    for text in wrapped.lines {
        let width = ts.measure(block.style, &text);
        let x = g.text_left + ((g.text_width - width) / 2.0).max(0.0);
        lines.push(PlacedLine {
            text,
            style: block.style,
            x,
            top: y,
            width,
            color: block.color,
            glow: block.glow,
            shadow: block.shadow,
        });
        bottom = Some(y + lh);
        y += lh + block.line_gap;
    }
    PlacedBlock {
        lines,
        truncated: wrapped.truncated,
        bottom,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;

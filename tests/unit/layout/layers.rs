use std::io::Cursor;

use super::*;
use crate::assets::loader::AssetLoader;
use crate::assets::source::ImageSource;
use crate::config::{AssetLimits, ResourceLimits};
use crate::layout::text::{BlockTypesetter, Face};
use crate::model::ImageRef;
use crate::resources::ResourceManager;

fn render(w: u16, h: u16, layer: &dyn Renderable) -> vello_cpu::Pixmap {
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let mut ts = BlockTypesetter::default();
    layer.render(&mut ctx, &mut ts).unwrap();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    pixmap
}

fn px(pixmap: &vello_cpu::Pixmap, x: usize, y: usize) -> [u8; 4] {
    let i = (y * pixmap.width() as usize + x) * 4;
    let d = pixmap.data_as_u8_slice();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

fn panel(top: f64, bottom: f64) -> PanelLayer {
    PanelLayer {
        bounds: kurbo::Rect::new(0.0, top, 100.0, bottom),
        color: Rgba8::rgba(20, 20, 40, 200),
        feather_ratio: 0.1,
    }
}

#[test]
fn panel_alpha_ramps_at_both_edges() {
    let p = panel(10.0, 110.0);
    assert_eq!(p.row_alpha(9), None);
    assert_eq!(p.row_alpha(110), None);
    assert_eq!(p.row_alpha(60), Some(200));

    let top_edge = p.row_alpha(10).unwrap();
    let bottom_edge = p.row_alpha(109).unwrap();
    assert_eq!(top_edge, bottom_edge);
    assert!(top_edge < 20);
    assert!(p.row_alpha(12).unwrap() < p.row_alpha(16).unwrap());
    assert_eq!(p.row_alpha(20), Some(200));
}

#[test]
fn panel_without_feather_is_a_solid_band() {
    let p = PanelLayer {
        feather_ratio: 0.0,
        ..panel(10.0, 30.0)
    };
    assert_eq!(p.row_alpha(10), Some(200));
    assert_eq!(p.row_alpha(29), Some(200));
}

#[test]
fn panel_paints_only_inside_its_band() {
    let pixmap = render(100, 128, &panel(10.0, 110.0));
    assert_eq!(px(&pixmap, 50, 5)[3], 0);
    assert_eq!(px(&pixmap, 50, 120)[3], 0);
    let mid = px(&pixmap, 50, 60);
    assert!((198..=202).contains(&mid[3]), "{mid:?}");
    assert!(px(&pixmap, 50, 10)[3] < mid[3]);
}

fn red_asset(w: u32, h: u32) -> crate::model::ImageAsset {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let loader = AssetLoader::new(
        AssetLimits::default(),
        ResourceManager::new(ResourceLimits::default()),
    );
    loader
        .load(&ImageRef::selected(ImageSource::from_bytes("red.png", png)))
        .unwrap()
}

#[test]
fn image_layer_is_resized_and_offset() {
    let asset = red_asset(4, 2);
    let layer = ImageLayer::prepare(&asset, 5, 5, 20, 10).unwrap();
    assert_eq!(layer.size(), (20, 10));

    let pixmap = render(40, 40, &layer);
    assert_eq!(px(&pixmap, 15, 10), [255, 0, 0, 255]);
    assert_eq!(px(&pixmap, 2, 2)[3], 0);
    assert_eq!(px(&pixmap, 30, 10)[3], 0);
    assert_eq!(px(&pixmap, 15, 20)[3], 0);
}

#[test]
fn premultiplied_clamp_keeps_color_at_or_below_alpha() {
    let mut data = vec![250, 10, 90, 80, 1, 2, 3, 255];
    clamp_premultiplied(&mut data);
    assert_eq!(data, vec![80, 10, 80, 80, 1, 2, 3, 255]);
}

fn line(x: f32, shadow: Option<Shadow>, glow: Option<Glow>) -> PlacedLine {
    PlacedLine {
        text: "ab".to_string(),
        style: TextStyle {
            face: Face::Body,
            size_px: 20.0,
        },
        x,
        top: 10.0,
        width: 20.0,
        color: Rgba8::rgb(255, 255, 255),
        glow,
        shadow,
    }
}

#[test]
fn text_layer_draws_shadow_under_fill() {
    let shadow = Shadow {
        color: Rgba8::rgb(0, 0, 0),
        offset: 3.0,
    };
    let layer = TextLayer {
        lines: vec![line(10.0, Some(shadow), None)],
    };
    let pixmap = render(64, 64, &layer);

    // Block glyph "a" covers x 11..19, y 14.8..29.2 at size 20; the shadow sits 3px down and right.
    assert_eq!(px(&pixmap, 14, 20), [255, 255, 255, 255]);
    assert_eq!(px(&pixmap, 20, 28), [0, 0, 0, 255]);
    assert_eq!(px(&pixmap, 5, 5)[3], 0);
}

#[test]
fn transparent_effects_are_skipped() {
    let invisible = Glow {
        color: Rgba8::rgba(255, 0, 0, 0),
        radius: 4.0,
    };
    let with = render(
        64,
        64,
        &TextLayer {
            lines: vec![line(10.0, None, Some(invisible))],
        },
    );
    let without = render(
        64,
        64,
        &TextLayer {
            lines: vec![line(10.0, None, None)],
        },
    );
    assert_eq!(with.data_as_u8_slice(), without.data_as_u8_slice());
}

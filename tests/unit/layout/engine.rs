use std::io::Cursor;

use super::*;
use crate::assets::loader::AssetLoader;
use crate::assets::source::ImageSource;
use crate::config::{AssetLimits, ResourceLimits};
use crate::layout::text::BlockTypesetter;
use crate::model::ImageRef;

fn engine() -> LayoutEngine {
    LayoutEngine::new(
        LayoutConfig::default(),
        Box::new(BlockTypesetter::default()),
        ResourceManager::new(ResourceLimits::default()),
    )
    .unwrap()
}

fn solid_asset(w: u32, h: u32, rgba: [u8; 4]) -> ImageAsset {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    AssetLoader::new(
        AssetLimits::default(),
        ResourceManager::new(ResourceLimits::default()),
    )
    .load(&ImageRef::selected(ImageSource::from_bytes("solid.png", png)))
    .unwrap()
}

fn assert_px_close(a: Option<[u8; 4]>, b: Option<[u8; 4]>) {
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1), "{a:?} vs {b:?}");
}

#[test]
fn regions_are_stacked_without_overlap() {
    let e = engine();
    let g = e.geometry();
    assert!((g.text_left - 86.4).abs() < 1e-3);
    assert!((g.text_width - 907.2).abs() < 1e-3);
    assert!(g.title_panel.y0 >= 0.0);
    assert!(g.title_panel.y1 < g.content.y0);
    assert!(g.content.y0 < g.content.y1);
    assert!(g.content.y1 < g.summary_panel.y0);
    assert!(g.summary_panel.y1 <= 1920.0);
    assert_eq!(g.content.width(), 1080.0);
}

#[test]
fn portrait_image_fills_region_height() {
    let e = engine();
    let g = e.geometry().clone();
    let p = g.place_image(1000, 2000).unwrap();
    let region_top = g.content.y0.round() as u32;
    let region_bottom = g.content.y1.round() as u32;
    assert_eq!(p.y, region_top);
    assert_eq!(p.y + p.height, region_bottom);
    assert!(p.width < 1080);
    let left = p.x;
    let right = 1080 - (p.x + p.width);
    assert!(left.abs_diff(right) <= 1);
}

#[test]
fn landscape_image_fills_canvas_width() {
    let e = engine();
    let g = e.geometry().clone();
    let p = g.place_image(1600, 900).unwrap();
    assert_eq!((p.x, p.width), (0, 1080));
    assert_eq!(p.height, 608);
    assert!(p.y >= g.content.y0.floor() as u32);
    assert!(p.y + p.height <= g.content.y1.ceil() as u32);
}

#[test]
fn small_square_image_is_scaled_up() {
    let e = engine();
    let g = e.geometry().clone();
    let p = g.place_image(100, 100).unwrap();
    assert_eq!(p.width, p.height);
    assert!(p.width > 100);
    assert_eq!(p.x, (1080 - p.width) / 2);
}

#[test]
fn layout_is_deterministic() {
    let mut e = engine();
    let a = e.layout(Some((800, 600)), "Title | Sub", "A summary of the story.");
    let b = e.layout(Some((800, 600)), "Title | Sub", "A summary of the story.");
    assert_eq!(a, b);
}

#[test]
fn subtitle_is_placed_below_title_in_its_own_size() {
    let mut e = engine();
    let l = e.layout(None, "Main headline | Second line", "");
    let texts: Vec<_> = l.title.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["Main headline", "Second line"]);
    let (main, sub) = (&l.title.lines[0], &l.title.lines[1]);
    assert_eq!(main.style.size_px, 66.0);
    assert_eq!(sub.style.size_px, 58.0);
    assert!(sub.top > main.top + 66.0);
    assert!(l.summary_panel.is_none());
    assert!(l.title_panel.is_some());
}

#[test]
fn lines_are_centered_in_the_text_column() {
    let mut e = engine();
    let l = e.layout(None, "Short", "A longer summary line");
    for line in l.title.lines.iter().chain(&l.summary.lines) {
        let center = line.x + line.width / 2.0;
        assert!((center - 540.0).abs() < 0.5, "{line:?}");
    }
}

#[test]
fn long_summary_is_truncated_with_ellipsis() {
    let mut e = engine();
    let summary = "word ".repeat(400);
    let l = e.layout(None, "T", &summary);
    assert!(l.summary_truncated);
    assert!(!l.title_truncated);
    assert_eq!(l.summary.lines.len(), 5);
    assert!(l.summary.lines[4].text.ends_with('\u{2026}'));
    let width = e.geometry().text_width;
    assert!(l.summary.lines.iter().all(|line| line.width <= width));
}

#[test]
fn empty_title_leaves_title_slot_blank() {
    let mut e = engine();
    let l = e.layout(Some((10, 10)), "   ", "Summary only");
    assert!(l.title.lines.is_empty());
    assert!(l.title_panel.is_none());
    assert_eq!(l.summary.lines.len(), 1);
    assert!(l.image.is_some());
}

#[test]
fn oversized_text_bands_are_rejected() {
    let cfg = LayoutConfig {
        summary_max_lines: 30,
        ..LayoutConfig::default()
    };
    let err = LayoutEngine::new(
        cfg,
        Box::new(BlockTypesetter::default()),
        ResourceManager::new(ResourceLimits::default()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn text_only_keyframe_shows_background_in_content_region() {
    let mut e = engine();
    let bg = BackgroundTemplate::gradient().unwrap();
    let kf = e.compose(0, &bg, None, "Title", "Summary").unwrap();
    assert!(kf.source.is_none());
    assert_eq!(kf.dimensions(), (1080, 1920));

    let frame = kf.frame().unwrap();
    let y = ((e.geometry().content.y0 + e.geometry().content.y1) / 2.0) as u32;
    assert_px_close(frame.pixel(540, y), bg.pixel(540, y));
}

#[test]
fn composed_keyframe_contains_the_image() {
    let mut e = engine();
    let bg = BackgroundTemplate::gradient().unwrap();
    let asset = solid_asset(10, 20, [255, 0, 0, 255]);
    let kf = e.compose(3, &bg, Some(&asset), "Title", "Summary").unwrap();
    assert_eq!(kf.index, 3);
    assert_eq!(kf.source.as_ref(), Some(&asset.source));

    let place = e.geometry().place_image(10, 20).unwrap();
    let frame = kf.frame().unwrap();
    let center = frame.pixel(place.x + place.width / 2, place.y + place.height / 2);
    assert_px_close(center, Some([255, 0, 0, 255]));
    let mid = place.y + place.height / 2;
    assert_px_close(frame.pixel(5, mid), bg.pixel(5, mid));
}

#[test]
fn panels_darken_the_background_behind_text() {
    let mut e = engine();
    let bg = BackgroundTemplate::gradient().unwrap();
    let (frame, layout) = e.render_frame(&bg, None, "Title", "Summary").unwrap();
    let panel = layout.summary_panel.unwrap();
    let y = ((panel.bounds.y0 + panel.bounds.y1) / 2.0) as u32;
    // Column 2 is inside the margin, so no text is drawn there.
    let under = frame.pixel(2, y).unwrap();
    let bare = bg.pixel(2, y).unwrap();
    assert!(under[0] < bare[0] && under[2] < bare[2]);
    assert_eq!(under[3], 255);
}

use std::io::Cursor;

use super::*;

fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn gradient_runs_top_to_bottom() {
    let t = BackgroundTemplate::gradient().unwrap();
    assert_eq!(t.origin(), None);
    assert_eq!(t.pixel(0, 0), Some([102, 126, 234, 255]));
    assert_eq!(t.pixel(1079, 0), Some([102, 126, 234, 255]));
    let bottom = t.pixel(0, 1919).unwrap();
    assert!(bottom[0] >= 117 && bottom[1] <= 76 && bottom[2] <= 163);
    assert_eq!(t.pixel(1080, 0), None);
}

#[test]
fn template_file_is_resized_to_fill_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bg.png");
    write_png(&p, 90, 160, [10, 200, 30, 255]);

    let t = BackgroundTemplate::load(&p, &AssetLimits::default()).unwrap();
    assert_eq!(t.origin(), Some(p.as_path()));
    let px = t.pixel(540, 960).unwrap();
    for (got, want) in px.iter().zip([10u8, 200, 30, 255]) {
        assert!(got.abs_diff(want) <= 1, "{px:?}");
    }
    assert!(t.pixel(1079, 1919).is_some());
}

#[test]
fn unreadable_template_is_an_asset_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BackgroundTemplate::load(&dir.path().join("none.png"), &AssetLimits::default())
        .unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn process_shared_initializes_once() {
    let limits = AssetLimits::default();
    let a = BackgroundTemplate::process_shared(None, &limits).unwrap();
    let b = BackgroundTemplate::process_shared(Some(Path::new("/elsewhere/bg.png")), &limits)
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn pixmap_conversion_checks_sizes() {
    assert!(pixmap_from_premul(&[0u8; 16], 2, 2).is_ok());
    assert!(pixmap_from_premul(&[0u8; 15], 2, 2).is_err());
    assert!(pixmap_from_premul(&[], 70_000, 0).is_err());
}

use std::io::Cursor;
use std::sync::Arc;

use image::ImageDecoder as _;
use once_cell::sync::OnceCell;

use crate::foundation::error::{AssetError, ReelResult};
use crate::foundation::math::{clamp_dimensions, premultiply_rgba8_in_place};

/// A decoded, upright, size-clamped raster in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn byte_len(&self) -> usize {
        self.rgba8_premul.len()
    }
}

/// Decode encoded image bytes into a premultiplied raster.
///
/// EXIF orientation is applied so `width`/`height` describe the upright image, and any side
/// longer than `max_dimension` is scaled down proportionally. SVG documents are rasterized at
/// their intrinsic size (subject to the same clamp).
pub fn decode_image(
    bytes: &[u8],
    label: &str,
    extension_hint: Option<&str>,
    max_dimension: u32,
) -> ReelResult<PreparedImage> {
    if looks_like_svg(bytes, extension_hint) {
        return rasterize_svg(bytes, label, max_dimension);
    }

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AssetError::corrupt(label, e))?;
    if reader.format().is_none() {
        return Err(AssetError::unsupported(label, "unrecognized image format").into());
    }

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| classify_image_error(label, e))?;
    let orientation = decoder
        .orientation()
        .unwrap_or(image::metadata::Orientation::NoTransforms);
    let mut img =
        image::DynamicImage::from_decoder(decoder).map_err(|e| classify_image_error(label, e))?;
    img.apply_orientation(orientation);

    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(AssetError::corrupt(label, "image has zero width or height").into());
    }
    let (cw, ch) = clamp_dimensions(w, h, max_dimension);
    if (cw, ch) != (w, h) {
        tracing::warn!(label, from_w = w, from_h = h, to_w = cw, to_h = ch, "clamping oversized image");
        img = img.resize_exact(cw, ch, image::imageops::FilterType::Lanczos3);
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn classify_image_error(label: &str, err: image::ImageError) -> crate::foundation::error::ReelError {
    match err {
        image::ImageError::Unsupported(e) => AssetError::unsupported(label, e),
        image::ImageError::Limits(e) => AssetError::too_large(label, e),
        other => AssetError::corrupt(label, other),
    }
    .into()
}

fn looks_like_svg(bytes: &[u8], extension_hint: Option<&str>) -> bool {
    if extension_hint.is_some_and(|e| e.eq_ignore_ascii_case("svg")) {
        return true;
    }
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);
    let trimmed = head.trim_start();
    (trimmed.starts_with("<?xml") || trimmed.starts_with("<svg") || trimmed.starts_with("<!--"))
        && head.contains("<svg")
}

fn svg_fontdb() -> Arc<usvg::fontdb::Database> {
    static DB: OnceCell<Arc<usvg::fontdb::Database>> = OnceCell::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    })
    .clone()
}

fn rasterize_svg(bytes: &[u8], label: &str, max_dimension: u32) -> ReelResult<PreparedImage> {
    let opts = usvg::Options {
        fontdb: svg_fontdb(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| AssetError::corrupt(label, format!("invalid svg: {e}")))?;

    let size = tree.size();
    let (sw, sh) = (size.width(), size.height());
    if !(sw.is_finite() && sh.is_finite() && sw > 0.0 && sh > 0.0) {
        return Err(AssetError::corrupt(label, "svg has invalid width/height").into());
    }
    let (width, height) = clamp_dimensions(
        (sw.ceil() as u32).max(1),
        (sh.ceil() as u32).max(1),
        max_dimension,
    );

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| AssetError::too_large(label, "failed to allocate svg pixmap"))?;
    let xform =
        resvg::tiny_skia::Transform::from_scale(width as f32 / sw, height as f32 / sh);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

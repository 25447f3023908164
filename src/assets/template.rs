use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::assets::decode::decode_image;
use crate::assets::source::{Decodable, ImageSource};
use crate::config::AssetLimits;
use crate::foundation::core::{CANVAS, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};

/// Top and bottom colors of the built-in background gradient.
pub const GRADIENT_TOP: Rgba8 = Rgba8::rgb(102, 126, 234);
pub const GRADIENT_BOTTOM: Rgba8 = Rgba8::rgb(118, 75, 162);

static SHARED: OnceCell<Arc<BackgroundTemplate>> = OnceCell::new();

/// The read-only canvas-sized image every keyframe is composed on.
///
/// A template is immutable once built. Composition paints it as the first layer of a fresh
/// canvas, so the template pixels themselves are never written to.
pub struct BackgroundTemplate {
    pixmap: Arc<vello_cpu::Pixmap>,
    origin: Option<PathBuf>,
}

impl std::fmt::Debug for BackgroundTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTemplate")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl BackgroundTemplate {
    /// Vertical two-color gradient used when no template file is configured.
    pub fn gradient() -> ReelResult<Self> {
        let (w, h) = CANVAS.as_tuple();
        let mut bytes = Vec::with_capacity(CANVAS.rgba_len());
        for y in 0..h {
            let c = GRADIENT_TOP.lerp(GRADIENT_BOTTOM, f64::from(y) / f64::from(h));
            let px = c.premultiplied();
            for _ in 0..w {
                bytes.extend_from_slice(&px);
            }
        }
        Ok(Self {
            pixmap: Arc::new(pixmap_from_premul(&bytes, w, h)?),
            origin: None,
        })
    }

    /// Load a template image from disk. Images that are not canvas-sized are scaled to cover the
    /// canvas and center-cropped.
    pub fn load(path: &Path, limits: &AssetLimits) -> ReelResult<Self> {
        let source = ImageSource::from_path(path);
        let bytes = source.encoded_bytes(limits.max_input_bytes)?;
        let ext = source.extension_hint();
        let prepared = decode_image(&bytes, &source.label(), ext.as_deref(), limits.max_dimension)?;

        let (w, h) = CANVAS.as_tuple();
        let data = if (prepared.width, prepared.height) == (w, h) {
            prepared.rgba8_premul.as_ref().clone()
        } else {
            tracing::warn!(
                path = %path.display(),
                width = prepared.width,
                height = prepared.height,
                "background template is not {w}x{h}; resizing to fill"
            );
            let img = image::RgbaImage::from_raw(
                prepared.width,
                prepared.height,
                prepared.rgba8_premul.as_ref().clone(),
            )
            .ok_or_else(|| ReelError::Other(anyhow::anyhow!("template buffer size mismatch")))?;
            image::DynamicImage::ImageRgba8(img)
                .resize_to_fill(w, h, image::imageops::FilterType::Lanczos3)
                .to_rgba8()
                .into_raw()
        };

        Ok(Self {
            pixmap: Arc::new(pixmap_from_premul(&data, w, h)?),
            origin: Some(path.to_path_buf()),
        })
    }

    /// Load `path` when given, otherwise build the gradient.
    pub fn resolve(path: Option<&Path>, limits: &AssetLimits) -> ReelResult<Self> {
        match path {
            Some(p) => Self::load(p, limits),
            None => Self::gradient(),
        }
    }

    /// Process-wide template, initialized once by the first caller.
    ///
    /// Later calls get the same instance. A later call naming a different path still receives
    /// the first template; the mismatch is logged.
    pub fn process_shared(path: Option<&Path>, limits: &AssetLimits) -> ReelResult<Arc<Self>> {
        let shared = SHARED.get_or_try_init(|| {
            tracing::info!(
                path = ?path,
                "initializing process background template"
            );
            Self::resolve(path, limits).map(Arc::new)
        })?;
        if shared.origin.as_deref() != path {
            tracing::warn!(
                requested = ?path,
                active = ?shared.origin,
                "background template already initialized; ignoring requested path"
            );
        }
        Ok(Arc::clone(shared))
    }

    /// Path the template was loaded from, `None` for the gradient.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Premultiplied `[r, g, b, a]` at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let (w, h) = CANVAS.as_tuple();
        if x >= w || y >= h {
            return None;
        }
        let i = ((y as usize) * (w as usize) + (x as usize)) * 4;
        let px = self.pixmap.data_as_u8_slice().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// Wrap tightly packed premultiplied RGBA8 bytes in a `vello_cpu` pixmap.
pub(crate) fn pixmap_from_premul(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::Other(anyhow::anyhow!("pixmap width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::Other(anyhow::anyhow!("pixmap height {height} exceeds u16")))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelError::Other(anyhow::anyhow!("pixmap byte len mismatch")));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/template.rs"]
mod tests;

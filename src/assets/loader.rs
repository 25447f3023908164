use crate::assets::decode::decode_image;
use crate::assets::source::Decodable;
use crate::config::AssetLimits;
use crate::foundation::error::ReelResult;
use crate::model::{ImageAsset, ImageRef};
use crate::resources::ResourceManager;

/// Validates and normalizes input images.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    limits: AssetLimits,
    resources: ResourceManager,
}

impl AssetLoader {
    pub fn new(limits: AssetLimits, resources: ResourceManager) -> Self {
        Self { limits, resources }
    }

    /// Read, decode, orient, and clamp one image.
    ///
    /// Failures are [`crate::AssetError`]s; callers decide whether to skip the image.
    #[tracing::instrument(level = "debug", skip(self, image_ref), fields(source = %image_ref.source.label()))]
    pub fn load(&self, image_ref: &ImageRef) -> ReelResult<ImageAsset> {
        let source = &image_ref.source;
        let label = source.label();
        let bytes = source.encoded_bytes(self.limits.max_input_bytes)?;
        let ext = source.extension_hint();
        let pixels = decode_image(&bytes, &label, ext.as_deref(), self.limits.max_dimension)?;
        drop(bytes);

        let lease = self.resources.lease(pixels.byte_len());
        tracing::debug!(width = pixels.width, height = pixels.height, "decoded image");
        Ok(ImageAsset {
            source: source.clone(),
            width: pixels.width,
            height: pixels.height,
            selected: image_ref.selected,
            pixels,
            _lease: lease,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

//! End-to-end orchestration: images and article text in, keyframes, previews, or an MP4 out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::fonts::FontSet;
use crate::assets::loader::AssetLoader;
use crate::assets::template::BackgroundTemplate;
use crate::config::EngineConfig;
use crate::encode::adapter::{CancelToken, EncoderAdapter};
use crate::foundation::error::{ReelResult, ValidationError};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::layout::engine::LayoutEngine;
use crate::layout::text::{ParleyTypesetter, Typesetter};
use crate::model::{ArticleContent, ImageRef, Keyframe, RenderPlan, VideoOutput};
use crate::resources::{ResourceManager, ResourceStats};
use crate::sequence;

/// Builder for [`Engine`] with optional overrides for the typesetter and template.
pub struct EngineBuilder {
    config: EngineConfig,
    typesetter: Option<Box<dyn Typesetter>>,
    template: Option<Arc<BackgroundTemplate>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            typesetter: None,
            template: None,
        }
    }

    /// Use `typesetter` instead of discovering fonts.
    pub fn with_typesetter(mut self, typesetter: Box<dyn Typesetter>) -> Self {
        self.typesetter = Some(typesetter);
        self
    }

    /// Use `template` instead of the process-wide background template.
    pub fn with_template(mut self, template: Arc<BackgroundTemplate>) -> Self {
        self.template = Some(template);
        self
    }

    pub fn build(self) -> ReelResult<Engine> {
        let config = self.config;
        config.validate()?;

        let resources = ResourceManager::new(config.resources.clone());
        let typesetter = match self.typesetter {
            Some(t) => t,
            None => Box::new(ParleyTypesetter::new(&FontSet::discover(&config.fonts)?)?),
        };
        let template = match self.template {
            Some(t) => t,
            None => BackgroundTemplate::process_shared(config.background.as_deref(), &config.assets)?,
        };
        let layout = LayoutEngine::new(config.layout.clone(), typesetter, resources.clone())?;
        let loader = AssetLoader::new(config.assets.clone(), resources.clone());
        let encoder = EncoderAdapter::new(config.encode.clone())?;

        Ok(Engine {
            config,
            loader,
            layout,
            template,
            encoder,
            resources,
        })
    }
}

/// One configured rendering engine. Each render request uses its own engine or runs
/// sequentially on a shared one.
pub struct Engine {
    config: EngineConfig,
    loader: AssetLoader,
    layout: LayoutEngine,
    template: Arc<BackgroundTemplate>,
    encoder: EncoderAdapter,
    resources: ResourceManager,
}

impl Engine {
    pub fn new(config: EngineConfig) -> ReelResult<Self> {
        EngineBuilder::new(config).build()
    }

    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn template(&self) -> &BackgroundTemplate {
        &self.template
    }

    pub fn layout_engine(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.resources.stats()
    }

    /// Compose one keyframe per selected image, in order.
    ///
    /// Images that fail to load are skipped with a warning. When none remain, a single
    /// text-only keyframe is produced, or [`ValidationError::NoContent`] when there is no text
    /// either.
    pub fn compose_keyframes(
        &mut self,
        article: &ArticleContent,
        images: &[ImageRef],
    ) -> ReelResult<Vec<Keyframe>> {
        self.compose_keyframes_with(article, images, &CancelToken::new())
    }

    #[tracing::instrument(
        skip_all,
        fields(images = images.len(), selected = images.iter().filter(|i| i.selected).count())
    )]
    fn compose_keyframes_with(
        &mut self,
        article: &ArticleContent,
        images: &[ImageRef],
        cancel: &CancelToken,
    ) -> ReelResult<Vec<Keyframe>> {
        let mut keyframes = Vec::new();
        for image_ref in images.iter().filter(|i| i.selected) {
            cancel.check()?;
            let asset = match self.loader.load(image_ref) {
                Ok(asset) => asset,
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(error = %err, "skipping image");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let kf = self.layout.compose(
                keyframes.len(),
                &self.template,
                Some(&asset),
                &article.title,
                &article.summary,
            )?;
            keyframes.push(kf);
        }

        if keyframes.is_empty() {
            if !article.has_text() {
                return Err(ValidationError::NoContent.into());
            }
            tracing::info!("no usable images; composing a text-only keyframe");
            keyframes.push(self.layout.compose(
                0,
                &self.template,
                None,
                &article.title,
                &article.summary,
            )?);
        }
        tracing::debug!(keyframes = keyframes.len(), "keyframes composed");
        Ok(keyframes)
    }

    /// Compose keyframes and write each to `out_dir` as `frame_01.png`, `frame_02.png`, ...
    pub fn preview(
        &mut self,
        article: &ArticleContent,
        images: &[ImageRef],
        out_dir: &Path,
    ) -> ReelResult<Vec<PathBuf>> {
        let keyframes = self.compose_keyframes(article, images)?;
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create preview directory '{}'", out_dir.display()))?;

        let mut paths = Vec::with_capacity(keyframes.len());
        for kf in keyframes {
            let path = out_dir.join(format!("frame_{:02}.png", kf.index + 1));
            let frame = kf.frame()?;
            let mut rgba = frame.data.clone();
            if frame.premultiplied {
                unpremultiply_rgba8_in_place(&mut rgba);
            }
            image::save_buffer_with_format(
                &path,
                &rgba,
                frame.width,
                frame.height,
                image::ExtendedColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write preview '{}'", path.display()))?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Pair keyframes with durations and fit the optional audio track.
    pub fn assemble(&self, keyframes: Vec<Keyframe>, audio: Option<&Path>) -> ReelResult<RenderPlan> {
        sequence::assemble(keyframes, audio, &self.config.audio)
    }

    /// Encode an assembled plan to `out_path`.
    pub fn encode(
        &self,
        plan: RenderPlan,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<VideoOutput> {
        self.encoder.render(plan, out_path, cancel)
    }

    /// Compose, assemble, and encode in one call.
    #[tracing::instrument(skip_all, fields(out = %out_path.display()))]
    pub fn render(
        &mut self,
        article: &ArticleContent,
        images: &[ImageRef],
        audio: Option<&Path>,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<VideoOutput> {
        let keyframes = self.compose_keyframes_with(article, images, cancel)?;
        let plan = self.assemble(keyframes, audio)?;
        let video = self.encode(plan, out_path, cancel)?;
        tracing::info!(
            duration_secs = video.duration_seconds,
            frames = video.frame_count,
            peak_bytes = self.resources.stats().peak_bytes,
            "render finished"
        );
        Ok(video)
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;

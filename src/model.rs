use std::borrow::Cow;
use std::path::PathBuf;

use crate::assets::decode::PreparedImage;
use crate::assets::source::ImageSource;
use crate::audio::pcm::AudioPcm;
use crate::foundation::core::{CANVAS, FrameRGBA};
use crate::foundation::error::ReelResult;
use crate::resources::{KeyframeRaster, RasterLease};

/// Cleaned article text handed to the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArticleContent {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
}

impl ArticleContent {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            tags: Vec::new(),
        }
    }

    /// `true` when the title or summary contains anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.title.trim().is_empty() || !self.summary.trim().is_empty()
    }

    /// Split the title at the first `separator` into main title and subtitle.
    pub fn split_title(&self, separator: char) -> (&str, Option<&str>) {
        split_title(&self.title, separator)
    }
}

/// Split `title` at the first `separator`. Both parts are trimmed; an empty subtitle is `None`.
pub fn split_title(title: &str, separator: char) -> (&str, Option<&str>) {
    match title.split_once(separator) {
        Some((main, sub)) => {
            let sub = sub.trim();
            (main.trim(), (!sub.is_empty()).then_some(sub))
        }
        None => (title.trim(), None),
    }
}

/// Caller-side reference to a candidate image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub source: ImageSource,
    /// Only selected images become keyframes.
    pub selected: bool,
}

impl ImageRef {
    pub fn selected(source: ImageSource) -> Self {
        Self {
            source,
            selected: true,
        }
    }
}

/// A validated, decoded input image.
#[derive(Debug)]
pub struct ImageAsset {
    pub source: ImageSource,
    /// Upright width after orientation and clamping.
    pub width: u32,
    pub height: u32,
    pub selected: bool,
    pub(crate) pixels: PreparedImage,
    pub(crate) _lease: RasterLease,
}

impl ImageAsset {
    pub fn pixels(&self) -> &PreparedImage {
        &self.pixels
    }
}

/// One fully composed canvas-sized still.
#[derive(Debug)]
pub struct Keyframe {
    /// 0-based position in the plan, dense.
    pub index: usize,
    /// Image the frame was built from; `None` for the text-only frame.
    pub source: Option<ImageSource>,
    pub(crate) raster: KeyframeRaster,
}

impl Keyframe {
    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Premultiplied RGBA pixels of the keyframe.
    pub fn frame(&self) -> ReelResult<Cow<'_, FrameRGBA>> {
        self.raster.frame()
    }

    pub fn is_resident(&self) -> bool {
        self.raster.is_resident()
    }
}

/// How long a keyframe stays on screen.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct FrameDuration {
    pub seconds: f64,
}

impl FrameDuration {
    pub const fn from_secs(seconds: f64) -> Self {
        Self { seconds }
    }
}

/// A keyframe paired with its on-screen duration.
#[derive(Debug)]
pub struct PlanEntry {
    pub keyframe: Keyframe,
    pub duration: FrameDuration,
}

/// Background audio already fitted to the plan's total length.
#[derive(Clone, Debug)]
pub struct PlanAudio {
    pub source_path: PathBuf,
    pub pcm: AudioPcm,
}

/// The ordered, timed keyframe sequence the encoder consumes.
#[derive(Debug, Default)]
pub struct RenderPlan {
    pub entries: Vec<PlanEntry>,
    /// `None` renders a silent video.
    pub audio: Option<PlanAudio>,
}

impl RenderPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_seconds(&self) -> f64 {
        self.entries.iter().map(|e| e.duration.seconds).sum()
    }

    pub fn durations(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.duration.seconds).collect()
    }

    pub fn audio_track_path(&self) -> Option<&std::path::Path> {
        self.audio.as_ref().map(|a| a.source_path.as_path())
    }
}

/// The finished video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoOutput {
    pub file_path: PathBuf,
    pub duration_seconds: f64,
    pub resolution: (u32, u32),
    pub frame_count: u64,
    pub has_audio: bool,
}

impl VideoOutput {
    pub(crate) fn new(file_path: PathBuf, duration_seconds: f64, frame_count: u64, has_audio: bool) -> Self {
        Self {
            file_path,
            duration_seconds,
            resolution: CANVAS.as_tuple(),
            frame_count,
            has_audio,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/model.rs"]
mod tests;

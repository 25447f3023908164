//! Engine configuration.
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs to name the values it changes.
//! Resolution order is: defaults, then the JSON file (if any), then `NEWSREEL_*` environment
//! overrides, then [`EngineConfig::validate`].

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};

/// Environment variable naming the background template path.
pub const ENV_BACKGROUND: &str = "NEWSREEL_BACKGROUND";
/// Environment variable naming the title font file.
pub const ENV_TITLE_FONT: &str = "NEWSREEL_TITLE_FONT";
/// Environment variable naming the body font file.
pub const ENV_BODY_FONT: &str = "NEWSREEL_BODY_FONT";
/// Environment variable overriding the output frame rate (integer fps).
pub const ENV_FPS: &str = "NEWSREEL_FPS";

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Background template image. `None` selects the built-in gradient.
    pub background: Option<PathBuf>,
    pub fonts: FontConfig,
    pub assets: AssetLimits,
    pub layout: LayoutConfig,
    pub encode: EncodeSettings,
    pub audio: AudioSettings,
    pub resources: ResourceLimits,
}

/// Font files for the two text roles. Unset entries are discovered on the system.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub title: Option<PathBuf>,
    pub body: Option<PathBuf>,
}

/// Limits applied by the asset loader.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssetLimits {
    /// Longest allowed side after decode; larger images are downscaled proportionally.
    pub max_dimension: u32,
    /// Largest accepted encoded input, in bytes.
    pub max_input_bytes: u64,
}

impl Default for AssetLimits {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
            max_input_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Padding of a text panel around its text block, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelPadding {
    pub top: f32,
    pub bottom: f32,
}

/// Geometry and typography of a keyframe.
///
/// Ratios are fractions of the canvas width (margins) or height (vertical anchors). Font sizes
/// and gaps are pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin_ratio: f32,
    /// Top of the title block.
    pub title_top_ratio: f32,
    /// Bottom of the summary block.
    pub summary_bottom_ratio: f32,

    pub title_size: f32,
    pub subtitle_size: f32,
    pub summary_size: f32,
    pub title_line_gap: f32,
    pub subtitle_line_gap: f32,
    pub summary_line_gap: f32,
    /// Space between the main title and the subtitle group.
    pub subtitle_offset: f32,

    pub title_max_lines: usize,
    pub subtitle_max_lines: usize,
    /// Summary line budget; overflow is cut and marked with `ellipsis`.
    pub summary_max_lines: usize,

    /// Space between the title panel and the image region.
    pub image_gap_top: f32,
    /// Space between the image region and the summary panel.
    pub image_gap_bottom: f32,

    pub panel_color: Rgba8,
    /// Fraction of a panel's height over which its top and bottom edges fade in.
    pub panel_feather_ratio: f32,
    pub title_panel_padding: PanelPadding,
    pub summary_panel_padding: PanelPadding,

    pub title_color: Rgba8,
    pub title_glow: Rgba8,
    pub subtitle_color: Rgba8,
    pub subtitle_glow: Rgba8,
    pub summary_color: Rgba8,
    pub shadow_color: Rgba8,
    pub title_shadow_offset: f32,
    pub summary_shadow_offset: f32,
    /// Offset used for the glow passes around title glyphs. `0` disables the glow.
    pub glow_radius: f32,

    pub ellipsis: String,
    /// Splits a title into main title and subtitle.
    pub subtitle_separator: char,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_ratio: 0.08,
            title_top_ratio: 0.10,
            summary_bottom_ratio: 0.90,
            title_size: 66.0,
            subtitle_size: 58.0,
            summary_size: 48.0,
            title_line_gap: 18.0,
            subtitle_line_gap: 14.0,
            summary_line_gap: 12.0,
            subtitle_offset: 12.0,
            title_max_lines: 3,
            subtitle_max_lines: 2,
            summary_max_lines: 5,
            image_gap_top: 30.0,
            image_gap_bottom: 40.0,
            panel_color: Rgba8::rgba(20, 20, 40, 220),
            panel_feather_ratio: 0.10,
            title_panel_padding: PanelPadding {
                top: 25.0,
                bottom: 40.0,
            },
            summary_panel_padding: PanelPadding {
                top: 35.0,
                bottom: 50.0,
            },
            title_color: Rgba8::rgb(255, 255, 0),
            title_glow: Rgba8::rgba(102, 126, 234, 60),
            subtitle_color: Rgba8::rgb(255, 255, 0),
            subtitle_glow: Rgba8::rgba(180, 140, 30, 60),
            summary_color: Rgba8::rgb(255, 255, 255),
            shadow_color: Rgba8::rgba(0, 0, 0, 180),
            title_shadow_offset: 3.0,
            summary_shadow_offset: 2.0,
            glow_radius: 2.0,
            ellipsis: "\u{2026}".to_string(),
            subtitle_separator: '|',
        }
    }
}

/// Video encoding settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    /// Output frame rate (integer frames per second).
    pub fps: u32,
    /// libx264 constant rate factor.
    pub crf: u8,
    /// libx264 preset name.
    pub preset: String,
    /// Replace an existing output file.
    pub overwrite: bool,
    /// Background color used to flatten any remaining alpha before encoding.
    pub flatten_rgba: Rgba8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            fps: 24,
            crf: 23,
            preset: "medium".to_string(),
            overwrite: true,
            flatten_rgba: Rgba8::rgb(0, 0, 0),
        }
    }
}

impl EncodeSettings {
    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }
}

/// Background-audio shaping.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sample_rate: u32,
    /// Playback speed of the source track (`1.1` plays 10% faster).
    pub playback_rate: f64,
    pub volume: f32,
    /// Length of the linear fade at the end of the video, `0` for none.
    pub fade_out_secs: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            playback_rate: 1.0,
            volume: 1.0,
            fade_out_secs: 0.0,
        }
    }
}

/// Bounds on keyframe memory held by a render plan.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Keyframes kept in memory; later ones are spilled to disk until encoded.
    pub max_resident_keyframes: usize,
    /// Directory for spilled keyframes. `None` uses the system temp directory.
    pub spill_dir: Option<PathBuf>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_resident_keyframes: 3,
            spill_dir: None,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::config(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a configuration from a JSON reader.
    pub fn from_reader(r: impl std::io::Read) -> ReelResult<Self> {
        serde_json::from_reader(r).map_err(|e| ReelError::config(format!("parse config JSON: {e}")))
    }

    /// Apply `NEWSREEL_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> ReelResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ReelResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_BACKGROUND) {
            self.background = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_TITLE_FONT) {
            self.fonts.title = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_BODY_FONT) {
            self.fonts.body = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_FPS) {
            self.encode.fps = v
                .trim()
                .parse()
                .map_err(|e| ReelError::config(format!("{ENV_FPS}='{v}' is not an integer: {e}")))?;
        }
        Ok(())
    }

    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> ReelResult<()> {
        let l = &self.layout;
        if !(0.0..0.5).contains(&l.margin_ratio) {
            return Err(ReelError::config("layout.margin_ratio must be in [0, 0.5)"));
        }
        if !(0.0 <= l.title_top_ratio && l.title_top_ratio < l.summary_bottom_ratio)
            || l.summary_bottom_ratio > 1.0
        {
            return Err(ReelError::config(
                "layout requires 0 <= title_top_ratio < summary_bottom_ratio <= 1",
            ));
        }
        for (name, size) in [
            ("title_size", l.title_size),
            ("subtitle_size", l.subtitle_size),
            ("summary_size", l.summary_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(ReelError::config(format!("layout.{name} must be > 0")));
            }
        }
        if l.title_max_lines == 0 || l.summary_max_lines == 0 {
            return Err(ReelError::config(
                "layout.title_max_lines and layout.summary_max_lines must be >= 1",
            ));
        }
        if !(0.0..=0.5).contains(&l.panel_feather_ratio) {
            return Err(ReelError::config(
                "layout.panel_feather_ratio must be in [0, 0.5]",
            ));
        }
        if self.assets.max_dimension == 0 || self.assets.max_input_bytes == 0 {
            return Err(ReelError::config("asset limits must be non-zero"));
        }
        self.encode.fps()?;
        if self.encode.crf > 51 {
            return Err(ReelError::config("encode.crf must be in 0..=51"));
        }
        if self.encode.preset.trim().is_empty() {
            return Err(ReelError::config("encode.preset must not be empty"));
        }
        let a = &self.audio;
        if a.sample_rate == 0 {
            return Err(ReelError::config("audio.sample_rate must be > 0"));
        }
        if !(a.playback_rate.is_finite() && a.playback_rate > 0.0) {
            return Err(ReelError::config("audio.playback_rate must be > 0"));
        }
        if !(a.volume.is_finite() && a.volume >= 0.0) {
            return Err(ReelError::config("audio.volume must be >= 0"));
        }
        if !(a.fade_out_secs.is_finite() && a.fade_out_secs >= 0.0) {
            return Err(ReelError::config("audio.fade_out_secs must be >= 0"));
        }
        if self.resources.max_resident_keyframes == 0 {
            return Err(ReelError::config(
                "resources.max_resident_keyframes must be >= 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

//! Newsreel turns a news article and its images into a short vertical MP4.
//!
//! Each selected image becomes one 1080×1920 keyframe with the article title and summary laid
//! out on a shared background template. Keyframes are timed, paired with an optional looped or
//! trimmed background track, and encoded with the system `ffmpeg`.
//!
//! - Configure an [`EngineConfig`] and build an [`Engine`]
//! - [`Engine::compose_keyframes`] or [`Engine::preview`] for stills
//! - [`Engine::render`] for the finished [`VideoOutput`]
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod config;
pub mod encode;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod resources;
pub mod sequence;
pub mod timing;

pub use crate::foundation::core::{CANVAS, Canvas, Fps, FrameIndex, FrameRGBA, Rgba8};
pub use crate::foundation::error::{
    AssetError, EncodingError, ReelError, ReelResult, ValidationError,
};

pub use crate::assets::loader::AssetLoader;
pub use crate::assets::source::{Decodable, ImageSource};
pub use crate::assets::template::BackgroundTemplate;
pub use crate::config::EngineConfig;
pub use crate::encode::adapter::{CancelToken, EncodeStats, EncoderAdapter};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{Encodable, FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::engine::{FrameLayout, LayoutEngine};
pub use crate::layout::layers::Renderable;
pub use crate::layout::text::{BlockTypesetter, ParleyTypesetter, Typesetter};
pub use crate::model::{
    ArticleContent, FrameDuration, ImageAsset, ImageRef, Keyframe, RenderPlan, VideoOutput,
};
pub use crate::pipeline::{Engine, EngineBuilder};
pub use crate::resources::{ResourceManager, ResourceStats};
pub use crate::timing::allocate;

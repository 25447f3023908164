use std::borrow::Cow;
use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
use crate::foundation::error::{EncodingError, ReelResult};
use crate::model::Keyframe;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Optional raw PCM audio muxed alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Raw interleaved `f32le` audio for sinks that mux sound.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A still that can hand the encoder its pixels.
pub trait Encodable {
    fn dimensions(&self) -> (u32, u32);

    /// Premultiplied RGBA pixels, borrowed when resident.
    fn rgba_frame(&self) -> ReelResult<Cow<'_, FrameRGBA>>;
}

impl Encodable for Keyframe {
    fn dimensions(&self) -> (u32, u32) {
        Keyframe::dimensions(self)
    }

    fn rgba_frame(&self) -> ReelResult<Cow<'_, FrameRGBA>> {
        self.frame()
    }
}

/// Consumes output frames in timeline order.
///
/// `push_frame` is called with strictly increasing [`FrameIndex`] values.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    fn end(&mut self) -> ReelResult<()>;

    /// Stop without finalizing. Called after a failed or cancelled encode.
    fn abort(&mut self) {}
}

/// A frame repeated over consecutive output indices.
#[derive(Debug, Clone, PartialEq)]
pub struct StillRun {
    pub first: FrameIndex,
    pub count: u64,
    pub frame: FrameRGBA,
}

/// In-memory sink for tests and debugging. Consecutive identical frames collapse into one run.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    runs: Vec<StillRun>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn runs(&self) -> &[StillRun] {
        &self.runs
    }

    pub fn frame_count(&self) -> u64 {
        self.runs.iter().map(|r| r.count).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.runs.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(EncodingError::codec("in-memory sink not started").into());
        }
        if let Some(last) = self.runs.last_mut() {
            if idx.0 != last.first.0 + last.count {
                return Err(EncodingError::codec(format!(
                    "out-of-order frame index {}, expected {}",
                    idx.0,
                    last.first.0 + last.count
                ))
                .into());
            }
            if last.frame == *frame {
                last.count += 1;
                return Ok(());
            }
        }
        self.runs.push(StillRun {
            first: idx,
            count: 1,
            frame: frame.clone(),
        });
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

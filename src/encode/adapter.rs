use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::fit::write_f32le_temp;
use crate::config::EncodeSettings;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir};
use crate::encode::sink::{AudioInputConfig, Encodable, FrameSink, SinkConfig};
use crate::foundation::core::{CANVAS, Fps, FrameIndex};
use crate::foundation::error::{EncodingError, ReelError, ReelResult};
use crate::model::{RenderPlan, VideoOutput};

/// Shared flag a caller sets to stop a render between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn check(&self) -> ReelResult<()> {
        if self.is_cancelled() {
            return Err(EncodingError::Cancelled.into());
        }
        Ok(())
    }
}

/// Counters from one encode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EncodeStats {
    pub keyframes: usize,
    pub frames_written: u64,
    pub duration_seconds: f64,
}

/// Output frame count of each keyframe.
///
/// Boundaries are rounded on the cumulative timeline, so the per-keyframe counts always sum to
/// `round(total * fps)` regardless of how the durations split.
pub fn frame_spans(durations: &[f64], fps: Fps) -> Vec<u64> {
    let mut spans = Vec::with_capacity(durations.len());
    let mut start = 0.0;
    for d in durations {
        let end = start + d;
        spans.push(fps.secs_to_frames_round(end) - fps.secs_to_frames_round(start));
        start = end;
    }
    spans
}

/// Turns a [`RenderPlan`] into an MP4 file.
#[derive(Clone, Debug)]
pub struct EncoderAdapter {
    settings: EncodeSettings,
    fps: Fps,
}

impl EncoderAdapter {
    pub fn new(settings: EncodeSettings) -> ReelResult<Self> {
        let fps = settings.fps()?;
        Ok(Self { settings, fps })
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Stream every keyframe of `plan` into `sink`, holding each for its duration.
    ///
    /// Each keyframe is released right after its last frame is written. On failure the sink is
    /// aborted and the remaining keyframes are dropped.
    pub fn encode_into(
        &self,
        plan: RenderPlan,
        sink: &mut dyn FrameSink,
        audio: Option<AudioInputConfig>,
        cancel: &CancelToken,
    ) -> ReelResult<EncodeStats> {
        if plan.is_empty() {
            return Err(EncodingError::EmptyPlan.into());
        }
        let spans = frame_spans(&plan.durations(), self.fps);
        let duration_seconds = plan.total_seconds();
        let keyframes = plan.len();

        let (width, height) = CANVAS.as_tuple();
        sink.begin(SinkConfig {
            width,
            height,
            fps: self.fps,
            audio,
        })?;

        let result = write_entries(plan, &spans, sink, cancel);
        match result {
            Ok(frames_written) => {
                sink.end()?;
                Ok(EncodeStats {
                    keyframes,
                    frames_written,
                    duration_seconds,
                })
            }
            Err(err) => {
                sink.abort();
                Err(err)
            }
        }
    }

    /// Encode `plan` to `out_path`.
    ///
    /// The video is written to a hidden temporary file next to `out_path` and renamed into place
    /// only after ffmpeg finishes; any failure or cancellation leaves no file behind.
    #[tracing::instrument(skip(self, plan, cancel), fields(out = %out_path.display(), keyframes = plan.len()))]
    pub fn render(
        &self,
        plan: RenderPlan,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<VideoOutput> {
        if plan.is_empty() {
            return Err(EncodingError::EmptyPlan.into());
        }
        cancel.check()?;
        if !self.settings.overwrite && out_path.exists() {
            return Err(EncodingError::io(out_path, "file already exists").into());
        }
        ensure_parent_dir(out_path)?;
        let dir = out_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let staging = tempfile::Builder::new()
            .prefix(".newsreel-")
            .suffix(".mp4")
            .tempfile_in(dir)
            .map_err(|e| EncodingError::io(out_path, e))?
            .into_temp_path();

        let audio_file = match &plan.audio {
            Some(a) => Some((
                write_f32le_temp(&a.pcm, dir).map_err(|e| EncodingError::io(dir, e))?,
                a.pcm.sample_rate,
                a.pcm.channels,
            )),
            None => None,
        };
        let audio = audio_file
            .as_ref()
            .map(|(path, sample_rate, channels)| AudioInputConfig {
                path: path.to_path_buf(),
                sample_rate: *sample_rate,
                channels: *channels,
            });
        let has_audio = audio.is_some();

        tracing::info!(
            keyframes = plan.len(),
            duration_secs = plan.total_seconds(),
            has_audio,
            "encoding video"
        );
        let mut opts = FfmpegSinkOpts::from_settings(staging.to_path_buf(), &self.settings);
        opts.overwrite = true;
        let mut sink = FfmpegSink::new(opts);
        let stats = self.encode_into(plan, &mut sink, audio, cancel)?;
        drop(sink);
        drop(audio_file);

        let persisted = if self.settings.overwrite {
            staging.persist(out_path)
        } else {
            staging.persist_noclobber(out_path)
        };
        persisted.map_err(|e| EncodingError::io(out_path, e.error))?;

        tracing::info!(
            out = %out_path.display(),
            frames = stats.frames_written,
            duration_secs = stats.duration_seconds,
            "video written"
        );
        Ok(VideoOutput::new(
            out_path.to_path_buf(),
            stats.duration_seconds,
            stats.frames_written,
            has_audio,
        ))
    }
}

fn write_entries(
    plan: RenderPlan,
    spans: &[u64],
    sink: &mut dyn FrameSink,
    cancel: &CancelToken,
) -> ReelResult<u64> {
    let mut next = 0u64;
    for (entry, &count) in plan.entries.into_iter().zip(spans) {
        cancel.check()?;
        let frame = entry.keyframe.rgba_frame()?;
        if frame.width != CANVAS.width || frame.height != CANVAS.height {
            return Err(ReelError::Encoding(EncodingError::codec(format!(
                "keyframe {} is {}x{}, expected {}x{}",
                entry.keyframe.index, frame.width, frame.height, CANVAS.width, CANVAS.height
            ))));
        }
        for _ in 0..count {
            cancel.check()?;
            sink.push_frame(FrameIndex(next), &frame)?;
            next += 1;
        }
        tracing::debug!(keyframe = entry.keyframe.index, frames = count, "keyframe written");
    }
    Ok(next)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/adapter.rs"]
mod tests;

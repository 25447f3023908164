//! Pairs keyframes with their durations and fits the background track into a render plan.

use std::path::Path;

use crate::audio::fit::fit_to_duration;
use crate::audio::pcm::decode_audio_f32_stereo;
use crate::config::AudioSettings;
use crate::foundation::error::{ReelResult, ValidationError};
use crate::model::{FrameDuration, Keyframe, PlanAudio, PlanEntry, RenderPlan};
use crate::timing::allocate;

/// Build the render plan for `keyframes` in order.
///
/// A missing or undecodable audio file yields a silent plan. Zero keyframes yield an empty plan;
/// the encoder rejects it.
#[tracing::instrument(
    skip(keyframes, audio_path, settings),
    fields(keyframes = keyframes.len(), audio = ?audio_path)
)]
pub fn assemble(
    keyframes: Vec<Keyframe>,
    audio_path: Option<&Path>,
    settings: &AudioSettings,
) -> ReelResult<RenderPlan> {
    if keyframes.is_empty() {
        tracing::warn!("assembling a plan with no keyframes");
        return Ok(RenderPlan::default());
    }

    let durations = allocate(keyframes.len())?;
    let entries = pair(keyframes, durations)?;
    let total: f64 = entries.iter().map(|e| e.duration.seconds).sum();
    let audio = audio_path.and_then(|p| load_fitted_audio(p, total, settings));

    tracing::debug!(
        total_secs = total,
        has_audio = audio.is_some(),
        "render plan assembled"
    );
    Ok(RenderPlan { entries, audio })
}

/// Zip keyframes with durations, refusing to drop either side.
pub fn pair(keyframes: Vec<Keyframe>, durations: Vec<FrameDuration>) -> ReelResult<Vec<PlanEntry>> {
    if keyframes.len() != durations.len() {
        return Err(ValidationError::MismatchedLengths {
            keyframes: keyframes.len(),
            durations: durations.len(),
        }
        .into());
    }
    Ok(keyframes
        .into_iter()
        .zip(durations)
        .map(|(keyframe, duration)| PlanEntry { keyframe, duration })
        .collect())
}

/// Decode `path` and fit it to `total_secs`, or `None` (with a warning) when that is not
/// possible.
pub fn load_fitted_audio(path: &Path, total_secs: f64, settings: &AudioSettings) -> Option<PlanAudio> {
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "audio file not found; rendering silent video");
        return None;
    }
    let pcm = match decode_audio_f32_stereo(path, settings.sample_rate) {
        Ok(pcm) => pcm,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "audio decode failed; rendering silent video");
            return None;
        }
    };

    let played_secs = pcm.duration_secs() / settings.playback_rate;
    let Some(fitted) = fit_to_duration(&pcm, total_secs, settings) else {
        tracing::warn!(path = %path.display(), "audio file has no samples; rendering silent video");
        return None;
    };
    if played_secs < total_secs {
        tracing::debug!(
            source_secs = played_secs,
            total_secs,
            loops = (total_secs / played_secs).ceil(),
            "looping audio to cover the video"
        );
    } else {
        tracing::debug!(source_secs = played_secs, total_secs, "trimming audio to the video length");
    }

    Some(PlanAudio {
        source_path: path.to_path_buf(),
        pcm: fitted,
    })
}

#[cfg(test)]
#[path = "../tests/unit/sequence.rs"]
mod tests;

//! Fitting a background track to the video length.

use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::audio::pcm::AudioPcm;
use crate::config::AudioSettings;
use crate::foundation::error::ReelResult;

/// Resample `src` into exactly `round(total_secs * settings.sample_rate)` stereo frames.
///
/// The source is read at `settings.playback_rate` and wraps around seamlessly when it runs out,
/// so a short track loops with no gap and a long one is cut at the video end. Volume and the
/// optional fade-out are applied last. Returns `None` when the source holds no samples.
pub fn fit_to_duration(src: &AudioPcm, total_secs: f64, settings: &AudioSettings) -> Option<AudioPcm> {
    let src_frames = src.frames();
    if src_frames == 0 || src.sample_rate == 0 || !(total_secs.is_finite() && total_secs > 0.0) {
        return None;
    }
    let out_rate = settings.sample_rate;
    let out_frames = (total_secs * f64::from(out_rate)).round() as usize;
    let step = settings.playback_rate * f64::from(src.sample_rate) / f64::from(out_rate);
    let fade_frames = (settings.fade_out_secs * f64::from(out_rate)).round() as usize;
    let channels = usize::from(src.channels);
    let samples = &src.interleaved_f32;

    let mut out = Vec::with_capacity(out_frames * 2);
    for i in 0..out_frames {
        let pos = (i as f64 * step) % src_frames as f64;
        let f0 = pos.floor() as usize % src_frames;
        let f1 = (f0 + 1) % src_frames;
        let frac = (pos - pos.floor()) as f32;

        let (l, r) = if channels == 1 {
            let v = lerp(samples[f0], samples[f1], frac);
            (v, v)
        } else {
            let (i0, i1) = (f0 * channels, f1 * channels);
            (
                lerp(samples[i0], samples[i1], frac),
                lerp(samples[i0 + 1], samples[i1 + 1], frac),
            )
        };

        let gain = settings.volume * fade_out_gain(i, out_frames, fade_frames);
        out.push((l * gain).clamp(-1.0, 1.0));
        out.push((r * gain).clamp(-1.0, 1.0));
    }

    Some(AudioPcm {
        sample_rate: out_rate,
        channels: 2,
        interleaved_f32: out,
    })
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn fade_out_gain(i: usize, total: usize, fade: usize) -> f32 {
    if fade == 0 {
        return 1.0;
    }
    let remaining = total.saturating_sub(i + 1);
    (remaining as f32 / fade as f32).min(1.0)
}

/// Write `pcm` as raw `f32le` into a new temporary file inside `dir`.
///
/// The file is removed when the returned path is dropped.
pub fn write_f32le_temp(pcm: &AudioPcm, dir: &Path) -> ReelResult<tempfile::TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix(".newsreel-audio-")
        .suffix(".f32le")
        .tempfile_in(dir)
        .with_context(|| format!("create audio temp file in '{}'", dir.display()))?;
    file.write_all(&pcm.to_f32le_bytes())
        .and_then(|_| file.flush())
        .context("write fitted audio")?;
    Ok(file.into_temp_path())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/fit.rs"]
mod tests;

use std::path::Path;
use std::process::Command;

use crate::foundation::error::{ReelError, ReelResult};

/// Interleaved 32-bit float PCM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn silence(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved_f32: vec![0.0; frames * usize::from(channels)],
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            c => self.interleaved_f32.len() / usize::from(c),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Little-endian `f32le` bytes, the layout ffmpeg reads with `-f f32le`.
    pub fn to_f32le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.interleaved_f32.len() * 4);
        for s in &self.interleaved_f32 {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        bytes
    }
}

/// Decode any ffmpeg-readable audio file to stereo f32 PCM at `sample_rate`.
///
/// A file without an audio stream decodes to empty PCM.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
    let rate = sample_rate.to_string();
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn", "-f", "f32le", "-acodec", "pcm_f32le", "-ac", "2", "-ar", &rate, "pipe:1",
        ])
        .output()
        .map_err(|e| {
            ReelError::Other(anyhow::anyhow!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
        {
            return Ok(AudioPcm::silence(sample_rate, 2, 0));
        }
        return Err(ReelError::Other(anyhow::anyhow!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    parse_f32le(&out.stdout, sample_rate, 2)
}

pub(crate) fn parse_f32le(bytes: &[u8], sample_rate: u32, channels: u16) -> ReelResult<AudioPcm> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ReelError::Other(anyhow::anyhow!(
            "decoded audio byte length is not aligned to f32 samples"
        )));
    }
    let interleaved_f32 = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;

use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::config::EncodeSettings;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRGBA};
use crate::foundation::error::{EncodingError, ReelResult};
use crate::foundation::math::mul_div255_u16;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// Color the premultiplied frames are flattened over (straight RGBA8).
    pub bg_rgba: [u8; 4],
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            crf: 23,
            preset: "medium".to_string(),
        }
    }

    pub fn from_settings(out_path: impl Into<PathBuf>, settings: &EncodeSettings) -> Self {
        let bg = settings.flatten_rgba;
        Self {
            out_path: out_path.into(),
            overwrite: settings.overwrite,
            bg_rgba: [bg.r, bg.g, bg.b, bg.a],
            crf: settings.crf,
            preset: settings.preset.clone(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Audio is optional and provided through [`SinkConfig::audio`]. Dropping a sink that was not
/// ended kills the child process.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> ReelResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // ffmpeg does not understand premultiplied alpha; frames are flattened in push_frame.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let crf = self.opts.crf.to_string();
        let video_args = [
            "-c:v",
            "libx264",
            "-preset",
            self.opts.preset.as_str(),
            "-crf",
            crf.as_str(),
            "-pix_fmt",
            "yuv420p",
        ];

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(EncodingError::codec(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                )
                .into());
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-map", "0:v:0", "-map", "1:a:0"])
            .args(video_args)
            .args(["-c:a", "aac", "-shortest", "-movflags", "+faststart"]);
        } else {
            cmd.arg("-an")
                .args(video_args)
                .args(["-movflags", "+faststart"]);
        }
        cmd.args(["-f", "mp4"]).arg(&self.opts.out_path);
        Ok(cmd)
    }

    fn join_stderr(&mut self) -> String {
        let bytes = match self.stderr_drain.take().map(|h| h.join()) {
            Some(Ok(Ok(bytes))) => bytes,
            _ => Vec::new(),
        };
        String::from_utf8_lossy(&bytes).trim().to_string()
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(EncodingError::codec("ffmpeg sink width/height must be non-zero").into());
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(EncodingError::codec(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            )
            .into());
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(EncodingError::io(&self.opts.out_path, "file already exists").into());
        }
        if !is_ffmpeg_on_path() {
            return Err(EncodingError::codec(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            )
            .into());
        }

        let mut child = self.command(&cfg)?.spawn().map_err(|e| {
            EncodingError::codec(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EncodingError::codec("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EncodingError::codec("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            audio = cfg.audio.is_some(),
            "spawned ffmpeg"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| EncodingError::codec("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(EncodingError::codec("ffmpeg sink received out-of-order frame index").into());
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(EncodingError::codec(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            ))
            .into());
        }
        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(EncodingError::codec("ffmpeg sink is already finalized").into());
        };
        if let Err(e) = stdin.write_all(&self.scratch) {
            // A broken pipe means ffmpeg exited; its stderr says why.
            self.abort();
            let stderr = self.join_stderr();
            return Err(EncodingError::codec(format!(
                "failed to write frame to ffmpeg stdin: {e}; {stderr}"
            ))
            .into());
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| EncodingError::codec("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| EncodingError::codec(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = self.join_stderr();
        self.cfg = None;

        if !status.success() {
            return Err(EncodingError::codec(format!("ffmpeg exited with status {status}: {stderr}")).into());
        }
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("killed ffmpeg");
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // Rawvideo input takes its rate from `-r` placed before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Composite RGBA8 over an opaque `bg_rgba`, writing fully opaque pixels into `dst`.
pub fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(EncodingError::codec("flatten expects equal-length rgba8 buffers").into());
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| EncodingError::io(parent, format!("create directory: {e}")))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

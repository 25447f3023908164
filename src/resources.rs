//! Scoped accounting and release of raster buffers.
//!
//! Every decoded image and composed keyframe is paired with a [`RasterLease`]. Dropping the
//! owner drops the lease, which returns its bytes to the [`ResourceManager`]. Keyframes beyond
//! the resident budget are spilled to temporary files so that a long plan holds at most
//! `max_resident_keyframes` frames in memory.

use std::borrow::Cow;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use anyhow::Context as _;

use crate::config::ResourceLimits;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::ReelResult;

#[derive(Debug, Default)]
struct Counters {
    live_bytes: AtomicU64,
    peak_bytes: AtomicU64,
    live_leases: AtomicUsize,
    resident_keyframes: AtomicUsize,
    peak_resident_keyframes: AtomicUsize,
    spilled_keyframes: AtomicUsize,
}

/// Snapshot of the manager's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Bytes currently held by outstanding leases.
    pub live_bytes: u64,
    /// Highest `live_bytes` observed.
    pub peak_bytes: u64,
    pub live_leases: usize,
    pub resident_keyframes: usize,
    pub peak_resident_keyframes: usize,
    /// Total keyframes written to spill files.
    pub spilled_keyframes: usize,
}

/// Shared handle tracking buffer lifetimes for one render.
#[derive(Clone, Debug)]
pub struct ResourceManager {
    limits: ResourceLimits,
    counters: Arc<Counters>,
}

impl ResourceManager {
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Account for a buffer of `bytes`; the bytes are returned when the lease drops.
    pub fn lease(&self, bytes: usize) -> RasterLease {
        let bytes = bytes as u64;
        let c = &self.counters;
        let live = c.live_bytes.fetch_add(bytes, Ordering::AcqRel) + bytes;
        c.peak_bytes.fetch_max(live, Ordering::AcqRel);
        c.live_leases.fetch_add(1, Ordering::AcqRel);
        RasterLease {
            counters: Arc::clone(&self.counters),
            bytes,
            resident_slot: false,
        }
    }

    /// Take ownership of a composed frame, keeping it in memory while the resident budget
    /// allows and spilling it to a temporary file otherwise.
    pub fn admit_keyframe(&self, frame: FrameRGBA) -> ReelResult<KeyframeRaster> {
        let c = &self.counters;
        let claimed = c
            .resident_keyframes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.limits.max_resident_keyframes).then_some(n + 1)
            })
            .is_ok();

        if claimed {
            let resident = c.resident_keyframes.load(Ordering::Acquire);
            c.peak_resident_keyframes
                .fetch_max(resident, Ordering::AcqRel);
            let mut lease = self.lease(frame.byte_len());
            lease.resident_slot = true;
            return Ok(KeyframeRaster::Resident { frame, lease });
        }

        let dir = self
            .limits
            .spill_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create spill directory '{}'", dir.display()))?;
        let mut file = tempfile::Builder::new()
            .prefix(".newsreel-kf-")
            .suffix(".rgba")
            .tempfile_in(&dir)
            .with_context(|| format!("create spill file in '{}'", dir.display()))?;
        file.write_all(&frame.data)
            .and_then(|_| file.flush())
            .context("write spilled keyframe")?;
        c.spilled_keyframes.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(bytes = frame.data.len(), "spilled keyframe to disk");

        Ok(KeyframeRaster::Spilled {
            file: file.into_temp_path(),
            width: frame.width,
            height: frame.height,
        })
    }

    pub fn stats(&self) -> ResourceStats {
        let c = &self.counters;
        ResourceStats {
            live_bytes: c.live_bytes.load(Ordering::Acquire),
            peak_bytes: c.peak_bytes.load(Ordering::Acquire),
            live_leases: c.live_leases.load(Ordering::Acquire),
            resident_keyframes: c.resident_keyframes.load(Ordering::Acquire),
            peak_resident_keyframes: c.peak_resident_keyframes.load(Ordering::Acquire),
            spilled_keyframes: c.spilled_keyframes.load(Ordering::Acquire),
        }
    }
}

/// Guard returning accounted bytes (and a resident keyframe slot) on drop.
#[derive(Debug)]
pub struct RasterLease {
    counters: Arc<Counters>,
    bytes: u64,
    resident_slot: bool,
}

impl RasterLease {
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Drop for RasterLease {
    fn drop(&mut self) {
        self.counters
            .live_bytes
            .fetch_sub(self.bytes, Ordering::AcqRel);
        self.counters.live_leases.fetch_sub(1, Ordering::AcqRel);
        if self.resident_slot {
            self.counters
                .resident_keyframes
                .fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Storage of one composed keyframe.
///
/// Spill files are deleted when the raster is dropped.
#[derive(Debug)]
pub enum KeyframeRaster {
    Resident {
        frame: FrameRGBA,
        lease: RasterLease,
    },
    Spilled {
        file: tempfile::TempPath,
        width: u32,
        height: u32,
    },
}

impl KeyframeRaster {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Resident { frame, .. } => (frame.width, frame.height),
            Self::Spilled { width, height, .. } => (*width, *height),
        }
    }

    pub fn is_resident(&self) -> bool {
        matches!(self, Self::Resident { .. })
    }

    /// Borrow the resident frame or read a spilled one back from disk.
    pub fn frame(&self) -> ReelResult<Cow<'_, FrameRGBA>> {
        match self {
            Self::Resident { frame, .. } => Ok(Cow::Borrowed(frame)),
            Self::Spilled {
                file,
                width,
                height,
            } => {
                let path: PathBuf = file.to_path_buf();
                let data = std::fs::read(&path)
                    .with_context(|| format!("read spilled keyframe '{}'", path.display()))?;
                let expected = (*width as usize) * (*height as usize) * 4;
                if data.len() != expected {
                    return Err(anyhow::anyhow!(
                        "spilled keyframe '{}' has {} bytes, expected {expected}",
                        path.display(),
                        data.len()
                    )
                    .into());
                }
                Ok(Cow::Owned(FrameRGBA {
                    width: *width,
                    height: *height,
                    data,
                    premultiplied: true,
                }))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/resources.rs"]
mod tests;

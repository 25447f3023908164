//! Turning a render plan into frames and an MP4 file.

/// Plan-to-video driver: frame spans, atomic output, cancellation.
pub mod adapter;
/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;

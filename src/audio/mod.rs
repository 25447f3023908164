//! Background audio: ffmpeg decoding and fitting to the video length.

pub mod fit;
pub mod pcm;

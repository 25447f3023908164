//! Keyframe composition: geometry, word wrapping, typesetting, and layer rasterization.

pub mod engine;
pub mod layers;
pub mod text;
pub mod wrap;

//! Asset loading: image sources, decoding, the background template, and fonts.

pub mod decode;
pub mod fonts;
pub mod loader;
pub mod source;
pub mod template;

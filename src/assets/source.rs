use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{AssetError, ReelResult};

/// An encoded image that can be handed to the decoder.
pub trait Decodable {
    /// Human-readable name used in diagnostics and errors.
    fn label(&self) -> String;

    /// Encoded bytes, refusing inputs larger than `max_bytes` with [`AssetError::TooLarge`].
    fn encoded_bytes(&self, max_bytes: u64) -> ReelResult<Cow<'_, [u8]>>;

    /// Lowercase file extension, when the source has one.
    fn extension_hint(&self) -> Option<String> {
        None
    }
}

/// Where an input image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes { label: String, bytes: Arc<[u8]> },
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            Self::Bytes { .. } => None,
        }
    }
}

impl Decodable for ImageSource {
    fn label(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes { label, .. } => label.clone(),
        }
    }

    fn encoded_bytes(&self, max_bytes: u64) -> ReelResult<Cow<'_, [u8]>> {
        let bytes = match self {
            Self::Path(p) => {
                let meta = std::fs::metadata(p)
                    .map_err(|e| AssetError::corrupt(self.label(), format!("cannot stat: {e}")))?;
                if meta.len() > max_bytes {
                    return Err(AssetError::too_large(
                        self.label(),
                        format!("{} bytes exceeds limit of {max_bytes}", meta.len()),
                    )
                    .into());
                }
                let bytes = std::fs::read(p)
                    .map_err(|e| AssetError::corrupt(self.label(), format!("cannot read: {e}")))?;
                Cow::Owned(bytes)
            }
            Self::Bytes { bytes, .. } => {
                if bytes.len() as u64 > max_bytes {
                    return Err(AssetError::too_large(
                        self.label(),
                        format!("{} bytes exceeds limit of {max_bytes}", bytes.len()),
                    )
                    .into());
                }
                Cow::Borrowed(&bytes[..])
            }
        };
        if bytes.is_empty() {
            return Err(AssetError::corrupt(self.label(), "zero-byte input").into());
        }
        Ok(bytes)
    }

    fn extension_hint(&self) -> Option<String> {
        let name = match self {
            Self::Path(p) => p.extension()?.to_str()?.to_string(),
            Self::Bytes { label, .. } => Path::new(label).extension()?.to_str()?.to_string(),
        };
        Some(name.to_ascii_lowercase())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;

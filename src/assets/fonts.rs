use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::config::FontConfig;
use crate::foundation::error::{ReelError, ReelResult};

/// Bold, CJK-capable faces first; the title role prefers these.
const TITLE_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/msyhbd.ttc",
    "C:/Windows/Fonts/simhei.ttf",
    "/System/Library/Fonts/PingFang.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
];

const BODY_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/msyh.ttc",
    "C:/Windows/Fonts/simhei.ttf",
    "/System/Library/Fonts/PingFang.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Font file loaded into memory.
#[derive(Clone)]
pub struct FontFile {
    pub path: PathBuf,
    pub bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFile")
            .field("path", &self.path)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl FontFile {
    pub fn read(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(ReelError::config(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            bytes: Arc::new(bytes),
        })
    }
}

/// The faces used for the title and body roles.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub title: FontFile,
    pub body: FontFile,
}

impl FontSet {
    /// Resolve fonts from configuration, falling back to well-known system locations.
    ///
    /// A configured path that cannot be read is an error; discovery only fills unset roles. When
    /// only one role resolves, it is used for both.
    pub fn discover(cfg: &FontConfig) -> ReelResult<Self> {
        let title = match &cfg.title {
            Some(p) => Some(FontFile::read(p)?),
            None => first_existing(TITLE_CANDIDATES),
        };
        let body = match &cfg.body {
            Some(p) => Some(FontFile::read(p)?),
            None => first_existing(BODY_CANDIDATES),
        };

        let set = match (title, body) {
            (Some(title), Some(body)) => Self { title, body },
            (Some(one), None) | (None, Some(one)) => Self {
                title: one.clone(),
                body: one,
            },
            (None, None) => {
                return Err(ReelError::config(
                    "no usable font found; set fonts.title / fonts.body \
                     (or NEWSREEL_TITLE_FONT / NEWSREEL_BODY_FONT)",
                ));
            }
        };
        tracing::debug!(
            title = %set.title.path.display(),
            body = %set.body.path.display(),
            "resolved fonts"
        );
        Ok(set)
    }
}

fn first_existing(candidates: &[&str]) -> Option<FontFile> {
    candidates
        .iter()
        .map(Path::new)
        .filter(|p| p.is_file())
        .find_map(|p| FontFile::read(p).ok())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;

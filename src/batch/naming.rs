use std::path::{Path, PathBuf};

use crate::batch::config::BatchConfig;
use crate::batch::unit::TileCoord;

/// Deterministic output file names for whole images and tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputNaming {
    width: u32,
    height: u32,
    quality: u32,
    with_dimensions: bool,
    with_quality: bool,
}

impl OutputNaming {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            // The user's quality, not the low-memory multiple.
            quality: config.quality,
            with_dimensions: config.dimensions_in_filename,
            with_quality: config.quality_in_filename,
        }
    }

    /// `<flame path without extension>[-WxH][-qQ][.IIJJ].png`
    pub fn image_path(&self, flame_path: &Path, tile: Option<TileCoord>) -> PathBuf {
        let mut name = flame_path.with_extension("").into_os_string();
        if self.with_dimensions {
            name.push(format!("-{}x{}", self.width, self.height));
        }
        if self.with_quality {
            name.push(format!("-q{}", self.quality));
        }
        if let Some(t) = tile {
            name.push(format!(".{:02}{:02}", t.ix(), t.iy()));
        }
        name.push(".png");
        PathBuf::from(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/naming.rs"]
mod tests;

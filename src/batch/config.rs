use crate::foundation::error::{FlameError, FlameResult};

/// Tiles per axis in low-memory mode.
pub const GRID: u8 = 8;

/// Settings shared by every unit of a batch.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchConfig {
    /// Logical output width in pixels.
    pub width: u32,
    /// Logical output height in pixels.
    pub height: u32,
    /// Requested sample density, before any low-memory scaling.
    pub quality: u32,
    #[serde(default)]
    pub hdr: bool,
    #[serde(default)]
    pub intensity_map: bool,
    #[serde(default)]
    pub dimensions_in_filename: bool,
    #[serde(default)]
    pub quality_in_filename: bool,
    #[serde(default)]
    pub overwrite: bool,
    /// Render every job as an 8x8 grid of tiles and reassemble.
    #[serde(default)]
    pub low_memory: bool,
    /// Keep tile images after a successful reassembly.
    #[serde(default)]
    pub keep_tiles: bool,
}

impl BatchConfig {
    pub fn new(width: u32, height: u32, quality: u32) -> Self {
        Self {
            width,
            height,
            quality,
            hdr: false,
            intensity_map: false,
            dimensions_in_filename: false,
            quality_in_filename: false,
            overwrite: false,
            low_memory: false,
            keep_tiles: false,
        }
    }

    pub fn validate(&self) -> FlameResult<()> {
        if self.width == 0 {
            return Err(FlameError::configuration("width must be positive"));
        }
        if self.height == 0 {
            return Err(FlameError::configuration("height must be positive"));
        }
        if self.quality == 0 {
            return Err(FlameError::configuration("quality must be positive"));
        }
        let grid = u32::from(GRID);
        if self.low_memory && (self.width % grid != 0 || self.height % grid != 0) {
            return Err(FlameError::configuration(format!(
                "low-memory mode needs width and height to be multiples of {grid} (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Quality handed to the executor; multiplied by the grid size in low-memory mode.
    pub fn effective_quality(&self) -> u32 {
        if self.low_memory {
            self.quality.saturating_mul(u32::from(GRID))
        } else {
            self.quality
        }
    }
}

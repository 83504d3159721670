use std::fmt;
use std::path::PathBuf;

use crate::batch::config::GRID;
use crate::flame::model::Flame;
use crate::foundation::core::Canvas;

/// Grid position of one tile, both axes in `0..8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    ix: u8,
    iy: u8,
}

impl TileCoord {
    /// `None` unless both indices are inside the grid.
    pub fn new(ix: u8, iy: u8) -> Option<Self> {
        (ix < GRID && iy < GRID).then_some(Self { ix, iy })
    }

    pub fn ix(self) -> u8 {
        self.ix
    }

    pub fn iy(self) -> u8 {
        self.iy
    }

    /// Every tile in split order: `ix` outer, `iy` inner.
    pub fn all() -> impl Iterator<Item = TileCoord> {
        (0..GRID).flat_map(|ix| (0..GRID).map(move |iy| TileCoord { ix, iy }))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ix, self.iy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Whole logical image. Split into tiles when low-memory mode is on.
    Whole,
    Tile(TileCoord),
    /// Composite all tiles of the job into the final image.
    Reassemble,
}

/// Grid pair reserved for the reassembly marker.
pub const REASSEMBLE_GRID: (u8, u8) = (GRID, GRID);

/// One piece of queued work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderUnit {
    pub flame_path: PathBuf,
    pub kind: UnitKind,
    /// Target pixel size of this unit.
    pub width: u32,
    pub height: u32,
    pub quality: u32,
}

impl RenderUnit {
    pub fn whole(flame_path: PathBuf, width: u32, height: u32, quality: u32) -> Self {
        Self {
            flame_path,
            kind: UnitKind::Whole,
            width,
            height,
            quality,
        }
    }

    /// Grid pair: tile indices for a tile, `(8, 8)` for reassembly, none for a whole image.
    pub fn grid(&self) -> Option<(u8, u8)> {
        match self.kind {
            UnitKind::Whole => None,
            UnitKind::Tile(t) => Some((t.ix, t.iy)),
            UnitKind::Reassemble => Some(REASSEMBLE_GRID),
        }
    }

    /// Job name used in logs and errors.
    pub fn job_name(&self) -> String {
        self.flame_path.display().to_string()
    }

    pub fn label(&self) -> String {
        match self.kind {
            UnitKind::Tile(t) => format!("{}[{t}]", self.flame_path.display()),
            _ => self.job_name(),
        }
    }
}

/// Camera framing of one tile, derived from the flame's own camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGeometry {
    /// Tile size in pixels.
    pub width: u32,
    pub height: u32,
    pub zoom_scale: f64,
    /// Flame-space extent of one tile along each axis.
    pub offset_x: f64,
    pub offset_y: f64,
    pub centre_x: f64,
    pub centre_y: f64,
}

impl TileGeometry {
    /// Tiles sit on a regular grid centred on the original camera centre.
    ///
    /// The per-tile offset is one tile's pixel extent over the flame's
    /// un-multiplied pixel scale, shifted by `index - 3.5` on each axis.
    pub fn compute(flame: &Flame, logical: Canvas, tile: TileCoord) -> Self {
        let grid = f64::from(GRID);
        let half = (grid - 1.0) * 0.5;
        let scale = flame.pixels_per_unit * flame.cam_zoom;
        let offset_x = f64::from(flame.width) / grid / scale;
        let offset_y = f64::from(flame.height) / grid / scale;
        Self {
            width: logical.width / u32::from(GRID),
            height: logical.height / u32::from(GRID),
            zoom_scale: grid,
            offset_x,
            offset_y,
            centre_x: flame.centre_x + offset_x * (f64::from(tile.ix) - half),
            centre_y: flame.centre_y + offset_y * (f64::from(tile.iy) - half),
        }
    }

    /// Reframe `flame` (a private copy) onto this tile.
    pub fn apply(&self, flame: &mut Flame) {
        flame.cam_zoom *= self.zoom_scale;
        flame.centre_x = self.centre_x;
        flame.centre_y = self.centre_y;
    }

    /// Pixel offset of this tile inside the logical image.
    pub fn pixel_origin(tile: TileCoord, logical: Canvas) -> (u32, u32) {
        let grid = u32::from(GRID);
        (
            u32::from(tile.ix) * (logical.width / grid),
            u32::from(tile.iy) * (logical.height / grid),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/unit.rs"]
mod tests;

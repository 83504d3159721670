//! Batch rendering: a queue of flame jobs, optionally split into tiles.
//!
//! In low-memory mode each job becomes 64 tile units plus one reassembly
//! unit. Tiles are rendered one at a time at 1/8 of the logical size with a
//! remapped camera, written to disk, then composited back into the final
//! image.

pub mod config;
pub mod naming;
pub mod orchestrator;
pub mod reassemble;
pub mod unit;

pub use config::{BatchConfig, GRID};
pub use naming::OutputNaming;
pub use orchestrator::{
    BatchObserver, BatchRenderer, BatchReport, NoObserver, UnitOutcome, UnitReport,
};
pub use reassemble::compose_tiles;
pub use unit::{RenderUnit, TileCoord, TileGeometry, UnitKind};

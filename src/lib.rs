#![forbid(unsafe_code)]

pub mod batch;
pub mod flame;
pub mod foundation;
pub mod render;
pub mod variation;

pub use batch::{BatchConfig, BatchObserver, BatchRenderer, BatchReport, UnitOutcome, UnitReport};
pub use flame::model::Flame;
pub use foundation::core::{Canvas, XyzPoint};
pub use foundation::error::{FlameError, FlameResult};
pub use render::{CpuRenderSettings, CpuRenderer, ProgressSink, RenderExecutor, RenderRequest};
pub use variation::{Variation, VariationRegistry};

pub mod cpu;
pub mod executor;
pub mod output;
pub mod progress;
pub mod tonemap;

pub use cpu::{CpuRenderSettings, CpuRenderer};
pub use executor::{RenderExecutor, RenderRequest, RenderedFlame};
pub use progress::{NoProgress, ProgressSink};

use image::{Rgb32FImage, RgbaImage};

use crate::flame::model::Flame;
use crate::foundation::core::Canvas;
use crate::foundation::error::FlameResult;
use crate::render::progress::ProgressSink;

/// What to render for one unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    pub width: u32,
    pub height: u32,
    /// Sample density: samples drawn per output pixel.
    pub quality: u32,
    pub hdr: bool,
    pub intensity_map: bool,
}

impl RenderRequest {
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

/// Pixels produced by one render.
#[derive(Clone, Debug)]
pub struct RenderedFlame {
    /// Straight-alpha RGBA8 image.
    pub image: RgbaImage,
    /// Linear colour before gamma, when requested.
    pub hdr: Option<Rgb32FImage>,
    /// Linear per-pixel intensity (grey), when requested.
    pub intensity_map: Option<Rgb32FImage>,
}

/// Service that turns a flame into pixels.
///
/// The flame is rendered at `request`'s pixel size; implementations fit the
/// flame's camera to that size themselves.
pub trait RenderExecutor {
    fn render(
        &mut self,
        flame: &Flame,
        request: &RenderRequest,
        progress: &mut dyn ProgressSink,
    ) -> FlameResult<RenderedFlame>;
}

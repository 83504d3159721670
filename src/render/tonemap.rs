use image::{Rgb, Rgb32FImage, Rgba, RgbaImage};

use crate::flame::model::Flame;
use crate::foundation::core::Canvas;
use crate::render::executor::RenderedFlame;

/// Histogram bin: summed palette colour (rgb) and hit count.
pub type Bin = [f32; 4];

/// Log-density tone mapping of an accumulated histogram.
#[derive(Clone, Copy, Debug)]
pub struct ToneMap {
    brightness: f32,
    inv_gamma: f32,
    k2: f32,
    background: [f32; 3],
    transparent: bool,
}

impl ToneMap {
    /// `flame` must already be fitted to the rendered pixel size.
    ///
    /// Hit counts are normalised by quality and by the flame-space area the
    /// image covers, so `hits * k2` estimates sample density per unit area
    /// independent of how the view is cropped or tiled.
    pub fn new(flame: &Flame, quality: u32) -> Self {
        let [r, g, b] = flame.background;
        let scale = flame.pixel_scale();
        let area = f64::from(flame.width) * f64::from(flame.height) / (scale * scale);
        let area = if area.is_finite() && area > 0.0 {
            area
        } else {
            1.0
        };
        Self {
            brightness: flame.brightness as f32,
            inv_gamma: if flame.gamma > 0.0 {
                (1.0 / flame.gamma) as f32
            } else {
                1.0
            },
            k2: (1.0 / (f64::from(quality.max(1)) * area)) as f32,
            background: [
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
            ],
            transparent: flame.bg_transparency,
        }
    }

    /// Linear intensity for a hit count.
    pub fn intensity(&self, hits: f32) -> f32 {
        if hits <= 0.0 {
            return 0.0;
        }
        self.brightness * (1.0 + hits * self.k2).ln()
    }

    /// Linear colour (before gamma) of one bin.
    pub fn linear(&self, bin: &Bin) -> [f32; 3] {
        let hits = bin[3];
        if hits <= 0.0 {
            return [0.0; 3];
        }
        let ls = self.intensity(hits) / hits;
        [bin[0] * ls, bin[1] * ls, bin[2] * ls]
    }

    pub fn pixel(&self, bin: &Bin) -> Rgba<u8> {
        let hits = bin[3];
        let alpha = self.intensity(hits).powf(self.inv_gamma).clamp(0.0, 1.0);
        let avg = if hits > 0.0 {
            [bin[0] / hits, bin[1] / hits, bin[2] / hits]
        } else {
            [0.0; 3]
        };

        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        if self.transparent {
            Rgba([to_u8(avg[0]), to_u8(avg[1]), to_u8(avg[2]), to_u8(alpha)])
        } else {
            let mix = |c: f32, bg: f32| to_u8(c * alpha + bg * (1.0 - alpha));
            Rgba([
                mix(avg[0], self.background[0]),
                mix(avg[1], self.background[1]),
                mix(avg[2], self.background[2]),
                255,
            ])
        }
    }

    pub fn apply(
        &self,
        hist: &[Bin],
        canvas: Canvas,
        hdr: bool,
        intensity_map: bool,
    ) -> RenderedFlame {
        let w = canvas.width;
        let at = |x: u32, y: u32| &hist[y as usize * w as usize + x as usize];

        let image = RgbaImage::from_fn(canvas.width, canvas.height, |x, y| self.pixel(at(x, y)));
        let hdr = hdr.then(|| {
            Rgb32FImage::from_fn(canvas.width, canvas.height, |x, y| Rgb(self.linear(at(x, y))))
        });
        let intensity_map = intensity_map.then(|| {
            Rgb32FImage::from_fn(canvas.width, canvas.height, |x, y| {
                let v = self.intensity(at(x, y)[3]);
                Rgb([v, v, v])
            })
        });
        RenderedFlame {
            image,
            hdr,
            intensity_map,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/tonemap.rs"]
mod tests;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{FlameError, FlameResult};
use crate::variation::{ParamMap, VariationRegistry};

fn one() -> f64 {
    1.0
}

fn default_brightness() -> f64 {
    4.0
}

fn default_gamma() -> f64 {
    4.0
}

fn identity_coefs() -> [f64; 6] {
    [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
}

/// One variation entry of an xform: name, blend amount, and ordered parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariationDesc {
    pub name: String,
    #[serde(default = "one")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "ParamMap::is_empty")]
    pub params: ParamMap,
}

impl VariationDesc {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            params: ParamMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name, value);
        self
    }
}

/// One transform stage of a flame.
///
/// `coefs` and `post` are affine coefficients `[a, b, c, d, e, f]` mapping
/// `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct XFormDesc {
    #[serde(default = "one")]
    pub weight: f64,
    #[serde(default)]
    pub color: f64,
    #[serde(default)]
    pub color_symmetry: f64,
    #[serde(default = "identity_coefs")]
    pub coefs: [f64; 6],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<[f64; 6]>,
    #[serde(default)]
    pub variations: Vec<VariationDesc>,
}

impl Default for XFormDesc {
    fn default() -> Self {
        Self {
            weight: 1.0,
            color: 0.0,
            color_symmetry: 0.0,
            coefs: identity_coefs(),
            post: None,
            variations: Vec::new(),
        }
    }
}

/// A complete flame description: camera, colouring, and transform chain.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Flame {
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels_per_unit: f64,
    #[serde(default)]
    pub centre_x: f64,
    #[serde(default)]
    pub centre_y: f64,
    #[serde(default = "one")]
    pub cam_zoom: f64,
    #[serde(default = "default_brightness")]
    pub brightness: f64,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default)]
    pub background: [u8; 3],
    #[serde(default)]
    pub bg_transparency: bool,
    #[serde(default = "one")]
    pub sample_density: f64,
    #[serde(default)]
    pub palette: Vec<[u8; 3]>,
    pub xforms: Vec<XFormDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_xform: Option<XFormDesc>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FlameDocument {
    One(Box<Flame>),
    Many(Vec<Flame>),
}

impl Flame {
    /// Minimal flame with the given native size and a single linear xform.
    pub fn new(width: u32, height: u32, pixels_per_unit: f64) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            pixels_per_unit,
            centre_x: 0.0,
            centre_y: 0.0,
            cam_zoom: 1.0,
            brightness: default_brightness(),
            gamma: default_gamma(),
            background: [0, 0, 0],
            bg_transparency: false,
            sample_density: 1.0,
            palette: Vec::new(),
            xforms: vec![XFormDesc {
                variations: vec![VariationDesc::new("linear", 1.0)],
                ..XFormDesc::default()
            }],
            final_xform: None,
        }
    }

    /// Parse a flame document. A JSON array yields its first flame.
    pub fn from_json_str(s: &str) -> FlameResult<Self> {
        let doc: FlameDocument =
            serde_json::from_str(s).map_err(|e| FlameError::serde(e.to_string()))?;
        let flame = match doc {
            FlameDocument::One(f) => *f,
            FlameDocument::Many(v) => v
                .into_iter()
                .next()
                .ok_or_else(|| FlameError::validation("flame document contains no flames"))?,
        };
        flame.validate()?;
        Ok(flame)
    }

    pub fn load(path: impl AsRef<Path>) -> FlameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read flame '{}'", path.display()))?;
        Self::from_json_str(&text).map_err(|e| match e {
            FlameError::Serde(msg) => FlameError::serde(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// [`Flame::load`], then [`Flame::check_variations`]; errors name the file.
    pub fn load_with(path: impl AsRef<Path>, registry: &VariationRegistry) -> FlameResult<Self> {
        let path = path.as_ref();
        let flame = Self::load(path)?;
        flame.check_variations(registry).map_err(|e| match e {
            FlameError::Validation(msg) => {
                FlameError::validation(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        Ok(flame)
    }

    /// Every variation must exist in `registry` and accept its parameters.
    pub fn check_variations(&self, registry: &VariationRegistry) -> FlameResult<()> {
        for xform in self.xforms.iter().chain(&self.final_xform) {
            for desc in &xform.variations {
                let mut variation = registry.create(&desc.name)?;
                for (name, value) in desc.params.iter() {
                    variation.set_parameter(name, value)?;
                }
            }
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> FlameResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FlameError::serde(e.to_string()))
    }

    pub fn validate(&self) -> FlameResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlameError::validation("flame width and height must be > 0"));
        }
        if !(self.pixels_per_unit > 0.0) {
            return Err(FlameError::validation("pixels_per_unit must be > 0"));
        }
        if !(self.cam_zoom > 0.0) {
            return Err(FlameError::validation("cam_zoom must be > 0"));
        }
        if self.xforms.is_empty() {
            return Err(FlameError::validation("flame has no xforms"));
        }
        if self.xforms.iter().any(|x| !(x.weight >= 0.0)) {
            return Err(FlameError::validation("xform weights must be >= 0"));
        }
        if self.xforms.iter().map(|x| x.weight).sum::<f64>() <= 0.0 {
            return Err(FlameError::validation("xform weights must not all be zero"));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Adopt a new pixel size, rescaling pixels-per-unit by the mean of the
    /// width and height ratios so the framing is preserved.
    pub fn fit_to(&mut self, target: Canvas) {
        let w_scl = f64::from(target.width) / f64::from(self.width);
        let h_scl = f64::from(target.height) / f64::from(self.height);
        self.pixels_per_unit *= (w_scl + h_scl) * 0.5;
        self.width = target.width;
        self.height = target.height;
    }

    /// Effective flame-space to pixel scale.
    pub fn pixel_scale(&self) -> f64 {
        self.pixels_per_unit * self.cam_zoom
    }

    /// Palette colour for a coordinate in `[0, 1]`; white when no palette is set.
    pub fn palette_color(&self, c: f64) -> [f32; 3] {
        if self.palette.is_empty() {
            return [1.0, 1.0, 1.0];
        }
        let last = self.palette.len() - 1;
        let idx = ((c.clamp(0.0, 1.0) * last as f64).round() as usize).min(last);
        let [r, g, b] = self.palette[idx];
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flame/model.rs"]
mod tests;

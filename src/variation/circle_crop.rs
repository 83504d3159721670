use crate::foundation::core::XyzPoint;
use crate::foundation::error::{FlameError, FlameResult};
use crate::variation::params::{ParamKind, ParamValue, find_param};
use crate::variation::{StageInfo, TransformContext, Variation};

const PARAM_NAMES: &[&str] = &["radius", "x", "y", "scatter_area", "zero"];

/// Circular crop applied before the regular variations.
///
/// Points inside the circle pass through scaled by the amount; points outside are
/// either collapsed onto the origin (`zero == 1`) or pulled back onto a jittered
/// circle boundary.
///
/// The `x` parameter is stored as the vertical centre offset and `y` as the
/// horizontal one. Flames in the wild depend on this, so it is kept as is.
#[derive(Clone, Debug)]
pub struct PreCircleCrop {
    radius: f64,
    x: f64,
    y: f64,
    scatter_area: f64,
    zero: i32,
    c_a: f64,
}

impl Default for PreCircleCrop {
    fn default() -> Self {
        Self {
            radius: 1.0,
            x: 0.0,
            y: 0.0,
            scatter_area: 0.0,
            zero: 1,
            c_a: 0.0,
        }
    }
}

impl PreCircleCrop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamped scatter cached by the last [`Variation::init`].
    pub fn cached_scatter(&self) -> f64 {
        self.c_a
    }

    /// Crop centre `(x0, y0)` in flame space.
    pub fn centre(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl Variation for PreCircleCrop {
    fn name(&self) -> &'static str {
        "pre_circlecrop"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn parameter_values(&self) -> Vec<ParamValue> {
        vec![
            ParamValue::Real(self.radius),
            ParamValue::Real(self.y),
            ParamValue::Real(self.x),
            ParamValue::Real(self.scatter_area),
            ParamValue::Int(self.zero),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> FlameResult<()> {
        match find_param(PARAM_NAMES, name) {
            Some(0) => self.radius = value,
            Some(1) => self.y = value,
            Some(2) => self.x = value,
            Some(3) => self.scatter_area = value,
            Some(4) => {
                if let ParamValue::Int(v) = ParamKind::Int.coerce(value) {
                    self.zero = v;
                }
            }
            _ => return Err(FlameError::invalid_parameter(self.name(), name)),
        }
        Ok(())
    }

    fn init(&mut self, _ctx: &mut TransformContext, _stage: &StageInfo) {
        self.c_a = self.scatter_area.clamp(-1.0, 1.0);
    }

    fn transform(
        &mut self,
        ctx: &mut TransformContext,
        _stage: &StageInfo,
        affine: &mut XyzPoint,
        _var: &mut XyzPoint,
        amount: f64,
    ) {
        // circlecrop by Xyrus02
        let (x0, y0) = (self.x, self.y);
        let cr = self.radius;
        let vv = amount;

        affine.x -= x0;
        affine.y -= y0;
        affine.z += vv * affine.z;

        let rad = affine.radius();
        let ang = affine.angle();
        let rdc = cr + ctx.random() * 0.5 * self.c_a;

        let esc = rad > cr;
        let zero_mode = self.zero == 1;

        match (zero_mode, esc) {
            (true, true) => {
                affine.x = 0.0;
                affine.y = 0.0;
            }
            (false, true) => {
                let (s, c) = ang.sin_cos();
                affine.x += vv * rdc * c + x0;
                affine.y += vv * rdc * s + y0;
            }
            (_, false) => {
                affine.x += vv * affine.x + x0;
                affine.y += vv * affine.y + y0;
            }
        }
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn clone_box(&self) -> Box<dyn Variation> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variation/circle_crop.rs"]
mod tests;

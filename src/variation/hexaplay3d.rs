use crate::foundation::core::XyzPoint;
use crate::foundation::error::{FlameError, FlameResult};
use crate::variation::params::{ParamValue, find_param};
use crate::variation::{StageInfo, TransformContext, Variation};

const PARAM_NAMES: &[&str] = &["majp", "scale", "zlift"];

/// Hexagonal snowflake built on one or two stacked planes.
///
/// Walks the six 60° nodes or the three 120° nodes in sequence; the node set is
/// re-chosen at random after each full cycle. The cycle counters are per worker.
#[derive(Clone, Debug)]
pub struct Hexaplay3D {
    majp: f64,
    scale: f64,
    zlift: f64,

    seg60: [(f64, f64); 6],
    seg120: [(f64, f64); 3],
    rswtch: u32,
    fcycle: usize,
    bcycle: usize,
}

impl Default for Hexaplay3D {
    fn default() -> Self {
        Self {
            majp: 1.0,
            scale: 0.25,
            zlift: 0.25,
            seg60: [(0.0, 0.0); 6],
            seg120: [(0.0, 0.0); 3],
            rswtch: 0,
            fcycle: 0,
            bcycle: 0,
        }
    }
}

impl Hexaplay3D {
    pub fn new() -> Self {
        Self::default()
    }

    fn pick_switch(ctx: &mut TransformContext) -> u32 {
        (ctx.random() * 3.0) as u32
    }
}

impl Variation for Hexaplay3D {
    fn name(&self) -> &'static str {
        "hexaplay3D"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn parameter_values(&self) -> Vec<ParamValue> {
        vec![
            ParamValue::Real(self.majp),
            ParamValue::Real(self.scale),
            ParamValue::Real(self.zlift),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> FlameResult<()> {
        match find_param(PARAM_NAMES, name) {
            Some(0) => self.majp = value,
            Some(1) => self.scale = value,
            Some(2) => self.zlift = value,
            _ => return Err(FlameError::invalid_parameter(self.name(), name)),
        }
        Ok(())
    }

    fn init(&mut self, ctx: &mut TransformContext, _stage: &StageInfo) {
        let hlift = (std::f64::consts::PI / 3.0).sin();
        self.rswtch = Self::pick_switch(ctx);
        self.fcycle = 0;
        self.bcycle = 0;
        self.seg60 = [
            (1.0, 0.0),
            (0.5, hlift),
            (-0.5, hlift),
            (-1.0, 0.0),
            (-0.5, -hlift),
            (0.5, -hlift),
        ];
        self.seg120 = [(1.0, 0.0), (-0.5, hlift), (-0.5, -hlift)];
    }

    fn transform(
        &mut self,
        ctx: &mut TransformContext,
        _stage: &StageInfo,
        affine: &mut XyzPoint,
        var: &mut XyzPoint,
        amount: f64,
    ) {
        // hexaplay3D by Larry Berlin
        if self.fcycle > 5 {
            self.fcycle = 0;
            self.rswtch = Self::pick_switch(ctx);
        }
        if self.bcycle > 2 {
            self.bcycle = 0;
            self.rswtch = Self::pick_switch(ctx);
        }

        let lrmaj = amount;
        let lscale = self.scale * 0.5;
        let pos_neg = if ctx.random() < 0.5 { -1.0 } else { 1.0 };

        let abmajp = self.majp.abs();
        let boost = if abmajp <= 1.0 {
            0.0
        } else {
            (abmajp - 1.0) * 0.5
        };
        var.z += affine.z * 0.5 * self.zlift + pos_neg * boost;

        let (nx, ny) = if self.rswtch <= 1 {
            let node = self.seg60[self.fcycle];
            self.fcycle += 1;
            node
        } else {
            let node = self.seg120[self.bcycle];
            self.bcycle += 1;
            node
        };
        var.x = (var.x + affine.x) * lscale + lrmaj * nx;
        var.y = (var.y + affine.y) * lscale + lrmaj * ny;
    }

    fn clone_box(&self) -> Box<dyn Variation> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variation/hexaplay3d.rs"]
mod tests;

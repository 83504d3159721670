//! Classic parameterless variations.

use std::f64::consts::PI;

use crate::foundation::core::XyzPoint;
use crate::variation::{StageInfo, TransformContext, Variation};

const EPS: f64 = 1e-10;

macro_rules! parameterless {
    ($ty:ident, $name:literal) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $ty;

        impl Variation for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn transform(
                &mut self,
                ctx: &mut TransformContext,
                _stage: &StageInfo,
                affine: &mut XyzPoint,
                var: &mut XyzPoint,
                amount: f64,
            ) {
                $ty::apply(ctx, affine, var, amount);
            }

            fn clone_box(&self) -> Box<dyn Variation> {
                Box::new(*self)
            }
        }
    };
}

parameterless!(Linear, "linear");
parameterless!(Sinusoidal, "sinusoidal");
parameterless!(Spherical, "spherical");
parameterless!(Swirl, "swirl");
parameterless!(Julia, "julia");

impl Linear {
    fn apply(_ctx: &mut TransformContext, p: &XyzPoint, var: &mut XyzPoint, amount: f64) {
        var.x += amount * p.x;
        var.y += amount * p.y;
        var.z += amount * p.z;
    }
}

impl Sinusoidal {
    fn apply(_ctx: &mut TransformContext, p: &XyzPoint, var: &mut XyzPoint, amount: f64) {
        var.x += amount * p.x.sin();
        var.y += amount * p.y.sin();
    }
}

impl Spherical {
    fn apply(_ctx: &mut TransformContext, p: &XyzPoint, var: &mut XyzPoint, amount: f64) {
        let r = amount / (p.sum_sq() + EPS);
        var.x += r * p.x;
        var.y += r * p.y;
    }
}

impl Swirl {
    fn apply(_ctx: &mut TransformContext, p: &XyzPoint, var: &mut XyzPoint, amount: f64) {
        let (s, c) = p.sum_sq().sin_cos();
        var.x += amount * (s * p.x - c * p.y);
        var.y += amount * (c * p.x + s * p.y);
    }
}

impl Julia {
    fn apply(ctx: &mut TransformContext, p: &XyzPoint, var: &mut XyzPoint, amount: f64) {
        let mut a = 0.5 * p.x.atan2(p.y);
        if ctx.random() < 0.5 {
            a += PI;
        }
        let r = amount * p.radius().sqrt();
        let (s, c) = a.sin_cos();
        var.x += r * c;
        var.y += r * s;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variation/simple.rs"]
mod tests;

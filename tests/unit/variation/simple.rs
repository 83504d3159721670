use super::*;
use crate::foundation::error::FlameError;

fn apply(v: &mut dyn Variation, p: XyzPoint, amount: f64) -> XyzPoint {
    let mut ctx = TransformContext::new(3);
    let mut affine = p;
    let mut var = XyzPoint::ZERO;
    v.transform(&mut ctx, &StageInfo::default(), &mut affine, &mut var, amount);
    assert_eq!(affine, p, "{} must not touch the affine point", v.name());
    var
}

#[test]
fn linear_scales_by_amount() {
    let out = apply(&mut Linear, XyzPoint::new(1.0, -2.0, 0.5), 0.5);
    assert_eq!((out.x, out.y, out.z), (0.5, -1.0, 0.25));
}

#[test]
fn spherical_inverts_radius() {
    let out = apply(&mut Spherical, XyzPoint::new(2.0, 0.0, 0.0), 1.0);
    assert!((out.x - 0.5).abs() < 1e-9);
    assert!(out.y.abs() < 1e-12);
}

#[test]
fn julia_preserves_sqrt_radius() {
    let out = apply(&mut Julia, XyzPoint::new(0.0, 4.0, 0.0), 1.0);
    assert!((out.radius() - 2.0).abs() < 1e-9);
}

#[test]
fn variations_accumulate_into_var() {
    let p = XyzPoint::new(0.3, 0.4, 0.0);
    let mut ctx = TransformContext::new(1);
    let mut affine = p;
    let mut var = XyzPoint::ZERO;
    Linear.transform(&mut ctx, &StageInfo::default(), &mut affine, &mut var, 1.0);
    Sinusoidal.transform(&mut ctx, &StageInfo::default(), &mut affine, &mut var, 1.0);
    assert!((var.x - (0.3 + 0.3f64.sin())).abs() < 1e-12);
    assert!((var.y - (0.4 + 0.4f64.sin())).abs() < 1e-12);
}

#[test]
fn parameterless_variations_reject_any_parameter() {
    let mut v = Swirl;
    assert!(v.parameter_names().is_empty());
    assert!(matches!(
        v.set_parameter("radius", 1.0),
        Err(FlameError::InvalidParameter { .. })
    ));
}

use super::*;

fn xform(variations: Vec<VariationDesc>) -> XFormDesc {
    XFormDesc {
        variations,
        ..XFormDesc::default()
    }
}

#[test]
fn pre_variations_run_before_regular_ones() {
    let desc = xform(vec![
        VariationDesc::new("linear", 1.0),
        VariationDesc::new("pre_circlecrop", 1.0)
            .with_param("radius", 1.0)
            .with_param("zero", 1.0),
    ]);
    let reg = VariationRegistry::builtin();
    let mut x = XForm::from_desc(&desc, &reg).unwrap();
    assert_eq!(x.variation_names(), vec!["pre_circlecrop", "linear"]);

    let mut ctx = TransformContext::new(1);
    x.init(&mut ctx);
    let out = x.apply(&mut ctx, &XyzPoint::new(5.0, 0.0, 0.0));
    assert_eq!((out.x, out.y), (0.0, 0.0));

    let out = x.apply(&mut ctx, &XyzPoint::new(0.5, 0.0, 0.0));
    // Inside: 0.5 + 1.0 * 0.5, then linear.
    assert!((out.x - 1.0).abs() < 1e-12);
}

#[test]
fn unknown_parameter_fails_stage_construction() {
    let desc = xform(vec![
        VariationDesc::new("pre_circlecrop", 1.0).with_param("bogus", 1.0),
    ]);
    let err = XForm::from_desc(&desc, &VariationRegistry::builtin()).unwrap_err();
    assert!(matches!(err, FlameError::InvalidParameter { .. }));
}

#[test]
fn export_lists_full_schema_in_order() {
    let desc = xform(vec![
        VariationDesc::new("pre_circlecrop", 0.5).with_param("zero", 0.0),
    ]);
    let x = XForm::from_desc(&desc, &VariationRegistry::builtin()).unwrap();
    let out = x.to_desc();
    let params = &out.variations[0].params;
    let names: Vec<_> = params.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["radius", "x", "y", "scatter_area", "zero"]);
    assert_eq!(params.get("zero"), Some(0.0));
    assert_eq!(out.variations[0].amount, 0.5);
}

#[test]
fn affine_applies_before_variations_and_post_after() {
    let desc = XFormDesc {
        coefs: [2.0, 0.0, 0.0, 2.0, 1.0, 0.0],
        post: Some([1.0, 0.0, 0.0, 1.0, 0.0, -1.0]),
        variations: vec![VariationDesc::new("linear", 1.0)],
        ..XFormDesc::default()
    };
    let mut x = XForm::from_desc(&desc, &VariationRegistry::builtin()).unwrap();
    let mut ctx = TransformContext::new(1);
    let out = x.apply(&mut ctx, &XyzPoint::new(1.0, 1.0, 0.0));
    assert_eq!((out.x, out.y), (3.0, 1.0));
}

#[derive(Clone, Debug)]
struct DoubleX;

impl Variation for DoubleX {
    fn name(&self) -> &'static str {
        "post_double_x"
    }

    fn transform(
        &mut self,
        _ctx: &mut TransformContext,
        _stage: &StageInfo,
        affine: &mut XyzPoint,
        _var: &mut XyzPoint,
        _amount: f64,
    ) {
        affine.x *= 2.0;
    }

    fn priority(&self) -> i32 {
        1
    }

    fn clone_box(&self) -> Box<dyn Variation> {
        Box::new(self.clone())
    }
}

#[test]
fn post_variations_rewrite_the_accumulated_point() {
    let mut reg = VariationRegistry::builtin();
    reg.register(|| Box::new(DoubleX));
    let desc = xform(vec![
        VariationDesc::new("post_double_x", 1.0),
        VariationDesc::new("linear", 0.5),
    ]);
    let mut x = XForm::from_desc(&desc, &reg).unwrap();
    assert_eq!(x.variation_names(), vec!["linear", "post_double_x"]);
    let mut ctx = TransformContext::new(1);
    let out = x.apply(&mut ctx, &XyzPoint::new(4.0, 2.0, 0.0));
    assert_eq!((out.x, out.y), (4.0, 1.0));
}

#[test]
fn color_moves_toward_xform_color() {
    let desc = XFormDesc {
        color: 1.0,
        variations: vec![VariationDesc::new("linear", 1.0)],
        ..XFormDesc::default()
    };
    let mut x = XForm::from_desc(&desc, &VariationRegistry::builtin()).unwrap();
    let mut ctx = TransformContext::new(1);
    let out = x.apply(&mut ctx, &XyzPoint::ZERO);
    assert_eq!(out.color, 0.5);
}

#[test]
fn pick_follows_cumulative_weights() {
    let mut flame = Flame::new(10, 10, 10.0);
    flame.xforms[0].weight = 1.0;
    flame.xforms.push(XFormDesc {
        weight: 3.0,
        variations: vec![VariationDesc::new("linear", 1.0)],
        ..XFormDesc::default()
    });
    let stages = FlameStages::build(&flame, &VariationRegistry::builtin()).unwrap();
    assert_eq!(stages.xforms().len(), 2);
    assert_eq!(stages.pick(0.0), 0);
    assert_eq!(stages.pick(0.2), 0);
    assert_eq!(stages.pick(0.3), 1);
    assert_eq!(stages.pick(0.999), 1);
}

#[test]
fn final_xform_shapes_plotted_point_only() {
    let mut flame = Flame::new(10, 10, 10.0);
    flame.final_xform = Some(XFormDesc {
        coefs: [1.0, 0.0, 0.0, 1.0, 10.0, 0.0],
        variations: vec![VariationDesc::new("linear", 1.0)],
        ..XFormDesc::default()
    });
    let mut stages = FlameStages::build(&flame, &VariationRegistry::builtin()).unwrap();
    let mut ctx = TransformContext::new(2);
    stages.init(&mut ctx);
    let (next, plotted) = stages.step(&mut ctx, &XyzPoint::new(1.0, 0.0, 0.0));
    assert_eq!(next.x, 1.0);
    assert_eq!(plotted.x, 11.0);
}

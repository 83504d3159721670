use super::*;

#[test]
fn builtin_names_are_unique_and_resolvable() {
    let reg = VariationRegistry::builtin();
    let names: Vec<_> = reg.names().collect();
    assert_eq!(names.len(), 7);
    for name in names {
        assert_eq!(reg.create(name).unwrap().name(), name);
    }
}

#[test]
fn unknown_name_is_a_validation_error() {
    let reg = VariationRegistry::builtin();
    let err = reg.create("bubble").unwrap_err();
    assert!(matches!(err, FlameError::Validation(_)));
}

#[test]
fn created_instances_are_independent() {
    let reg = VariationRegistry::builtin();
    let mut a = reg.create("pre_circlecrop").unwrap();
    let b = reg.create("pre_circlecrop").unwrap();
    a.set_parameter("radius", 9.0).unwrap();
    assert_eq!(a.parameter_values()[0].as_f64(), 9.0);
    assert_eq!(b.parameter_values()[0].as_f64(), 1.0);
}

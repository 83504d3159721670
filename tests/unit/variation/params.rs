use super::*;

#[test]
fn int_kind_truncates_toward_zero() {
    assert_eq!(ParamKind::Int.coerce(1.9), ParamValue::Int(1));
    assert_eq!(ParamKind::Int.coerce(-1.9), ParamValue::Int(-1));
    assert_eq!(ParamKind::Real.coerce(1.9), ParamValue::Real(1.9));
}

#[test]
fn find_param_ignores_case() {
    let schema = ["radius", "x", "scatter_area"];
    assert_eq!(find_param(&schema, "RADIUS"), Some(0));
    assert_eq!(find_param(&schema, "Scatter_Area"), Some(2));
    assert_eq!(find_param(&schema, "nope"), None);
}

#[test]
fn param_map_keeps_insertion_order_and_replaces_in_place() {
    let mut m = ParamMap::new();
    m.insert("zero", 1.0);
    m.insert("radius", 2.0);
    m.insert("ZERO", 0.0);
    let entries: Vec<_> = m.iter().collect();
    assert_eq!(entries, vec![("zero", 0.0), ("radius", 2.0)]);
    assert_eq!(m.get("Radius"), Some(2.0));
}

#[test]
fn param_map_json_preserves_document_order() {
    let m: ParamMap = serde_json::from_str(r#"{"y": 1.5, "x": -2, "radius": 3}"#).unwrap();
    let names: Vec<_> = m.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["y", "x", "radius"]);
    assert_eq!(
        serde_json::to_string(&m).unwrap(),
        r#"{"y":1.5,"x":-2.0,"radius":3.0}"#
    );
}

use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlameError::execution("x")
            .to_string()
            .contains("execution error:")
    );
    assert!(
        FlameError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        FlameError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FlameError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn invalid_parameter_names_variation_and_parameter() {
    let msg = FlameError::invalid_parameter("pre_circlecrop", "bogus").to_string();
    assert!(msg.contains("pre_circlecrop"));
    assert!(msg.contains("bogus"));
}

#[test]
fn reassembly_reports_job_and_tile() {
    let msg = FlameError::reassembly("a.json", Some((3, 7)), "missing").to_string();
    assert_eq!(msg, "reassembly error for 'a.json' tile [3:7]: missing");

    let msg = FlameError::reassembly("a.json", None, "write failed").to_string();
    assert_eq!(msg, "reassembly error for 'a.json': write failed");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FlameError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

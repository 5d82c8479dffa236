use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GradiiError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(GradiiError::decode("x").to_string().contains("decode error:"));
    assert!(GradiiError::render("x").to_string().contains("render error:"));
    assert!(GradiiError::export("x").to_string().contains("export error:"));
    assert!(
        GradiiError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GradiiError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

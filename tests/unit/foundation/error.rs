use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SpriteError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SpriteError::not_found("x").to_string().contains("not found:"));
    assert!(SpriteError::decode("x").to_string().contains("decode error:"));
    assert!(SpriteError::encode("x").to_string().contains("encode error:"));
    assert!(SpriteError::cancelled("x").to_string().contains("cancelled:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SpriteError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_cancelled());
}

#[test]
fn cancelled_is_distinguishable() {
    assert!(SpriteError::cancelled("stop").is_cancelled());
    assert!(!SpriteError::encode("stop").is_cancelled());
}

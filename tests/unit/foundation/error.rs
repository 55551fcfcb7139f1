use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CelError::EmptyPlan.to_string().contains("empty plan"));
    assert!(
        CelError::NoCompositeInput
            .to_string()
            .contains("no composite input")
    );
    assert!(
        CelError::io("a.png", std::io::Error::other("x"))
            .to_string()
            .contains("io error: 'a.png'")
    );
}

#[test]
fn render_failure_carries_context() {
    let err = CelError::render_failure(
        "L1",
        12,
        "out/pos_0.0012.png",
        anyhow::anyhow!("host died"),
    );
    let msg = err.to_string();
    assert!(msg.contains("layer 'L1'"));
    assert!(msg.contains("frame 12"));
    assert!(msg.contains("out/pos_0.0012.png"));
    assert!(msg.contains("host died"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

use super::*;

#[test]
fn display_prefixes_are_stable() {
    let asset: ReelError = AssetError::corrupt("a.png", "zero bytes").into();
    assert!(asset.to_string().starts_with("asset error:"));
    assert!(asset.to_string().contains("a.png"));

    let validation: ReelError = ValidationError::NoContent.into();
    assert!(validation.to_string().starts_with("validation error:"));

    let encoding: ReelError = EncodingError::EmptyPlan.into();
    assert!(encoding.to_string().starts_with("encoding error:"));

    assert!(
        ReelError::config("fps must be > 0")
            .to_string()
            .contains("invalid configuration")
    );
}

#[test]
fn only_asset_errors_are_recoverable() {
    assert!(ReelError::from(AssetError::too_large("x", "huge")).is_recoverable());
    assert!(!ReelError::from(ValidationError::InvalidFrameCount(0)).is_recoverable());
    assert!(!ReelError::from(EncodingError::codec("x264 missing")).is_recoverable());
}

#[test]
fn asset_error_exposes_label() {
    let err = AssetError::unsupported("bytes#2", "unknown magic");
    assert_eq!(err.source_label(), "bytes#2");
}

#[test]
fn io_failure_mentions_path() {
    let err = EncodingError::io("/nope/out.mp4", "permission denied");
    let msg = err.to_string();
    assert!(msg.contains("/nope/out.mp4"));
    assert!(msg.contains("permission denied"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

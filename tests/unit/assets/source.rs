use super::*;
use crate::foundation::error::ReelError;

#[test]
fn bytes_source_borrows_and_enforces_limit() {
    let src = ImageSource::from_bytes("hero.PNG", vec![1u8, 2, 3]);
    assert_eq!(src.label(), "hero.PNG");
    assert_eq!(src.extension_hint().as_deref(), Some("png"));
    assert_eq!(src.encoded_bytes(3).unwrap().as_ref(), &[1, 2, 3]);

    let err = src.encoded_bytes(2).unwrap_err();
    assert!(matches!(err, ReelError::Asset(AssetError::TooLarge { .. })));
}

#[test]
fn zero_byte_input_is_corrupt() {
    let src = ImageSource::from_bytes("empty", Vec::<u8>::new());
    let err = src.encoded_bytes(1024).unwrap_err();
    assert!(matches!(err, ReelError::Asset(AssetError::Corrupt { .. })));

    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("empty.jpg");
    std::fs::write(&p, b"").unwrap();
    let err = ImageSource::from_path(&p).encoded_bytes(1024).unwrap_err();
    assert!(matches!(err, ReelError::Asset(AssetError::Corrupt { .. })));
}

#[test]
fn missing_file_is_corrupt_and_labelled() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("nope.png");
    let err = ImageSource::from_path(&p).encoded_bytes(1024).unwrap_err();
    let ReelError::Asset(asset) = err else {
        panic!("expected asset error");
    };
    assert!(asset.source_label().ends_with("nope.png"));
}

#[test]
fn oversized_file_is_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("big.bin");
    std::fs::write(&p, vec![0u8; 64]).unwrap();
    let err = ImageSource::from_path(&p).encoded_bytes(63).unwrap_err();
    assert!(matches!(err, ReelError::Asset(AssetError::TooLarge { .. })));
}

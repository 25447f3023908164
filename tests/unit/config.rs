use super::*;
use std::collections::HashMap;

#[test]
fn defaults_validate() {
    let cfg = EngineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.encode.fps, 24);
    assert_eq!(cfg.layout.summary_max_lines, 5);
    assert_eq!(cfg.layout.ellipsis, "\u{2026}");
    assert_eq!(cfg.resources.max_resident_keyframes, 3);
}

#[test]
fn partial_json_keeps_defaults() {
    let json = r#"{ "encode": { "fps": 30 }, "layout": { "summary_max_lines": 4 } }"#;
    let cfg = EngineConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.encode.fps, 30);
    assert_eq!(cfg.encode.crf, 23);
    assert_eq!(cfg.layout.summary_max_lines, 4);
    assert_eq!(cfg.layout.title_size, 66.0);
    assert_eq!(cfg.layout.panel_color, Rgba8::rgba(20, 20, 40, 220));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = EngineConfig::from_reader("{ not json".as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        ReelError::Validation(crate::foundation::error::ValidationError::Config(_))
    ));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn overrides_apply_and_skip_empty_values() {
    let env: HashMap<&str, &str> = [
        (ENV_BACKGROUND, "/srv/bg.png"),
        (ENV_TITLE_FONT, ""),
        (ENV_BODY_FONT, "/fonts/body.ttf"),
        (ENV_FPS, " 30 "),
    ]
    .into_iter()
    .collect();

    let mut cfg = EngineConfig::default();
    cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(cfg.background, Some(PathBuf::from("/srv/bg.png")));
    assert_eq!(cfg.fonts.title, None);
    assert_eq!(cfg.fonts.body, Some(PathBuf::from("/fonts/body.ttf")));
    assert_eq!(cfg.encode.fps, 30);
}

#[test]
fn non_numeric_fps_override_is_rejected() {
    let mut cfg = EngineConfig::default();
    let err = cfg
        .apply_overrides(|k| (k == ENV_FPS).then(|| "fast".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains(ENV_FPS));
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = EngineConfig::default();
    cfg.encode.fps = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::default();
    cfg.layout.summary_max_lines = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::default();
    cfg.layout.title_top_ratio = 0.95;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::default();
    cfg.audio.playback_rate = 0.0;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::default();
    cfg.resources.max_resident_keyframes = 0;
    assert!(cfg.validate().is_err());
}

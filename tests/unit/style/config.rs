use super::*;
use serde_json::json;

#[test]
fn defaults_validate() {
    let cfg = StyleConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.line_height_px(), 48.0);
    assert_eq!(cfg.background_alpha(), 0.5);
}

#[test]
fn validate_rejects_out_of_range_fields() {
    let mut cfg = StyleConfig {
        font_size_px: 0,
        ..StyleConfig::default()
    };
    assert!(cfg.validate().is_err());

    cfg.font_size_px = 20;
    cfg.line_height_multiple = 0.0;
    assert!(cfg.validate().is_err());
    cfg.line_height_multiple = f64::NAN;
    assert!(cfg.validate().is_err());

    cfg.line_height_multiple = 1.2;
    cfg.background_opacity_pct = 101;
    assert!(cfg.validate().is_err());

    cfg.background_opacity_pct = 100;
    cfg.font_family = "  ".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn backdrop_blur_is_bounded() {
    let mut cfg = StyleConfig {
        backdrop_blur_px: MAX_BACKDROP_BLUR_PX,
        ..StyleConfig::default()
    };
    cfg.validate().unwrap();

    for blur in [MAX_BACKDROP_BLUR_PX + 1, 1 << 30, u32::MAX] {
        cfg.backdrop_blur_px = blur;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, CaptionError::Validation(_)));
    }
}

#[test]
fn line_x_follows_alignment() {
    assert_eq!(TextAlign::Left.line_x(800.0, 200.0), 0.0);
    assert_eq!(TextAlign::Right.line_x(800.0, 200.0), 600.0);
    assert_eq!(TextAlign::Center.line_x(800.0, 200.0), 300.0);
    assert_eq!(TextAlign::Center.line_x(100.0, 300.0), -100.0);
}

#[test]
fn json_uses_camel_case_and_fills_missing_fields() {
    let cfg: StyleConfig = serde_json::from_value(json!({
        "fontSizePx": 40,
        "fontColor": "#ff0000",
        "backgroundHeight": 2.0,
        "textAlign": "right",
    }))
    .unwrap();
    assert_eq!(cfg.font_size_px, 40);
    assert_eq!(cfg.font_color, Color::rgb(255, 0, 0));
    assert_eq!(cfg.line_height_multiple, 2.0);
    assert_eq!(cfg.text_align, TextAlign::Right);
    assert_eq!(cfg.outline_width_px, 3);

    let v = serde_json::to_value(&cfg).unwrap();
    assert_eq!(v["lineHeightMultiple"], json!(2.0));
    assert_eq!(v["backgroundColor"], json!("#000000"));
}

#[test]
fn preferences_exclude_caption_text() {
    let mut cfg = StyleConfig {
        font_size_px: 18,
        caption_text: "keep me".to_string(),
        ..StyleConfig::default()
    };
    let prefs = cfg.preferences();
    let v = serde_json::to_value(&prefs).unwrap();
    assert!(v.get("captionText").is_none());
    assert_eq!(v["fontSizePx"], json!(18));

    let other = StylePreferences {
        font_size_px: 64,
        text_align: TextAlign::Left,
        ..StylePreferences::default()
    };
    cfg.apply_preferences(&other);
    assert_eq!(cfg.font_size_px, 64);
    assert_eq!(cfg.text_align, TextAlign::Left);
    assert_eq!(cfg.caption_text, "keep me");
}

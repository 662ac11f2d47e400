use super::*;

fn cfg(text: &str, font_size_px: u32, multiple: f64) -> StyleConfig {
    StyleConfig {
        font_size_px,
        line_height_multiple: multiple,
        caption_text: text.to_string(),
        ..StyleConfig::default()
    }
}

#[test]
fn two_lines_grow_canvas_by_two_bands() {
    let layout = LayoutEngine::layout(Size::new(800, 600), &cfg("A\nB", 32, 1.5));
    let g = layout.geometry;
    assert_eq!(layout.lines, vec!["A", "B"]);
    assert_eq!(g.line_height_px, 48.0);
    assert_eq!(g.width, 800);
    assert_eq!(g.height(), 696.0);
    assert_eq!(g.surface_size(), Size::new(800, 696));
    assert_eq!(g.band_rect(0), Rect::new(0.0, 600.0, 800.0, 648.0));
    assert_eq!(g.band_rect(1), Rect::new(0.0, 648.0, 800.0, 696.0));
    assert_eq!(g.band_center_y(1), 672.0);
}

#[test]
fn blank_only_text_adds_no_band() {
    let g = LayoutEngine::compute_geometry(Size::new(320, 240), &cfg("\n\n", 32, 1.5));
    assert_eq!(g.line_count, 0);
    assert_eq!(g.height(), 240.0);
    assert_eq!(g.surface_size(), Size::new(320, 240));
}

#[test]
fn blank_and_whitespace_lines_are_dropped_but_text_is_kept_verbatim() {
    assert_eq!(
        caption_lines("  first\n\n \t \nsecond  \r\n\r\nthird"),
        vec!["  first", "second  ", "third"]
    );
    assert!(caption_lines("").is_empty());
}

#[test]
fn band_height_is_exact_product() {
    for (text, size, multiple) in [
        ("a\nb\nc", 17u32, 1.3f64),
        ("x", 33, 0.7),
        ("one\n\ntwo\n \nthree\nfour", 21, 2.25),
        ("", 50, 1.0),
    ] {
        let config = cfg(text, size, multiple);
        let g = LayoutEngine::compute_geometry(Size::new(10, 100), &config);
        let lines = caption_lines(text).len();
        assert_eq!(g.line_count, lines);
        let expected = lines as f64 * (f64::from(size) * multiple);
        assert_eq!(g.band_height(), expected);
        assert!((g.height() - 100.0 - expected).abs() < 1e-9);
        assert!(g.height() >= 100.0);
    }
}

#[test]
fn fractional_height_truncates_surface() {
    let g = LayoutEngine::compute_geometry(Size::new(10, 100), &cfg("a", 17, 1.3));
    assert!((g.height() - 122.1).abs() < 1e-9);
    assert_eq!(g.surface_size().height, 122);
}

#[test]
fn checked_surface_size_enforces_raster_limits() {
    let ok = LayoutEngine::compute_geometry(Size::new(800, 600), &cfg("A\nB", 32, 1.5));
    assert_eq!(ok.checked_surface_size().unwrap(), Size::new(800, 696));

    let edge = LayoutEngine::compute_geometry(Size::new(1, MAX_CANVAS_SIDE), &cfg("", 32, 1.5));
    assert_eq!(edge.checked_surface_size().unwrap(), Size::new(1, MAX_CANVAS_SIDE));

    let tall = LayoutEngine::compute_geometry(Size::new(8, 8), &cfg("A", 32, 1.0e9));
    assert!(matches!(
        tall.checked_surface_size(),
        Err(CaptionError::Validation(_))
    ));

    let wide = LayoutEngine::compute_geometry(Size::new(MAX_CANVAS_SIDE + 1, 1), &cfg("", 32, 1.5));
    assert!(wide.checked_surface_size().is_err());

    let large = LayoutEngine::compute_geometry(Size::new(10_000, 10_000), &cfg("", 32, 1.5));
    assert!(u64::from(large.width) * 10_000 > MAX_CANVAS_PIXELS);
    assert!(large.checked_surface_size().is_err());
}

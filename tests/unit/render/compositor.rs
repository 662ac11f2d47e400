use super::*;

use crate::style::color::Color;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    let px = rgba.repeat((width * height) as usize);
    SourceImage::from_rgba8(width, height, px).unwrap()
}

fn band_config(text: &str) -> StyleConfig {
    StyleConfig {
        caption_text: text.to_string(),
        font_size_px: 2,
        line_height_multiple: 2.0,
        background_color: Color::BLACK,
        background_opacity_pct: 50,
        ..StyleConfig::default()
    }
}

#[test]
fn render_without_image_is_noop() {
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();
    let out = comp
        .render(&mut surface, None, &StyleConfig::default(), &mut cache)
        .unwrap();
    assert!(out.is_none());
    assert_eq!(surface.width(), 0);
    assert_eq!(cache.populate_count(), 0);
}

#[test]
fn blank_caption_draws_only_the_image() {
    let img = solid(3, 2, [10, 20, 30, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();

    let geometry = comp
        .render(&mut surface, Some(&img), &band_config("\n\n"), &mut cache)
        .unwrap()
        .unwrap();
    assert_eq!(geometry.line_count, 0);
    assert_eq!(surface.height(), 2);
    assert_eq!(surface.data(), img.rgba8_premul());
    assert_eq!(cache.populate_count(), 0);
}

#[test]
fn band_blends_tint_then_slice_at_band_alpha() {
    let img = solid(4, 4, [255, 255, 255, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();

    comp.render(&mut surface, Some(&img), &band_config("A"), &mut cache)
        .unwrap();

    assert_eq!(surface.height(), 8);
    assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);
    for y in 4..8 {
        assert_eq!(surface.pixel(2, y), [128, 128, 128, 192]);
    }
}

#[test]
fn zero_opacity_leaves_bands_transparent() {
    let img = solid(2, 2, [255, 0, 0, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();
    let cfg = StyleConfig {
        background_opacity_pct: 0,
        ..band_config("A\nB")
    };

    comp.render(&mut surface, Some(&img), &cfg, &mut cache).unwrap();
    assert_eq!(surface.height(), 10);
    for y in 2..10 {
        assert_eq!(surface.pixel(0, y), [0, 0, 0, 0]);
    }
}

#[test]
fn geometry_matches_worked_example() {
    let img = solid(800, 600, [0, 0, 0, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();
    let cfg = StyleConfig {
        caption_text: "A\nB".to_string(),
        ..StyleConfig::default()
    };

    let g = comp
        .render(&mut surface, Some(&img), &cfg, &mut cache)
        .unwrap()
        .unwrap();
    assert_eq!(g.line_count, 2);
    assert_eq!(g.line_height_px, 48.0);
    assert_eq!((surface.width(), surface.height()), (800, 696));
    assert_eq!(cache.get().unwrap().size().height, 48);
}

#[test]
fn rendering_twice_is_pixel_identical() {
    let mut rgba = Vec::new();
    for i in 0..(6 * 5) {
        rgba.extend_from_slice(&[(i * 7) as u8, (i * 3) as u8, 90, 255]);
    }
    let img = SourceImage::from_rgba8(6, 5, rgba).unwrap();
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut cache = BackgroundSliceCache::new();
    let cfg = StyleConfig {
        line_height_multiple: 1.25,
        ..band_config("one\ntwo\nthree")
    };

    let mut a = Surface::default();
    comp.render(&mut a, Some(&img), &cfg, &mut cache).unwrap();
    let mut b = a.clone();
    comp.render(&mut b, Some(&img), &cfg, &mut cache).unwrap();
    assert_eq!(a, b);
}

#[test]
fn slice_is_reused_across_style_changes_and_recut_on_line_height_change() {
    let img = solid(4, 6, [0, 128, 0, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();

    let mut cfg = band_config("x\ny");
    comp.render(&mut surface, Some(&img), &cfg, &mut cache).unwrap();
    assert_eq!(cache.populate_count(), 1);

    cfg.background_color = Color::rgb(200, 10, 10);
    cfg.text_align = crate::style::config::TextAlign::Right;
    cfg.caption_text = "changed".to_string();
    comp.render(&mut surface, Some(&img), &cfg, &mut cache).unwrap();
    assert_eq!(cache.populate_count(), 1);

    cfg.font_size_px = 3;
    comp.render(&mut surface, Some(&img), &cfg, &mut cache).unwrap();
    assert_eq!(cache.populate_count(), 2);

    let other = solid(4, 6, [1, 2, 3, 255]);
    comp.render(&mut surface, Some(&other), &cfg, &mut cache).unwrap();
    assert_eq!(cache.populate_count(), 3);
}

#[test]
fn invalid_config_is_rejected() {
    let img = solid(2, 2, [0, 0, 0, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();
    let cfg = StyleConfig {
        font_size_px: 0,
        ..StyleConfig::default()
    };
    let err = comp
        .render(&mut surface, Some(&img), &cfg, &mut cache)
        .unwrap_err();
    assert!(matches!(err, CaptionError::Validation(_)));
}

#[test]
fn canvas_past_raster_limits_is_rejected_and_surface_kept() {
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut cache = BackgroundSliceCache::new();
    let img = solid(8, 8, [0, 0, 0, 255]);
    let mut surface = Surface::default();
    comp.render(&mut surface, Some(&img), &band_config("A"), &mut cache)
        .unwrap();
    let before = surface.clone();

    let tall = StyleConfig {
        line_height_multiple: 1.0e9,
        ..band_config("A")
    };
    let err = comp
        .render(&mut surface, Some(&img), &tall, &mut cache)
        .unwrap_err();
    assert!(matches!(err, CaptionError::Validation(_)));
    assert_eq!(surface, before);

    let wide = solid(65_536, 1, [0, 0, 0, 255]);
    let err = comp
        .render(&mut surface, Some(&wide), &band_config(""), &mut cache)
        .unwrap_err();
    assert!(matches!(err, CaptionError::Validation(_)));
    assert_eq!(surface, before);
}

#[test]
fn maximum_blur_renders() {
    let img = solid(3, 3, [90, 60, 30, 255]);
    let mut comp = SubtitleCompositor::new(FontBook::new());
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();
    let cfg = StyleConfig {
        backdrop_blur_px: crate::style::config::MAX_BACKDROP_BLUR_PX,
        ..band_config("A")
    };
    let g = comp
        .render(&mut surface, Some(&img), &cfg, &mut cache)
        .unwrap()
        .unwrap();
    assert_eq!(g.line_count, 1);
    assert_eq!(surface.height(), 7);
}

#[test]
fn text_is_drawn_inside_its_band_when_a_font_is_available() {
    let fonts = FontBook::with_system_fonts();
    if fonts.face_count() == 0 {
        return;
    }
    let img = solid(200, 20, [0, 0, 0, 255]);
    let mut comp = SubtitleCompositor::new(fonts);
    let mut surface = Surface::default();
    let mut cache = BackgroundSliceCache::new();
    let cfg = StyleConfig {
        caption_text: "HELLO".to_string(),
        font_size_px: 24,
        background_opacity_pct: 0,
        outline_width_px: 0,
        ..StyleConfig::default()
    };

    comp.render(&mut surface, Some(&img), &cfg, &mut cache).unwrap();
    assert_eq!(surface.height(), 56);

    let mut inked = 0;
    for y in 20..56 {
        for x in 0..200 {
            if surface.pixel(x, y)[3] > 0 {
                inked += 1;
            }
        }
    }
    assert!(inked > 0, "expected glyph pixels in the band");
}

use super::*;

use crate::foundation::core::Size;

fn half_red_surface() -> Surface {
    let mut s = Surface::new(Size::new(2, 2));
    for px in s.data_mut().chunks_exact_mut(4) {
        // 50% red, premultiplied.
        px.copy_from_slice(&[128, 0, 0, 128]);
    }
    s
}

#[test]
fn format_parsing() {
    assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
    assert_eq!(
        "JPG".parse::<ExportFormat>().unwrap(),
        ExportFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY
        }
    );
    assert_eq!(
        "jpeg:75".parse::<ExportFormat>().unwrap(),
        ExportFormat::Jpeg { quality: 75 }
    );
    assert!("jpeg:101".parse::<ExportFormat>().is_err());
    assert!("gif".parse::<ExportFormat>().is_err());
    assert!("png:3".parse::<ExportFormat>().is_err());
}

#[test]
fn file_name_uses_timestamp_and_extension() {
    assert_eq!(
        export_file_name(1_700_000_000_123, ExportFormat::Png),
        "caption_1700000000123.png"
    );
    assert_eq!(
        export_file_name(5, ExportFormat::Jpeg { quality: 10 }),
        "caption_5.jpg"
    );
}

#[test]
fn png_keeps_straight_alpha() {
    let bytes = encode_surface(&half_red_surface(), ExportFormat::Png).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 128]);
}

#[test]
fn jpeg_flattens_onto_black() {
    let bytes = encode_surface(&half_red_surface(), ExportFormat::Jpeg { quality: 100 }).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    let [r, g, b] = img.get_pixel(0, 0).0;
    assert!((i32::from(r) - 128).abs() <= 6, "r = {r}");
    assert!(g <= 6 && b <= 6);
}

#[test]
fn empty_surface_is_an_encode_error() {
    let err = encode_surface(&Surface::default(), ExportFormat::Png).unwrap_err();
    assert!(matches!(err, CaptionError::Encode(_)));
}

#[test]
fn data_uri_parses_back() {
    let uri = data_uri("image/png", &[1, 2, 3, 250]);
    assert!(uri.starts_with("data:image/png;base64,"));
    let (mime, bytes) = parse_data_uri(&uri).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, vec![1, 2, 3, 250]);

    assert!(parse_data_uri("image/png;base64,AAAA").is_err());
    assert!(parse_data_uri("data:image/png,AAAA").is_err());
}

#[test]
fn exported_image_writes_into_dir() {
    let dir = tempfile::tempdir().unwrap();
    let exported = export_surface(&half_red_surface(), ExportFormat::Png, 42).unwrap();
    assert_eq!(exported.mime, "image/png");
    let path = exported.write_to_dir(&dir.path().join("out")).unwrap();
    assert_eq!(path.file_name().unwrap(), "caption_42.png");
    assert_eq!(std::fs::read(path).unwrap(), exported.bytes);
}

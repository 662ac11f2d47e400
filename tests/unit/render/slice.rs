use super::*;

fn striped(width: u32, height: u32) -> SourceImage {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for _ in 0..width {
            rgba.extend_from_slice(&[y as u8, 0, 0, 255]);
        }
    }
    SourceImage::from_rgba8(width, height, rgba).unwrap()
}

#[test]
fn cut_takes_bottom_rows() {
    let img = striped(3, 10);
    let slice = BackgroundSlice::cut(&img, 4.0, 0).unwrap();
    assert_eq!(slice.size(), Size::new(3, 4));
    let first_row_red = slice.rgba8_premul()[0];
    let last_row_red = slice.rgba8_premul()[(3 * 3) * 4];
    assert_eq!(first_row_red, 6);
    assert_eq!(last_row_red, 9);
}

#[test]
fn cut_clamps_rows_to_image_and_at_least_one() {
    let img = striped(2, 5);
    assert_eq!(BackgroundSlice::cut(&img, 48.0, 0).unwrap().size(), Size::new(2, 5));
    assert_eq!(BackgroundSlice::cut(&img, 0.4, 0).unwrap().size(), Size::new(2, 1));
    assert_eq!(BackgroundSlice::cut(&img, 2.9, 0).unwrap().size(), Size::new(2, 2));
}

#[test]
fn cache_reuses_same_key_and_recuts_on_change() {
    let img = striped(4, 8);
    let mut cache = BackgroundSliceCache::new();
    assert!(cache.get().is_none());

    cache.get_or_populate(&img, 3.0, 0).unwrap();
    cache.get_or_populate(&img, 3.0, 0).unwrap();
    assert_eq!(cache.populate_count(), 1);

    let slice = cache.get_or_populate(&img, 5.0, 0).unwrap();
    assert_eq!(slice.size().height, 5);
    assert_eq!(cache.populate_count(), 2);

    cache.get_or_populate(&img, 5.0, 2).unwrap();
    assert_eq!(cache.populate_count(), 3);

    let other = striped(4, 9);
    cache.get_or_populate(&other, 5.0, 2).unwrap();
    assert_eq!(cache.populate_count(), 4);
}

#[test]
fn sync_only_invalidates_on_key_change() {
    let img = striped(2, 6);
    let mut cache = BackgroundSliceCache::new();
    cache.populate(&img, 2.0, 0).unwrap();

    cache.sync(SliceKey::new(&img, 2.0, 0));
    assert!(cache.get().is_some());

    cache.sync(SliceKey::new(&img, 3.0, 0));
    assert!(cache.get().is_none());

    cache.populate(&img, 2.0, 0).unwrap();
    cache.invalidate();
    assert!(cache.get().is_none());
}

use super::*;

use crate::session::store::MemoryStore;
use time::macros::datetime;

fn at(secs: i64) -> OffsetDateTime {
    datetime!(2025-01-01 00:00 UTC) + time::Duration::seconds(secs)
}

fn insert(store: &mut RecentImageStore, rendered: &str, t: OffsetDateTime) -> bool {
    store.insert(
        rendered.to_string(),
        "data:image/png;base64,AA==".to_string(),
        StyleConfig::default(),
        t,
    )
}

#[test]
fn newest_first_and_capped() {
    let mut s = RecentImageStore::new();
    for i in 0..8 {
        assert!(insert(&mut s, &format!("img-{i}"), at(i)));
    }
    assert_eq!(s.len(), MAX_RECENT_IMAGES);
    assert_eq!(s.get(0).unwrap().rendered_image, "img-7");
    assert_eq!(s.get(5).unwrap().rendered_image, "img-2");
}

#[test]
fn duplicate_rendered_image_is_ignored() {
    let mut s = RecentImageStore::new();
    assert!(insert(&mut s, "same", at(0)));
    assert!(insert(&mut s, "other", at(1)));
    assert!(!insert(&mut s, "same", at(2)));
    assert_eq!(s.len(), 2);
    assert_eq!(s.get(0).unwrap().rendered_image, "other");
}

#[test]
fn ids_stay_strictly_increasing_within_one_millisecond() {
    let mut s = RecentImageStore::new();
    let t = at(10);
    insert(&mut s, "a", t);
    insert(&mut s, "b", t);
    insert(&mut s, "c", t);
    let ids: Vec<u64> = s.records().iter().map(|r| r.id).collect();
    assert!(ids[0] > ids[1] && ids[1] > ids[2]);
}

#[test]
fn remove_out_of_range_is_none() {
    let mut s = RecentImageStore::new();
    insert(&mut s, "a", at(0));
    assert!(s.remove(3).is_none());
    assert_eq!(s.remove(0).unwrap().rendered_image, "a");
    assert!(s.is_empty());
}

#[test]
fn persists_with_rfc3339_timestamps() {
    let mut kv = MemoryStore::new();
    let mut s = RecentImageStore::new();
    insert(&mut s, "a", at(0));
    insert(&mut s, "b", at(1));
    s.persist(&mut kv).unwrap();

    let raw = kv.get(RECENT_IMAGES_KEY).unwrap().unwrap();
    assert!(raw.contains("\"timestamp\":\"2025-01-01T00:00:01Z\""));
    assert!(raw.contains("\"renderedImage\":\"b\""));

    let loaded = RecentImageStore::load(&kv);
    assert_eq!(loaded.records(), s.records());
}

#[test]
fn corrupt_list_loads_empty() {
    let mut kv = MemoryStore::new();
    kv.set(RECENT_IMAGES_KEY, "[{\"id\":").unwrap();
    assert!(RecentImageStore::load(&kv).is_empty());
}

#[test]
fn loads_legacy_field_names() {
    let mut kv = MemoryStore::new();
    kv.set(
        RECENT_IMAGES_KEY,
        r#"[{"id":1,"imageData":"data:image/png;base64,AA==","originalImageData":"data:image/png;base64,AQ==","timestamp":"2024-05-01T10:00:00.000Z"}]"#,
    )
    .unwrap();
    let loaded = RecentImageStore::load(&kv);
    assert_eq!(loaded.len(), 1);
    let r = loaded.get(0).unwrap();
    assert_eq!(r.source_image, "data:image/png;base64,AQ==");
    assert_eq!(r.style_snapshot, StyleConfig::default());
}

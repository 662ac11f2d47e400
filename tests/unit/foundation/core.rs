use super::*;

#[test]
fn premul_from_straight_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(
        Rgba8Premul::from_straight_rgba(10, 20, 30, 0),
        Rgba8Premul::transparent()
    );
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = vec![200u8, 100, 50, 128, 1, 2, 3, 255, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[4..8], &[1, 2, 3, 255]);
    assert_eq!(&px[8..12], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[..3].iter().zip([200u8, 100, 50]) {
        assert!((i32::from(*got) - i32::from(want)).abs() <= 1);
    }
}

#[test]
fn size_rgba8_len() {
    assert_eq!(Size::new(3, 2).rgba8_len(), 24);
    assert_eq!(Size::new(0, 10).rgba8_len(), 0);
}

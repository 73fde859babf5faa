use super::*;

#[test]
fn rejects_zero_and_oversized_sides() {
    assert!(Surface::with_side(0).is_err());
    assert!(Surface::with_side(70_000).is_err());
}

#[test]
fn clear_then_read_back_returns_straight_colour() {
    let mut s = Surface::with_side(4).unwrap();
    s.clear([10, 20, 30, 255]);
    let frame = s.read_back().unwrap();
    assert_eq!(frame.width, 4);
    assert_eq!(frame.height, 4);
    assert!(frame.data.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}

#[test]
fn read_back_unpremultiplies() {
    let mut s = Surface::with_side(2).unwrap();
    s.clear([64, 0, 0, 128]);
    let frame = s.read_back().unwrap();
    assert_eq!(frame.pixel(1, 1), Some([128, 0, 0, 128]));
    assert_eq!(frame.pixel(2, 0), None);
}

#[test]
fn new_uses_resolution_side() {
    let s = Surface::new(Resolution::new(100).unwrap()).unwrap();
    assert_eq!(s.size(), 100);
    assert_eq!(s.premul_bytes().len(), 100 * 100 * 4);
}

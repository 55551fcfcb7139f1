use super::*;

#[test]
fn frame_span_contains_boundaries() {
    let s = FrameSpan::new(2, 5).unwrap();
    assert!(!s.contains(1));
    assert!(s.contains(2));
    assert!(s.contains(5));
    assert!(!s.contains(6));
}

#[test]
fn frame_span_rejects_inverted_bounds() {
    assert!(FrameSpan::new(5, 4).is_err());
    assert!(FrameSpan::new(4, 4).is_ok());
}

#[test]
fn frame_span_len_and_iteration() {
    let s = FrameSpan::new(-2, 2).unwrap();
    assert_eq!(s.len_frames(), 5);
    assert_eq!(s.frames().collect::<Vec<_>>(), vec![-2, -1, 0, 1, 2]);
}

#[test]
fn frame_span_shift_moves_both_bounds() {
    let s = FrameSpan::new(1, 3).unwrap().shift(4);
    assert_eq!(s, FrameSpan { start: 5, end: 7 });
}

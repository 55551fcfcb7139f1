use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(200, 128), 100);
}

#[test]
fn opacity_to_alpha_endpoints() {
    assert_eq!(opacity_to_alpha(0), 0);
    assert_eq!(opacity_to_alpha(100), 255);
}

#[test]
fn opacity_to_alpha_rounds_to_nearest() {
    // 1 * 2.55 = 2.55 -> 3, 2 * 2.55 = 5.1 -> 5
    assert_eq!(opacity_to_alpha(1), 3);
    assert_eq!(opacity_to_alpha(2), 5);
    assert_eq!(opacity_to_alpha(40), 102);
    assert_eq!(opacity_to_alpha(20), 51);
}

#[test]
fn opacity_to_alpha_rounds_exact_halves_up() {
    let ties = [10, 30, 50, 70, 90].map(|op| (op, opacity_to_alpha(op)));
    assert_eq!(ties, [(10, 26), (30, 77), (50, 128), (70, 179), (90, 230)]);
}

#[test]
fn opacity_to_alpha_matches_float_rounding_off_ties() {
    for op in (0..=100u8).filter(|op| op % 20 != 10) {
        let expected = (f64::from(op) * 2.55).round() as u8;
        assert_eq!(opacity_to_alpha(op), expected, "opacity {op}");
    }
}

#[test]
fn opacity_to_alpha_clamps_out_of_range_opacity() {
    assert_eq!(opacity_to_alpha(200), 255);
}

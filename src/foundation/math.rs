pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Convert a host layer opacity (`0..=100`) to an 8-bit alpha (`0..=255`).
///
/// Exact `round(op * 2.55)` with halves rounded up; `op` above 100 clamps to 255.
pub fn opacity_to_alpha(opacity: u8) -> u8 {
    ((u16::from(opacity.min(100)) * 51 + 10) / 20) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

use image::RgbaImage;

use crate::foundation::error::{CelError, CelResult};
use crate::foundation::math::mul_div255_u8;

/// Straight (non-premultiplied) RGBA8 pixel, as stored in PNG files.
pub type StraightRgba8 = [u8; 4];

/// Straight-alpha source-over: `src` drawn on top of `dst`.
pub fn over(dst: StraightRgba8, src: StraightRgba8) -> StraightRgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let dst_w = u32::from(dst[3]) * (255 - sa);
    let out_a255 = sa * 255 + dst_w;
    if out_a255 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * dst_w;
        out[i] = ((c + out_a255 / 2) / out_a255).min(255) as u8;
    }
    out[3] = ((out_a255 + 127) / 255).min(255) as u8;
    out
}

/// Scale every pixel's alpha by `alpha / 255`.
pub fn apply_layer_alpha(img: &mut RgbaImage, alpha: u8) {
    if alpha == 255 {
        return;
    }
    for px in img.pixels_mut() {
        px.0[3] = mul_div255_u8(u16::from(px.0[3]), u16::from(alpha));
    }
}

/// Draw `src` over `dst` in place. Both images must have the same dimensions.
pub fn over_in_place(dst: &mut RgbaImage, src: &RgbaImage) -> CelResult<()> {
    if dst.dimensions() != src.dimensions() {
        return Err(CelError::validation(format!(
            "cannot composite a {}x{} image over a {}x{} one",
            src.width(),
            src.height(),
            dst.width(),
            dst.height()
        )));
    }
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        d.0 = over(d.0, s.0);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/alpha.rs"]
mod tests;

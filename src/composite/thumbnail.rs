use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::foundation::error::{CelError, CelResult};

/// Background used under transparent thumbnails when none is given.
pub const DEFAULT_THUMBNAIL_BG: [u8; 3] = [255, 255, 255];

/// Save `src` as a JPEG thumbnail at `dst`.
///
/// Images with alpha are flattened over `bg` (white when `None`).
#[tracing::instrument(skip_all, fields(src = %src.display(), dst = %dst.display()))]
pub fn write_thumbnail(src: &Path, dst: &Path, bg: Option<[u8; 3]>) -> CelResult<()> {
    let source = image::open(src).map_err(|e| CelError::image(src, e))?;
    let flat = if source.color().has_alpha() {
        flatten(&source, bg.unwrap_or(DEFAULT_THUMBNAIL_BG))
    } else {
        source.into_rgb8()
    };

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CelError::io(parent, e))?;
    }
    flat.save_with_format(dst, ImageFormat::Jpeg)
        .map_err(|e| CelError::image(dst, e))
}

fn flatten(source: &DynamicImage, bg: [u8; 3]) -> RgbImage {
    let rgba = source.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (d, s) in out.pixels_mut().zip(rgba.pixels()) {
        let a = u32::from(s.0[3]);
        let mut px = [0u8; 3];
        for i in 0..3 {
            px[i] = ((u32::from(s.0[i]) * a + u32::from(bg[i]) * (255 - a) + 127) / 255) as u8;
        }
        *d = Rgb(px);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/thumbnail.rs"]
mod tests;

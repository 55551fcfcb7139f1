use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::composite::alpha::{apply_layer_alpha, over_in_place};
use crate::foundation::core::{Canvas, Frame, FrameSpan, LayerId};
use crate::foundation::error::{CelError, CelResult};
use crate::foundation::math::opacity_to_alpha;
use crate::render::layer::LayerFiles;
use crate::scene::layer::Layer;

/// Layer attributes the compositor needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeLayer {
    /// Layer id, the key into the per-layer file maps.
    pub id: LayerId,
    /// Stacking position; higher is further back.
    pub position: i64,
    /// Opacity in `0..=100`.
    pub opacity: u8,
}

impl From<&Layer> for CompositeLayer {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id.clone(),
            position: layer.position,
            opacity: layer.opacity,
        }
    }
}

/// Solid colour drawn behind every layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Background {
    /// Opaque RGB colour.
    pub rgb: [u8; 3],
    /// Size of the background plate; layer images must match it.
    pub canvas: Canvas,
}

/// Compositor options.
#[derive(Clone, Debug)]
pub struct CompositeOpts {
    /// Only composite these frames. `None` composites the whole range.
    pub export_frames: Option<BTreeSet<Frame>>,
    /// Delete the per-layer source files afterwards.
    pub cleanup: bool,
    /// Treat every layer as fully opaque.
    pub ignore_layer_opacity: bool,
    /// Optional background plate.
    pub background: Option<Background>,
}

impl Default for CompositeOpts {
    fn default() -> Self {
        Self {
            export_frames: None,
            cleanup: true,
            ignore_layer_opacity: false,
            background: None,
        }
    }
}

/// Result of [`composite_layers`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeOutput {
    /// Written frame files.
    pub files: BTreeMap<Frame, PathBuf>,
    /// `(width, height)` of the composited frames.
    pub size: (u32, u32),
    /// Frames written as fully transparent images.
    pub transparent_frames: BTreeSet<Frame>,
}

/// Flatten per-layer frame files into one image per frame.
///
/// Layers are drawn back to front (highest position first). Frames no layer contributes to
/// are written as transparent images once a reference size is known.
#[tracing::instrument(skip_all, fields(layers = layers.len(), start = range.start, end = range.end))]
pub fn composite_layers(
    layers: &[CompositeLayer],
    files_by_layer: &BTreeMap<LayerId, LayerFiles>,
    range: FrameSpan,
    dst_by_frame: &BTreeMap<Frame, PathBuf>,
    opts: &CompositeOpts,
) -> CelResult<CompositeOutput> {
    let mut ordered: Vec<&CompositeLayer> = layers.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));

    let mut files = BTreeMap::new();
    let mut transparent = BTreeMap::new();
    let mut size = opts
        .background
        .map(|bg| (bg.canvas.width, bg.canvas.height));

    for frame in range.frames() {
        if let Some(export) = &opts.export_frames
            && !export.contains(&frame)
        {
            continue;
        }
        let dst = dst_by_frame.get(&frame).ok_or_else(|| {
            CelError::validation(format!("no output path bound for frame {frame}"))
        })?;

        let sources: Vec<(&Path, u8)> = ordered
            .iter()
            .filter_map(|layer| {
                let path = files_by_layer.get(&layer.id)?.get(&frame)?.as_deref()?;
                let alpha = if opts.ignore_layer_opacity {
                    255
                } else {
                    opacity_to_alpha(layer.opacity)
                };
                Some((path, alpha))
            })
            .collect();

        let Some(image) = composite_frame(&sources, opts.background.as_ref())? else {
            transparent.insert(frame, dst.clone());
            continue;
        };
        save_png(&image, dst)?;
        size.get_or_insert(image.dimensions());
        files.insert(frame, dst.clone());
    }

    let Some((width, height)) = size else {
        return Err(CelError::NoCompositeInput);
    };
    if !transparent.is_empty() {
        let blank = RgbaImage::new(width, height);
        for dst in transparent.values() {
            save_png(&blank, dst)?;
        }
        tracing::debug!(frames = transparent.len(), "wrote transparent frames");
    }

    if opts.cleanup {
        cleanup_layer_files(files_by_layer)?;
    }

    let transparent_frames = transparent.keys().copied().collect();
    files.extend(transparent);
    tracing::info!(frames = files.len(), width, height, "composited frames");
    Ok(CompositeOutput {
        files,
        size: (width, height),
        transparent_frames,
    })
}

fn composite_frame(
    sources: &[(&Path, u8)],
    background: Option<&Background>,
) -> CelResult<Option<RgbaImage>> {
    let mut acc = background.map(|bg| {
        let [r, g, b] = bg.rgb;
        RgbaImage::from_pixel(bg.canvas.width, bg.canvas.height, Rgba([r, g, b, 255]))
    });

    for &(path, alpha) in sources {
        let mut layer = image::open(path)
            .map_err(|e| CelError::image(path, e))?
            .into_rgba8();
        apply_layer_alpha(&mut layer, alpha);
        acc = Some(match acc.take() {
            None => layer,
            Some(mut base) => {
                if base.dimensions() != layer.dimensions() {
                    return Err(CelError::validation(format!(
                        "'{}' is {}x{} but the frame is {}x{}",
                        path.display(),
                        layer.width(),
                        layer.height(),
                        base.width(),
                        base.height()
                    )));
                }
                over_in_place(&mut base, &layer)?;
                base
            }
        });
    }
    Ok(acc)
}

fn save_png(image: &RgbaImage, dst: &Path) -> CelResult<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CelError::io(parent, e))?;
    }
    image
        .save_with_format(dst, ImageFormat::Png)
        .map_err(|e| CelError::image(dst, e))
}

/// Delete every distinct per-layer file that still exists.
pub fn cleanup_layer_files(files_by_layer: &BTreeMap<LayerId, LayerFiles>) -> CelResult<usize> {
    let unique: BTreeSet<&Path> = files_by_layer
        .values()
        .flat_map(|files| files.values())
        .filter_map(|path| path.as_deref())
        .collect();

    let mut removed = 0;
    for path in unique {
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| CelError::io(path, e))?;
            removed += 1;
        }
    }
    tracing::debug!(removed, "removed layer files");
    Ok(removed)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;

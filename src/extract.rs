use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::composite::compositor::{
    Background, CompositeLayer, CompositeOpts, composite_layers,
};
use crate::composite::thumbnail::write_thumbnail;
use crate::foundation::core::{Frame, FrameSpan, LayerId};
use crate::foundation::error::{CelError, CelResult};
use crate::output::rename::rename_by_frame_start;
use crate::plan::extraction::{PlanOpts, plan_extraction};
use crate::plan::template::FrameNameTemplate;
use crate::render::gaps::fill_sequence_gaps;
use crate::render::layer::{LayerFiles, LayerRenderStats, RenderThreading, render_layers};
use crate::render::renderer::FrameRenderer;
use crate::scene::document::Scene;

/// Filename prefix of composited output frames.
pub const OUTPUT_PREFIX: &str = "render.";
/// Filename of the optional thumbnail.
pub const THUMBNAIL_NAME: &str = "thumbnail.jpg";

/// Options for [`extract_sequence`].
#[derive(Clone, Debug)]
pub struct ExtractOpts {
    /// Directory receiving layer intermediates and the final sequence.
    pub output_dir: PathBuf,
    /// Renumber the sequence to start here. Negative values clamp to `0`.
    pub output_frame_start: Option<Frame>,
    /// Only produce these frames (inside `[mark_in, mark_out]`). Disables renumbering.
    pub export_frames: Option<BTreeSet<Frame>>,
    /// Composite every layer at full opacity.
    pub ignore_layer_opacity: bool,
    /// Solid RGB background behind all layers; needs the scene canvas.
    pub background: Option<[u8; 3]>,
    /// Write `thumbnail.jpg` from the first output frame.
    pub thumbnail: bool,
    /// Thumbnail background, white when unset.
    pub thumbnail_bg: Option<[u8; 3]>,
    /// Keep per-layer files after compositing.
    pub keep_intermediates: bool,
    /// Layer rendering concurrency.
    pub threading: RenderThreading,
    /// Render layers whose visibility flag is off.
    pub include_hidden: bool,
}

impl ExtractOpts {
    /// Defaults writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_frame_start: None,
            export_frames: None,
            ignore_layer_opacity: false,
            background: None,
            thumbnail: false,
            thumbnail_bg: None,
            keep_intermediates: false,
            threading: RenderThreading::default(),
            include_hidden: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counters for one extraction run.
pub struct ExtractStats {
    /// Layers that were rendered.
    pub layers: usize,
    /// Summed per-layer render counters.
    pub render: LayerRenderStats,
    /// Frames filled by the gap filler.
    pub gap_frames: usize,
    /// Output frames written as fully transparent images.
    pub transparent_frames: usize,
}

/// Result of [`extract_sequence`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOutput {
    /// Final output files by (renumbered) frame.
    pub files: BTreeMap<Frame, PathBuf>,
    /// Thumbnail path when one was written.
    pub thumbnail: Option<PathBuf>,
    /// Counters.
    pub stats: ExtractStats,
}

/// Run the whole extraction: plan, render, fill gaps, composite, renumber, thumbnail.
#[tracing::instrument(
    skip_all,
    fields(layers = scene.layers.len(), mark_in = scene.mark_in, mark_out = scene.mark_out)
)]
pub fn extract_sequence<R>(scene: &Scene, renderer: &R, opts: &ExtractOpts) -> CelResult<ExtractOutput>
where
    R: FrameRenderer + Sync + ?Sized,
{
    scene.validate()?;
    let range = scene.render_range()?;
    let export = validated_export_frames(opts.export_frames.as_ref(), range)?;
    let background = match opts.background {
        Some(rgb) => {
            let canvas = scene.canvas.ok_or_else(|| {
                CelError::validation("a background colour needs the scene canvas size")
            })?;
            Some(Background { rgb, canvas })
        }
        None => None,
    };

    let plan = plan_extraction(
        &scene.layers,
        range,
        &PlanOpts {
            skip_invisible: !opts.include_hidden,
            ..PlanOpts::default()
        },
    );
    if plan.is_empty() {
        return Err(CelError::EmptyPlan);
    }
    tracing::info!(
        layers = plan.len(),
        renders = plan.render_call_count(),
        "planned extraction"
    );

    let out_dir = opts.output_dir.as_path();
    let rendered = render_layers(renderer, &plan, out_dir, &opts.threading, export)?;

    let mut stats = ExtractStats {
        layers: rendered.len(),
        ..ExtractStats::default()
    };
    let frames: BTreeSet<Frame> = match export {
        Some(set) => set.clone(),
        None => range.frames().collect(),
    };
    let mut files_by_layer: BTreeMap<LayerId, LayerFiles> = BTreeMap::new();
    for (layer_id, mut layer) in rendered {
        stats.render.merge(layer.stats);
        if let Some(layer_plan) = plan.get(&layer_id) {
            stats.gap_frames += fill_sequence_gaps(&mut layer.files, layer_plan, out_dir, &frames)?;
        }
        files_by_layer.insert(layer_id, layer.files);
    }

    let layers: Vec<CompositeLayer> = scene
        .layers
        .iter()
        .filter(|layer| files_by_layer.contains_key(&layer.id))
        .map(CompositeLayer::from)
        .collect();
    let template = FrameNameTemplate::new(range.end, Some(OUTPUT_PREFIX), None);
    let dst_by_frame: BTreeMap<Frame, PathBuf> = range
        .frames()
        .map(|frame| (frame, out_dir.join(template.format(frame))))
        .collect();
    let composite = composite_layers(
        &layers,
        &files_by_layer,
        range,
        &dst_by_frame,
        &CompositeOpts {
            export_frames: export.cloned(),
            cleanup: !opts.keep_intermediates,
            ignore_layer_opacity: opts.ignore_layer_opacity,
            background,
        },
    )?;
    stats.transparent_frames = composite.transparent_frames.len();

    let files = match (export, opts.output_frame_start) {
        (None, Some(start)) => {
            let start = if start < 0 {
                tracing::warn!(start, "negative output frame start, using 0");
                0
            } else {
                start
            };
            rename_by_frame_start(
                &composite.files,
                range,
                start,
                Some(OUTPUT_PREFIX),
                None,
            )?
        }
        _ => composite.files,
    };

    let thumbnail = match (opts.thumbnail, files.values().next()) {
        (true, Some(first)) => {
            let dst = out_dir.join(THUMBNAIL_NAME);
            write_thumbnail(first, &dst, opts.thumbnail_bg)?;
            Some(dst)
        }
        _ => None,
    };

    tracing::info!(
        frames = files.len(),
        rendered = stats.render.rendered,
        gap_frames = stats.gap_frames,
        "extraction finished"
    );
    Ok(ExtractOutput {
        files,
        thumbnail,
        stats,
    })
}

fn validated_export_frames(
    export: Option<&BTreeSet<Frame>>,
    range: FrameSpan,
) -> CelResult<Option<&BTreeSet<Frame>>> {
    let Some(set) = export else {
        return Ok(None);
    };
    if set.is_empty() {
        return Err(CelError::validation("export frame set must not be empty"));
    }
    if let Some(outside) = set.iter().find(|f| !range.contains(**f)) {
        return Err(CelError::validation(format!(
            "export frame {outside} is outside the mark range {}..={}",
            range.start, range.end
        )));
    }
    Ok(Some(set))
}

#[cfg(test)]
#[path = "../tests/unit/extract.rs"]
mod tests;

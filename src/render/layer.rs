use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::core::{Frame, LayerId};
use crate::foundation::error::{CelError, CelResult};
use crate::plan::extraction::{ExtractionPlan, LayerPlan};
use crate::render::link::{LinkKind, link_or_copy};
use crate::render::renderer::FrameRenderer;

/// Per-frame files of one layer. `None` marks a transparent frame; absent frames were never
/// requested.
pub type LayerFiles = BTreeMap<Frame, Option<PathBuf>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counters collected while rendering a layer.
pub struct LayerRenderStats {
    /// Collaborator calls.
    pub rendered: u64,
    /// Copy frames materialised as hard links.
    pub linked: u64,
    /// Copy frames materialised as byte copies.
    pub copied: u64,
    /// Frames recorded as transparent.
    pub transparent: u64,
}

impl LayerRenderStats {
    /// Add `other` into `self`.
    pub fn merge(&mut self, other: LayerRenderStats) {
        self.rendered += other.rendered;
        self.linked += other.linked;
        self.copied += other.copied;
        self.transparent += other.transparent;
    }
}

/// Files and counters produced for one layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedLayer {
    /// Frame to file map.
    pub files: LayerFiles,
    /// Counters.
    pub stats: LayerRenderStats,
}

#[derive(Clone, Debug, Default)]
/// Threading controls for [`render_layers`].
pub struct RenderThreading {
    /// Render layers concurrently on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

/// Render one planned layer into `out_dir`.
///
/// Render frames are produced first, then copy frames are linked to them. With
/// `export_frames`, only those keys are produced and each is rendered straight from its
/// reference frame. On failure, files already written are left in place.
#[tracing::instrument(skip(renderer, plan, out_dir, export_frames))]
pub fn render_layer<R>(
    renderer: &R,
    layer_id: &str,
    plan: &LayerPlan,
    out_dir: &Path,
    export_frames: Option<&BTreeSet<Frame>>,
) -> CelResult<RenderedLayer>
where
    R: FrameRenderer + ?Sized,
{
    let mut job = LayerJob {
        renderer,
        layer_id,
        plan,
        out_dir,
        dir_ready: false,
        out: RenderedLayer::default(),
    };

    match export_frames {
        Some(frames) => {
            for &frame in frames {
                match plan.frame_references.target(frame) {
                    None => {}
                    Some(None) => job.mark_transparent(frame),
                    Some(Some(source)) => job.render(source, frame)?,
                }
            }
        }
        None => {
            for frame in plan.frames_to_render() {
                job.render(frame, frame)?;
            }
            for (frame, source) in plan.frame_references.copy_frames() {
                job.link(source, frame)?;
            }
            for (&frame, target) in plan.frame_references.as_map() {
                if target.is_none() {
                    job.mark_transparent(frame);
                }
            }
        }
    }

    tracing::debug!(
        rendered = job.out.stats.rendered,
        linked = job.out.stats.linked,
        copied = job.out.stats.copied,
        transparent = job.out.stats.transparent,
        "layer rendered"
    );
    Ok(job.out)
}

/// Render every layer of `plan` into `out_dir`, optionally across a rayon pool.
#[tracing::instrument(skip(renderer, plan, out_dir, export_frames), fields(layers = plan.len()))]
pub fn render_layers<R>(
    renderer: &R,
    plan: &ExtractionPlan,
    out_dir: &Path,
    threading: &RenderThreading,
    export_frames: Option<&BTreeSet<Frame>>,
) -> CelResult<BTreeMap<LayerId, RenderedLayer>>
where
    R: FrameRenderer + Sync + ?Sized,
{
    if !threading.parallel {
        let mut out = BTreeMap::new();
        for (layer_id, layer_plan) in plan.iter() {
            let rendered = render_layer(renderer, layer_id, layer_plan, out_dir, export_frames)?;
            out.insert(layer_id.clone(), rendered);
        }
        return Ok(out);
    }

    let pool = build_thread_pool(threading.threads)?;
    let layers: Vec<(&LayerId, &LayerPlan)> = plan.iter().collect();
    pool.install(|| {
        layers
            .par_iter()
            .map(|&(layer_id, layer_plan)| {
                render_layer(renderer, layer_id, layer_plan, out_dir, export_frames)
                    .map(|rendered| (layer_id.clone(), rendered))
            })
            .collect()
    })
}

struct LayerJob<'a, R: ?Sized> {
    renderer: &'a R,
    layer_id: &'a str,
    plan: &'a LayerPlan,
    out_dir: &'a Path,
    dir_ready: bool,
    out: RenderedLayer,
}

impl<R: FrameRenderer + ?Sized> LayerJob<'_, R> {
    fn path_for(&self, frame: Frame) -> CelResult<PathBuf> {
        let name = self.plan.filename(frame).ok_or_else(|| {
            CelError::validation(format!(
                "layer '{}' has no filename bound for frame {frame}",
                self.layer_id
            ))
        })?;
        Ok(self.out_dir.join(name))
    }

    fn ensure_dir(&mut self) -> CelResult<()> {
        if !self.dir_ready {
            std::fs::create_dir_all(self.out_dir).map_err(|e| CelError::io(self.out_dir, e))?;
            self.dir_ready = true;
        }
        Ok(())
    }

    /// Render `source` into the file bound to `frame`.
    fn render(&mut self, source: Frame, frame: Frame) -> CelResult<()> {
        let dst = self.path_for(frame)?;
        self.ensure_dir()?;
        self.renderer
            .render_frame(self.layer_id, source, &dst)
            .map_err(|e| CelError::render_failure(self.layer_id, source, &dst, e))?;
        self.out.stats.rendered += 1;
        self.out.files.insert(frame, Some(dst));
        Ok(())
    }

    fn link(&mut self, source: Frame, frame: Frame) -> CelResult<()> {
        let src = match self.out.files.get(&source) {
            Some(Some(path)) => path.clone(),
            _ => self.path_for(source)?,
        };
        let dst = self.path_for(frame)?;
        match link_or_copy(&src, &dst)? {
            LinkKind::HardLink => self.out.stats.linked += 1,
            LinkKind::Copy => self.out.stats.copied += 1,
        }
        self.out.files.insert(frame, Some(dst));
        Ok(())
    }

    fn mark_transparent(&mut self, frame: Frame) {
        self.out.stats.transparent += 1;
        self.out.files.insert(frame, None);
    }
}

fn build_thread_pool(threads: Option<usize>) -> CelResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(CelError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CelError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;

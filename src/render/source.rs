use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Frame;
use crate::render::renderer::FrameRenderer;

/// [`FrameRenderer`] backed by frames already exported to disk.
///
/// Layout: `root/<layer_id>/<frame:04>.png`. A missing frame falls back to the nearest lower
/// exported frame, then to the nearest higher one.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Source reading layer folders under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File that supplies `layer_id` at `frame`.
    pub fn source_for(&self, layer_id: &str, frame: Frame) -> anyhow::Result<PathBuf> {
        let layer_dir = self.root.join(layer_id);
        let exact = layer_dir.join(format!("{frame:04}.png"));
        if exact.is_file() {
            return Ok(exact);
        }

        let mut lower: Option<(Frame, PathBuf)> = None;
        let mut higher: Option<(Frame, PathBuf)> = None;
        let entries = std::fs::read_dir(&layer_dir)
            .with_context(|| format!("failed to list layer folder '{}'", layer_dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let Some(found) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<Frame>().ok())
            else {
                continue;
            };
            let slot = if found < frame {
                &mut lower
            } else {
                &mut higher
            };
            let closer = match slot {
                Some((best, _)) => (found - frame).abs() < (*best - frame).abs(),
                None => true,
            };
            if closer {
                *slot = Some((found, path));
            }
        }

        let (_, picked) = lower.or(higher).with_context(|| {
            format!(
                "no exported frames for layer '{layer_id}' in '{}'",
                layer_dir.display()
            )
        })?;
        Ok(picked)
    }
}

impl FrameRenderer for DirectorySource {
    fn render_frame(&self, layer_id: &str, frame: Frame, dst: &Path) -> anyhow::Result<()> {
        let src = self.source_for(layer_id, frame)?;
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
        }
        std::fs::copy(&src, dst).with_context(|| {
            format!("failed to copy '{}' to '{}'", src.display(), dst.display())
        })?;
        tracing::trace!(layer_id, frame, src = %src.display(), "copied exported frame");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/source.rs"]
mod tests;

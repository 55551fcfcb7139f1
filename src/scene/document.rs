use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Frame, FrameSpan};
use crate::foundation::error::{CelError, CelResult};
use crate::scene::layer::Layer;

/// JSON scene document: the marks to extract and the layers of the timeline.
///
/// This is the configuration surface of the pipeline. Load it with [`Scene::from_path`], then
/// call [`Scene::validate`] before planning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// First frame to extract (mark-in, inclusive).
    pub mark_in: Frame,
    /// Last frame to extract (mark-out, inclusive).
    pub mark_out: Frame,
    /// Project resolution, required only when a background colour is composited.
    #[serde(default)]
    pub canvas: Option<Canvas>,
    /// Timeline layers, in any order.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Scene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| CelError::validation(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| CelError::io(path, e))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check marks and per-layer data for consistency.
    pub fn validate(&self) -> CelResult<()> {
        self.render_range()?;

        let mut ids = BTreeSet::new();
        let mut positions = BTreeSet::new();
        for layer in &self.layers {
            if !ids.insert(layer.id.as_str()) {
                return Err(CelError::validation(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }
            if !positions.insert(layer.position) {
                return Err(CelError::validation(format!(
                    "layer '{}' reuses stacking position {}",
                    layer.id, layer.position
                )));
            }
            let Some(active) = layer.active_span() else {
                return Err(CelError::validation(format!(
                    "layer '{}' frame_start ({}) must be <= frame_end ({})",
                    layer.id, layer.frame_start, layer.frame_end
                )));
            };
            if let Some(f) = layer.exposure_frames.iter().find(|&&f| !active.contains(f)) {
                return Err(CelError::validation(format!(
                    "layer '{}' exposure {f} is outside its active range {}..={}",
                    layer.id, active.start, active.end
                )));
            }
            if layer.opacity > 100 {
                return Err(CelError::validation(format!(
                    "layer '{}' opacity {} is outside 0..=100",
                    layer.id, layer.opacity
                )));
            }
        }

        if let Some(canvas) = self.canvas
            && (canvas.width == 0 || canvas.height == 0)
        {
            return Err(CelError::validation("canvas width/height must be non-zero"));
        }
        Ok(())
    }

    /// The `[mark_in, mark_out]` render range.
    pub fn render_range(&self) -> CelResult<FrameSpan> {
        FrameSpan::new(self.mark_in, self.mark_out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;

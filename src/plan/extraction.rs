use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Frame, FrameSpan, LayerId};
use crate::foundation::error::{CelError, CelResult};
use crate::plan::template::FrameNameTemplate;
use crate::resolve::layer::{FrameReferences, resolve_frame_references};
use crate::scene::layer::Layer;

/// Extraction data for one layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPlan {
    /// Canonical frame references of the layer.
    pub frame_references: FrameReferences,
    /// Relative output filename for every frame the layer may produce.
    pub filenames_by_frame_index: BTreeMap<Frame, String>,
}

impl LayerPlan {
    /// Frames the host must render for this layer.
    pub fn frames_to_render(&self) -> BTreeSet<Frame> {
        self.frame_references.render_frames()
    }

    /// Relative filename bound to `frame`.
    pub fn filename(&self, frame: Frame) -> Option<&str> {
        self.filenames_by_frame_index.get(&frame).map(String::as_str)
    }
}

/// Extraction plan keyed by layer id.
///
/// Filenames are relative; the caller picks the directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionPlan(BTreeMap<LayerId, LayerPlan>);

impl ExtractionPlan {
    /// Plan entry of `layer_id`.
    pub fn get(&self, layer_id: &str) -> Option<&LayerPlan> {
        self.0.get(layer_id)
    }

    /// Iterate `(layer_id, plan)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&LayerId, &LayerPlan)> {
        self.0.iter()
    }

    /// Number of planned layers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when no layer has anything to render.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of host render calls the plan requires.
    pub fn render_call_count(&self) -> usize {
        self.0.values().map(|p| p.frames_to_render().len()).sum()
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json_pretty(&self) -> CelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CelError::validation(format!("serialize plan JSON: {e}")))
    }

    /// Parse a plan previously produced by [`ExtractionPlan::to_json_pretty`].
    pub fn from_json(json: &str) -> CelResult<Self> {
        serde_json::from_str(json).map_err(|e| CelError::validation(format!("parse plan JSON: {e}")))
    }
}

/// Planner options.
#[derive(Clone, Debug)]
pub struct PlanOpts {
    /// Prefix placed before `pos_{position}.` in filenames.
    pub prefix: Option<String>,
    /// Filename extension, `.png` when unset.
    pub ext: Option<String>,
    /// Skip layers whose visibility flag is off.
    pub skip_invisible: bool,
}

impl Default for PlanOpts {
    fn default() -> Self {
        Self {
            prefix: None,
            ext: None,
            skip_invisible: true,
        }
    }
}

/// Compute the extraction plan for `layers` over `range`.
///
/// Pure and total. Layers with nothing to render are left out.
#[tracing::instrument(skip(layers, opts), fields(layers = layers.len()))]
pub fn plan_extraction(layers: &[Layer], range: FrameSpan, opts: &PlanOpts) -> ExtractionPlan {
    let mut out = BTreeMap::new();
    for layer in layers {
        if opts.skip_invisible && !layer.visible {
            tracing::debug!(layer = layer.label(), "skipping hidden layer");
            continue;
        }

        let frame_references = resolve_frame_references(layer, range);
        let frames_to_render = frame_references.render_frames();
        if frames_to_render.is_empty() {
            tracing::debug!(layer = layer.label(), "layer has nothing to render in range");
            continue;
        }

        let template = FrameNameTemplate::for_layer(
            range.end,
            layer.position,
            opts.prefix.as_deref(),
            opts.ext.as_deref(),
        );
        let filenames_by_frame_index = range
            .frames()
            .chain(frames_to_render.iter().copied())
            .map(|frame| (frame, template.format(frame)))
            .collect();

        tracing::debug!(
            layer = layer.label(),
            render = frames_to_render.len(),
            mapped = frame_references.len(),
            "planned layer"
        );
        out.insert(
            layer.id.clone(),
            LayerPlan {
                frame_references,
                filenames_by_frame_index,
            },
        );
    }
    ExtractionPlan(out)
}

#[cfg(test)]
#[path = "../../tests/unit/plan/extraction.rs"]
mod tests;

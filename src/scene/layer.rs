use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::core::{Frame, FrameSpan, LayerId};

/// Extrapolation policy applied before a layer's first frame or after its last one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Transparent outside the active range.
    #[default]
    None,
    /// Hold the nearest exposure.
    Hold,
    /// Loop the active range.
    Repeat,
    /// Bounce back and forth over the active range.
    Pingpong,
}

/// One timeline layer as reported by the host application.
///
/// Layers are ingested once and never mutated by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Opaque identifier. Integer ids from older hosts are accepted and stringified.
    #[serde(deserialize_with = "deserialize_layer_id")]
    pub id: LayerId,
    /// Display name, used in logs only.
    #[serde(default)]
    pub name: String,
    /// Stacking position; higher values sit further back.
    pub position: i64,
    /// Hidden layers are skipped by default.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opacity in `0..=100`.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    /// First active frame (inclusive).
    pub frame_start: Frame,
    /// Last active frame (inclusive).
    pub frame_end: Frame,
    /// Frames holding an authored key image.
    #[serde(default)]
    pub exposure_frames: BTreeSet<Frame>,
    /// Extrapolation before `frame_start`.
    #[serde(default)]
    pub pre_behavior: Behavior,
    /// Extrapolation after `frame_end`.
    #[serde(default)]
    pub post_behavior: Behavior,
}

impl Layer {
    /// Create a visible, fully opaque layer with no exposures and `none` behaviors.
    pub fn new(id: impl Into<LayerId>, position: i64, frame_start: Frame, frame_end: Frame) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            position,
            visible: true,
            opacity: 100,
            frame_start,
            frame_end,
            exposure_frames: BTreeSet::new(),
            pre_behavior: Behavior::None,
            post_behavior: Behavior::None,
        }
    }

    /// Replace the exposure frames.
    pub fn with_exposures(mut self, frames: impl IntoIterator<Item = Frame>) -> Self {
        self.exposure_frames = frames.into_iter().collect();
        self
    }

    /// Replace pre- and post-behavior.
    pub fn with_behaviors(mut self, pre: Behavior, post: Behavior) -> Self {
        self.pre_behavior = pre;
        self.post_behavior = post;
        self
    }

    /// Replace the opacity (`0..=100`).
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// Replace the visibility flag.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Number of frames in the active range (`N`).
    pub fn frame_count(&self) -> i64 {
        self.frame_end - self.frame_start + 1
    }

    /// Active range as a span, if well-formed.
    pub fn active_span(&self) -> Option<FrameSpan> {
        FrameSpan::new(self.frame_start, self.frame_end).ok()
    }

    /// Name for log output, falling back to the id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> u8 {
    100
}

fn deserialize_layer_id<'de, D>(deserializer: D) -> Result<LayerId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        Int(i64),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Str(s) => Ok(s),
        Repr::Int(i) => Ok(i.to_string()),
    }
}

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Frame, FrameSpan};
use crate::resolve::RawReferences;
use crate::resolve::fill::{FillContext, fill_behavior};
use crate::resolve::in_range::resolve_in_range;
use crate::scene::layer::Layer;

/// What a layer shows at one output frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameRef {
    /// The frame is rendered by the host.
    Render,
    /// The frame reuses the image of another (render) frame.
    CopyFrom(Frame),
    /// The layer is fully transparent here.
    Transparent,
}

/// Canonical frame-reference map of one layer.
///
/// Invariants:
/// - every key lies inside the render range it was resolved for;
/// - every non-null value is a key that maps to itself (a render frame).
///
/// Serializes as `{ "<frame>": <frame|null> }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameReferences(BTreeMap<Frame, Option<Frame>>);

impl FrameReferences {
    /// Reference for `frame`, or `None` when the frame is out of scope for this layer.
    pub fn get(&self, frame: Frame) -> Option<FrameRef> {
        self.0.get(&frame).map(|target| match *target {
            None => FrameRef::Transparent,
            Some(t) if t == frame => FrameRef::Render,
            Some(t) => FrameRef::CopyFrom(t),
        })
    }

    /// Raw target of `frame`: `Some(None)` for transparent, `None` when absent.
    pub fn target(&self, frame: Frame) -> Option<Option<Frame>> {
        self.0.get(&frame).copied()
    }

    /// Iterate `(frame, reference)` pairs in ascending frame order.
    pub fn iter(&self) -> impl Iterator<Item = (Frame, FrameRef)> + '_ {
        self.0.keys().filter_map(|&f| self.get(f).map(|r| (f, r)))
    }

    /// Frames the host must render (distinct non-null values).
    pub fn render_frames(&self) -> BTreeSet<Frame> {
        self.0.values().flatten().copied().collect()
    }

    /// `(copy_frame, render_frame)` pairs.
    pub fn copy_frames(&self) -> impl Iterator<Item = (Frame, Frame)> + '_ {
        self.0.iter().filter_map(|(&frame, &target)| match target {
            Some(t) if t != frame => Some((frame, t)),
            _ => None,
        })
    }

    /// Number of mapped frames.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when no frame is mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw `frame -> target` map.
    pub fn as_map(&self) -> &BTreeMap<Frame, Option<Frame>> {
        &self.0
    }
}

impl From<BTreeMap<Frame, Option<Frame>>> for FrameReferences {
    fn from(map: BTreeMap<Frame, Option<Frame>>) -> Self {
        Self(map)
    }
}

/// Resolve which source frame supplies `layer` at every frame of `range`.
///
/// Total over any input: an empty exposure set yields an empty map. Resolving the same input
/// twice yields equal maps.
pub fn resolve_frame_references(layer: &Layer, range: FrameSpan) -> FrameReferences {
    let exposures = &layer.exposure_frames;
    let (Some(&first), Some(&last)) = (exposures.first(), exposures.last()) else {
        return FrameReferences::default();
    };

    let mut refs = RawReferences::new();
    resolve_in_range(exposures, layer.frame_end, range, &mut refs);

    let frame_count = layer.frame_count();
    if layer.frame_start >= range.start && first >= range.start {
        let ctx = FillContext {
            layer_start: layer.frame_start,
            frame_count,
            anchor: first,
        };
        fill_behavior(
            layer.pre_behavior,
            ctx,
            range.start,
            layer.frame_start - 1,
            &mut refs,
        );
    }
    if layer.frame_end < range.end && last < range.end {
        let ctx = FillContext {
            layer_start: layer.frame_start,
            frame_count,
            anchor: last,
        };
        fill_behavior(
            layer.post_behavior,
            ctx,
            layer.frame_end + 1,
            range.end,
            &mut refs,
        );
    }

    compress_indirections(&mut refs);
    prune_out_of_range(&mut refs, range);
    FrameReferences(refs)
}

/// Point every key straight at the end of its reference chain.
///
/// A chain ends at a self-mapped frame, at a frame with no entry, or at a transparent entry
/// (the key becomes transparent). A revisited frame ends the walk and becomes a render frame.
pub(crate) fn compress_indirections(refs: &mut RawReferences) {
    let keys: Vec<Frame> = refs.keys().copied().collect();
    for key in keys {
        let Some(Some(first)) = refs.get(&key).copied() else {
            continue;
        };
        if first == key {
            continue;
        }

        let mut visited = BTreeSet::from([key]);
        let mut current = first;
        let resolved = loop {
            match refs.get(&current).copied() {
                None => break Some(current),
                Some(None) => break None,
                Some(Some(next)) if next == current => break Some(current),
                Some(Some(next)) => {
                    if !visited.insert(current) {
                        refs.insert(current, Some(current));
                        break Some(current);
                    }
                    current = next;
                }
            }
        };
        refs.insert(key, resolved);
    }
}

/// Drop keys outside `range` and re-point references that no longer land on a render frame.
///
/// Referrers of the same unreachable target are grouped; the smallest one is promoted to a
/// render frame and the rest copy from it.
pub(crate) fn prune_out_of_range(refs: &mut RawReferences, range: FrameSpan) {
    refs.retain(|frame, _| range.contains(*frame));

    let mut referrers: BTreeMap<Frame, Vec<Frame>> = BTreeMap::new();
    for (&frame, &target) in refs.iter() {
        let Some(target) = target else {
            continue;
        };
        if refs.get(&target) != Some(&Some(target)) {
            referrers.entry(target).or_default().push(frame);
        }
    }

    for frames in referrers.into_values() {
        let promoted = frames[0];
        for frame in frames {
            refs.insert(frame, Some(promoted));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/layer.rs"]
mod tests;

use std::collections::BTreeSet;

use crate::foundation::core::{Frame, FrameSpan};
use crate::resolve::RawReferences;

/// Map the frames of `range` that the layer covers from its exposures alone.
///
/// Frames outside the layer's active range are left to the behavior filler.
pub(crate) fn resolve_in_range(
    exposures: &BTreeSet<Frame>,
    layer_end: Frame,
    range: FrameSpan,
    out: &mut RawReferences,
) {
    let mut first_in_range = None;
    for &exposure in exposures {
        if exposure < range.start {
            // Tentative; a later (closer) exposure overwrites it.
            out.insert(range.start, Some(exposure));
        } else if exposure <= range.end {
            out.insert(exposure, Some(exposure));
            first_in_range.get_or_insert(exposure);
        }
    }

    if let Some(first) = first_in_range {
        let mut previous = first;
        for frame in first..=range.end.min(layer_end) {
            if exposures.contains(&frame) {
                previous = frame;
            } else {
                out.insert(frame, Some(previous));
            }
        }
    }

    if out.contains_key(&range.start) {
        return;
    }
    let Some(&closest) = exposures.range(..range.start).next_back() else {
        return;
    };
    out.insert(closest, Some(closest));
    for frame in range.frames() {
        if out.contains_key(&frame) {
            break;
        }
        out.insert(frame, Some(closest));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/in_range.rs"]
mod tests;

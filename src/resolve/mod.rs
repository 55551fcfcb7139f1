//! Frame-reference resolution: which source frame supplies a layer at each output frame.

use std::collections::BTreeMap;

use crate::foundation::core::Frame;

/// Pre/post behavior extrapolation.
pub mod fill;
pub(crate) mod in_range;
/// Per-layer resolution and canonicalisation.
pub mod layer;

/// Working map during resolution: frame -> referenced frame, `None` for transparent.
pub(crate) type RawReferences = BTreeMap<Frame, Option<Frame>>;

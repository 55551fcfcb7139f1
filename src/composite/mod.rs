//! Layer compositing and thumbnail output.

/// Straight-alpha pixel math.
pub mod alpha;
/// Per-frame layer flattening.
pub mod compositor;
/// JPEG thumbnail writer.
pub mod thumbnail;

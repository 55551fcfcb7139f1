//! Layer rendering: drives the host renderer, materialises copy frames and fills gaps.

/// Sequence gap filling.
pub mod gaps;
/// Per-layer and multi-layer rendering.
pub mod layer;
/// Hard link with byte-copy fallback.
pub mod link;
/// The host renderer collaborator.
pub mod renderer;
/// Renderer reading pre-exported frames from disk.
pub mod source;

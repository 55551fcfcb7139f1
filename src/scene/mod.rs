//! Timeline input model: layers and the JSON scene document.

/// Scene document loading and validation.
pub mod document;
/// Layer records and extrapolation behaviors.
pub mod layer;

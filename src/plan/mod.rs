//! Extraction planning: frame references plus deterministic filenames per layer.

/// Plan construction and the serializable plan object.
pub mod extraction;
/// Frame filename templates.
pub mod template;

//! celcomp flattens cel-animation timelines into PNG frame sequences.
//!
//! The pipeline has three stages:
//!
//! - Resolve, per layer, which source frame supplies every output frame ([`resolve`]) and
//!   turn that into an [`ExtractionPlan`] with deterministic filenames ([`plan`])
//! - Drive an external [`FrameRenderer`] to produce the planned layer frames ([`render`])
//! - Composite the layers back to front into one sequence and renumber it ([`composite`],
//!   [`output`])
//!
//! [`extract_sequence`] runs all of it for a JSON [`Scene`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod composite;
/// End-to-end extraction driver.
pub mod extract;
pub mod output;
pub mod plan;
pub mod render;
pub mod resolve;
pub mod scene;

pub use crate::foundation::core::{Canvas, Frame, FrameSpan, LayerId};
pub use crate::foundation::error::{CelError, CelResult, CollaboratorError};
pub use crate::foundation::math::opacity_to_alpha;

pub use crate::composite::compositor::{
    Background, CompositeLayer, CompositeOpts, CompositeOutput, composite_layers,
};
pub use crate::composite::thumbnail::write_thumbnail;
pub use crate::extract::{ExtractOpts, ExtractOutput, ExtractStats, extract_sequence};
pub use crate::output::rename::rename_by_frame_start;
pub use crate::plan::extraction::{ExtractionPlan, LayerPlan, PlanOpts, plan_extraction};
pub use crate::plan::template::FrameNameTemplate;
pub use crate::render::gaps::fill_sequence_gaps;
pub use crate::render::layer::{
    LayerFiles, LayerRenderStats, RenderThreading, RenderedLayer, render_layer, render_layers,
};
pub use crate::render::link::{LinkKind, link_or_copy};
pub use crate::render::renderer::FrameRenderer;
pub use crate::render::source::DirectorySource;
pub use crate::resolve::layer::{FrameRef, FrameReferences, resolve_frame_references};
pub use crate::scene::document::Scene;
pub use crate::scene::layer::{Behavior, Layer};

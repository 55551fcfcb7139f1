use std::path::{Path, PathBuf};

use crate::foundation::core::Frame;

/// Convenience result type used across celcomp.
pub type CelResult<T> = Result<T, CelError>;

/// Boxed error returned by external collaborators (the host frame renderer).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error taxonomy used by the extraction pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CelError {
    /// No layer produced a frame to render; callers usually treat this as "nothing to do".
    #[error("empty plan: no layer has frames to render")]
    EmptyPlan,

    /// The external frame renderer failed for one `(layer, frame)`.
    #[error("render failure: layer '{layer_id}' frame {frame} -> '{}': {source}", path.display())]
    RenderFailure {
        /// Layer being rendered.
        layer_id: String,
        /// Frame handed to the renderer.
        frame: Frame,
        /// Destination path requested from the renderer.
        path: PathBuf,
        /// Error reported by the renderer.
        source: CollaboratorError,
    },

    /// Hard-linking failed and the byte-copy fallback failed too.
    #[error("link failure: '{}' -> '{}': {source}", src.display(), dst.display())]
    LinkFailure {
        /// Existing file.
        src: PathBuf,
        /// File that could not be materialised.
        dst: PathBuf,
        /// Error from the copy fallback.
        source: std::io::Error,
    },

    /// Every composited frame came out transparent, so there is no reference image size.
    #[error("no composite input: no layer produced an image in the requested frames")]
    NoCompositeInput,

    /// A rename destination is occupied by a file that is not part of the renamed sequence.
    #[error("rename collision: '{}' -> '{}' would overwrite an unrelated file", src.display(), dst.display())]
    RenameCollision {
        /// File that was about to be renamed.
        src: PathBuf,
        /// Occupied destination.
        dst: PathBuf,
    },

    /// Invalid user-provided scene, plan or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image decode or encode failure.
    #[error("image error: '{}': {source}", path.display())]
    Image {
        /// File being read or written.
        path: PathBuf,
        /// Error from the `image` crate.
        source: image::ImageError,
    },

    /// Filesystem failure.
    #[error("io error: '{}': {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CelError {
    /// Build a [`CelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CelError::Io`] value for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`CelError::Image`] value for `path`.
    pub fn image(path: impl AsRef<Path>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`CelError::RenderFailure`] from a collaborator error.
    pub fn render_failure(
        layer_id: impl Into<String>,
        frame: Frame,
        path: impl AsRef<Path>,
        source: anyhow::Error,
    ) -> Self {
        Self::RenderFailure {
            layer_id: layer_id.into(),
            frame,
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

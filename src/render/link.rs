use std::io::ErrorKind;
use std::path::Path;

use crate::foundation::error::{CelError, CelResult};

/// How a file was materialised at its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// `dst` is a hard link to `src`.
    HardLink,
    /// `dst` holds a byte copy of `src`.
    Copy,
}

/// Make `dst` show the same bytes as `src`, preferring a hard link.
///
/// A stale `dst` is replaced. When linking is not possible the file is copied; only a failed
/// copy is reported, as [`CelError::LinkFailure`].
pub fn link_or_copy(src: &Path, dst: &Path) -> CelResult<LinkKind> {
    if src == dst {
        return Ok(LinkKind::HardLink);
    }
    match std::fs::remove_file(dst) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(CelError::io(dst, e)),
    }

    match std::fs::hard_link(src, dst) {
        Ok(()) => return Ok(LinkKind::HardLink),
        Err(e) if e.kind() == ErrorKind::Unsupported => {}
        Err(e) => {
            tracing::warn!(
                src = %src.display(),
                dst = %dst.display(),
                error = %e,
                "hard link failed, copying instead"
            );
        }
    }

    std::fs::copy(src, dst).map_err(|source| CelError::LinkFailure {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    })?;
    Ok(LinkKind::Copy)
}

#[cfg(test)]
#[path = "../../tests/unit/render/link.rs"]
mod tests;

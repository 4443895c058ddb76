//! Path validation for destination-relative paths.
//!
//! Everything written below a destination root is addressed by a relative
//! `{category}/{filename}` path. Filenames come straight from the source
//! folder, so they are checked here before being joined onto a root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a destination-relative path and returns it normalized.
/// Ensures that paths don't escape the destination root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sweep_storage::validate_path;
/// assert!(validate_path("Documentos/report.pdf").is_ok());
/// assert!(validate_path("Otros/../Otros/notes").is_ok());
/// assert!(validate_path("../outside.pdf").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("Imagenes/./cat.png/").unwrap(),
///     Path::new("Imagenes/cat.png")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir => {},
            // Relative paths only: an absolute filename would replace the root on join.
            Component::RootDir | Component::Prefix(_) => {
                exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()))
            },
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

//! Path confinement
//!
//! A [`Sandbox`] resolves caller-supplied paths against a fixed base
//! directory and refuses anything that lands outside it. Resolution is
//! lexical first (`.`/`..`, absolute injection), then canonical over the
//! longest existing prefix so that symlinks pointing out of the base are
//! caught as well, dangling ones included.

use crate::error::StoreError;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Base directory that all store paths are confined to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    base: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `base`
    ///
    /// Relative bases are taken from the current directory. The base does not
    /// need to exist yet; the first write creates it.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the current directory or an existing base
    /// cannot be resolved
    pub fn new(base: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base = base.as_ref();
        let absolute = if base.is_absolute() {
            base.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| StoreError::io_error(base, e))?
                .join(base)
        };

        let base = canonicalize_existing_prefix(&normalize(&absolute))
            .map_err(|e| StoreError::io_error(&absolute, e))?;
        Ok(Self { base })
    }

    /// Resolved base directory
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `relative` to an absolute path inside the base
    ///
    /// # Errors
    /// - `StoreError::InvalidInput` if `relative` is empty
    /// - `StoreError::InvalidPath` if the result is neither the base nor nested under it
    /// - `StoreError::Io` if canonical resolution of an existing prefix fails
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        if relative.trim().is_empty() {
            return Err(StoreError::InvalidInput("missing path".to_string()));
        }

        let lexical = normalize(&self.base.join(relative));
        if !is_within(&lexical, &self.base) {
            tracing::warn!(requested = relative, resolved = %lexical.display(), "path escapes sandbox");
            return Err(StoreError::invalid_path(relative, &self.base));
        }

        // The base may have been created (or replaced) since construction.
        let base = canonicalize_existing_prefix(&self.base)
            .map_err(|e| StoreError::io_error(&self.base, e))?;
        let canonical = canonicalize_existing_prefix(&lexical)
            .map_err(|e| StoreError::io_error(&lexical, e))?;
        if !is_within(&canonical, &base) {
            tracing::warn!(requested = relative, resolved = %canonical.display(), "symlink escapes sandbox");
            return Err(StoreError::invalid_path(relative, &self.base));
        }

        Ok(canonical)
    }
}

/// `path` equals `base` or sits below it, compared component-wise
fn is_within(path: &Path, base: &Path) -> bool {
    path == base || path.starts_with(base)
}

/// Lexically fold `.` and `..`; `..` never climbs above the root
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Symlink hops followed before giving up, as the kernel's `ELOOP` limit
const MAX_LINK_HOPS: usize = 40;

/// Canonicalize the longest prefix of `path` that exists and re-append the rest
///
/// A dangling symlink on the way is followed to wherever it points, so the
/// result is the file a write would actually create.
fn canonicalize_existing_prefix(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut rest = Vec::new();
    let mut hops = 0;

    loop {
        match existing.canonicalize() {
            Ok(mut canonical) => {
                for part in rest.iter().rev() {
                    canonical.push(part);
                }
                return Ok(canonical);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if is_symlink(&existing) {
                    hops += 1;
                    if hops > MAX_LINK_HOPS {
                        return Err(io::Error::other("too many levels of symbolic links"));
                    }
                    existing = follow_link(&existing)?;
                    continue;
                }
                let Some(name) = existing.file_name().map(ToOwned::to_owned) else {
                    return Ok(path.to_path_buf());
                };
                rest.push(name);
                if !existing.pop() {
                    return Ok(path.to_path_buf());
                }
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_symlink())
}

/// Target of the link at `link`, relative targets taken from its directory
fn follow_link(link: &Path) -> io::Result<PathBuf> {
    let target = std::fs::read_link(link)?;
    let dir = match link.parent() {
        Some(parent) => canonicalize_existing_prefix(parent)?,
        None => PathBuf::new(),
    };
    Ok(normalize(&dir.join(target)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/../../..")), PathBuf::from("/"));
    }

    #[test]
    fn is_within_is_component_wise() {
        assert!(is_within(Path::new("/srv/fw"), Path::new("/srv/fw")));
        assert!(is_within(Path::new("/srv/fw/a.hpp"), Path::new("/srv/fw")));
        assert!(!is_within(Path::new("/srv/fw2/a.hpp"), Path::new("/srv/fw")));
        assert!(!is_within(Path::new("/srv"), Path::new("/srv/fw")));
    }

    #[test]
    fn missing_suffix_is_reappended() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("not/yet/here.txt");
        let resolved = canonicalize_existing_prefix(&target).unwrap();

        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
        assert!(resolved.ends_with("not/yet/here.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_is_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink("elsewhere/target.txt", root.join("link")).unwrap();

        let resolved = canonicalize_existing_prefix(&root.join("link")).unwrap();
        assert_eq!(resolved, root.join("elsewhere/target.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn link_loop_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink("b", root.join("a")).unwrap();
        std::os::unix::fs::symlink("a", root.join("b")).unwrap();

        assert!(canonicalize_existing_prefix(&root.join("a/file.txt")).is_err());
    }
}

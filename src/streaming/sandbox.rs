//! Filesystem sandbox for client-supplied filenames.
//!
//! [`resolve`] turns an untrusted URL segment into an absolute path that is
//! guaranteed to live inside the media root. Containment is judged on
//! canonical paths component by component, so `/media` never admits
//! `/media2/...` and symlinks pointing outside the root are refused.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve `filename` against `root`, refusing anything that escapes it.
///
/// Every rejection is [`Error::Forbidden`] regardless of whether the target
/// exists. A well-formed name that does not exist resolves successfully; the
/// caller's subsequent open reports it as not found.
pub fn resolve(root: &Path, filename: &str) -> Result<PathBuf> {
    let name = single_component(filename).ok_or(Error::Forbidden)?;

    let canonical_root = root.canonicalize().map_err(|e| {
        tracing::warn!("Media root {:?} is not accessible: {}", root, e);
        Error::not_found("media root", root.display())
    })?;

    let candidate = canonical_root.join(name);

    let resolved = match candidate.canonicalize() {
        Ok(path) => path,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            // A dangling symlink cannot be proven to stay inside the root.
            if std::fs::symlink_metadata(&candidate).is_ok() {
                tracing::debug!("Refusing dangling link {:?}", candidate);
                return Err(Error::Forbidden);
            }
            return Ok(candidate);
        }
        Err(e) => {
            tracing::debug!("Cannot canonicalize {:?}: {}", candidate, e);
            return Err(Error::Forbidden);
        }
    };

    if resolved == canonical_root || !resolved.starts_with(&canonical_root) {
        tracing::warn!(
            requested = %filename,
            "Rejected path outside media root"
        );
        return Err(Error::Forbidden);
    }

    Ok(resolved)
}

/// Accept only names that form exactly one normal path component.
fn single_component(filename: &str) -> Option<&Path> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return None;
    }

    let path = Path::new(filename);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(path),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn media_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("movie.mp4"), b"data").unwrap();
        dir
    }

    #[test]
    fn test_resolves_existing_file() {
        let dir = media_dir();
        let resolved = resolve(dir.path(), "movie.mp4").unwrap();
        assert_eq!(
            resolved,
            dir.path().canonicalize().unwrap().join("movie.mp4")
        );
    }

    #[test]
    fn test_missing_file_resolves_inside_root() {
        let dir = media_dir();
        let resolved = resolve(dir.path(), "absent.mp4").unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
        assert!(!resolved.exists());
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = media_dir();
        for name in ["../../etc/passwd", "..", ".", "", "a/b.mp4", "..\\x", "/etc/passwd"] {
            assert!(
                matches!(resolve(dir.path(), name), Err(Error::Forbidden)),
                "expected {name:?} to be forbidden"
            );
        }
    }

    #[test]
    fn test_traversal_rejected_whether_or_not_target_exists() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("media");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), b"secret").unwrap();

        assert!(matches!(
            resolve(&root, "../secret.txt"),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            resolve(&root, "../missing.txt"),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn test_rejects_nul_byte() {
        let dir = media_dir();
        assert!(matches!(
            resolve(dir.path(), "movie.mp4\0"),
            Err(Error::Forbidden)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlink_to_sibling_directory() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("media");
        let sibling = outer.path().join("media2");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&sibling).unwrap();
        fs::write(sibling.join("other.mp4"), b"x").unwrap();
        std::os::unix::fs::symlink(sibling.join("other.mp4"), root.join("link.mp4")).unwrap();

        assert!(matches!(resolve(&root, "link.mp4"), Err(Error::Forbidden)));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_dangling_symlink() {
        let dir = media_dir();
        std::os::unix::fs::symlink("/nonexistent/target.mp4", dir.path().join("dead.mp4"))
            .unwrap();

        assert!(matches!(resolve(dir.path(), "dead.mp4"), Err(Error::Forbidden)));
    }

    #[cfg(unix)]
    #[test]
    fn test_allows_symlink_within_root() {
        let dir = media_dir();
        std::os::unix::fs::symlink(dir.path().join("movie.mp4"), dir.path().join("alias.mp4"))
            .unwrap();

        let resolved = resolve(dir.path(), "alias.mp4").unwrap();
        assert_eq!(
            resolved,
            dir.path().canonicalize().unwrap().join("movie.mp4")
        );
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        assert!(matches!(
            resolve(&root, "movie.mp4"),
            Err(Error::NotFound { .. })
        ));
    }
}

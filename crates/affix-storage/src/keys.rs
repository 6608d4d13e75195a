//! Shared path normalization for storage backends.
//!
//! Rendered paths look like `/avatar/original/42.png`. Backends store them
//! relative to their root or bucket as `avatar/original/42.png`.

use crate::traits::{StorageError, StorageResult};

/// Normalize an attachment path into a relative storage key.
///
/// Drops one leading `/`, rejects empty paths, `..` segments, backslashes and
/// doubled separators, so a key always stays below the backend's root.
pub fn storage_key(path: &str) -> StorageResult<&str> {
    let key = path.strip_prefix('/').unwrap_or(path);

    if key.is_empty() {
        return Err(StorageError::InvalidPath("path is empty".to_string()));
    }
    if key.contains('\\') || key.starts_with('/') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_slash_dropped() {
        assert_eq!(
            storage_key("/avatar/original/42.png").unwrap(),
            "avatar/original/42.png"
        );
        assert_eq!(storage_key("avatar/42.png").unwrap(), "avatar/42.png");
    }

    #[test]
    fn test_traversal_rejected() {
        for path in ["/../etc/passwd", "/a/../../b", "//etc/passwd", "/a//b", "/a\\b", "/", ""] {
            assert!(
                matches!(storage_key(path), Err(StorageError::InvalidPath(_))),
                "{} should be rejected",
                path
            );
        }
    }
}

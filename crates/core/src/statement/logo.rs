//! Lazily loaded statement logo.

use std::path::PathBuf;

use once_cell::sync::OnceCell;

/// Read-through cache for the logo image.
///
/// The file is read at most once. A missing or unreadable file is logged
/// and statements render without a logo.
#[derive(Debug, Default)]
pub struct LogoCache {
    path: Option<PathBuf>,
    bytes: OnceCell<Option<Vec<u8>>>,
}

impl LogoCache {
    /// Cache for the given path; `None` disables the logo.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            bytes: OnceCell::new(),
        }
    }

    /// Logo bytes, loading them on first use.
    pub fn get(&self) -> Option<&[u8]> {
        self.bytes
            .get_or_init(|| {
                let path = self.path.as_ref()?;
                match std::fs::read(path) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "statement logo unavailable");
                        None
                    }
                }
            })
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_path_no_logo() {
        assert!(LogoCache::new(None).get().is_none());
    }

    #[test]
    fn test_missing_file_no_logo() {
        let cache = LogoCache::new(Some(PathBuf::from("/nonexistent/till/logo.png")));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_reads_once() {
        let path = std::env::temp_dir().join(format!("till-logo-{}.png", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"first").unwrap();

        let cache = LogoCache::new(Some(path.clone()));
        assert_eq!(cache.get(), Some(&b"first"[..]));

        std::fs::write(&path, b"second").unwrap();
        assert_eq!(cache.get(), Some(&b"first"[..]));

        std::fs::remove_file(&path).unwrap();
    }
}

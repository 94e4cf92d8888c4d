//! Where asset bytes come from

use std::path::{Path, PathBuf};

use crate::error::{ViewerError, ViewerResult};

/// Fetches the raw bytes behind an asset URL.
pub trait AssetSource {
    fn fetch(&self, url: &str) -> ViewerResult<Vec<u8>>;

    /// Directory external buffers of `url` are resolved against.
    fn base_path(&self, url: &str) -> Option<PathBuf>;
}

/// Reads assets from the local filesystem. Relative URLs are resolved
/// against `base_dir`.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, url: &str) -> ViewerResult<Vec<u8>> {
        let path = self.resolve(url);
        log::debug!("Reading {} from {}", url, path.display());
        std::fs::read(&path).map_err(|err| ViewerError::asset_load(url, err))
    }

    fn base_path(&self, url: &str) -> Option<PathBuf> {
        self.resolve(url).parent().map(Path::to_path_buf)
    }
}

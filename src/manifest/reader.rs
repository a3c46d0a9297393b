use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Capability used to fetch manifest bytes.
///
/// The default [`FsReader`] reads from the local file system; tests and embedders can supply
/// in-memory readers instead. Only [`FileReader::read`] is required: the remaining methods
/// default to answers expressed through it.
pub trait FileReader {
    /// Read the full content at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Whether `path` names a readable file.
    fn is_file(&self, path: &Path) -> bool {
        self.read(path).is_ok()
    }

    /// Stable identity of `path`, used as the manifest cache key.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// [`FileReader`] backed by [`std::fs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

impl<R: FileReader + ?Sized> FileReader for &R {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        (**self).canonicalize(path)
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding layer files; removed on drop.
pub struct ConfigTree {
    dir: TempDir,
}

impl ConfigTree {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: &str) -> io::Result<PathBuf> {
        write_layer(self.root(), relative, contents)
    }
}

/// Write a layer file under `root`, creating parent directories.
pub fn write_layer(
    root: &Path,
    relative: impl AsRef<Path>,
    contents: &str,
) -> io::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

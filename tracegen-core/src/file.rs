use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had the exact content and was left untouched
    Unchanged,
}

/// A fully rendered file waiting to be committed to disk.
///
/// Content is always held in memory first; [`File::write`] replaces the
/// destination atomically, so a failed write never leaves a truncated file.
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    content: String,
}

impl File {
    /// Create a new file with the given path and content
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Write the file, skipping the write when the content is already current.
    pub fn write(&self) -> io::Result<WriteResult> {
        if fs::read_to_string(&self.path).is_ok_and(|existing| existing == self.content) {
            tracing::debug!(path = %self.path.display(), "output unchanged");
            return Ok(WriteResult::Unchanged);
        }

        write_atomic(&self.path, &self.content)?;
        Ok(WriteResult::Written)
    }
}

/// Write `content` to a temporary file next to `path`, then rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".tracegen-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    // Temp files are created owner-only; keep the permissions a regular file would get.
    let permissions = match fs::metadata(path) {
        Ok(meta) => meta.permissions(),
        Err(_) => default_permissions(tmp.as_file())?,
    };
    fs::set_permissions(tmp.path(), permissions)?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions(_file: &fs::File) -> io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(file: &fs::File) -> io::Result<fs::Permissions> {
    Ok(file.metadata()?.permissions())
}

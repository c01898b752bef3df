//! Atomic output files.
//!
//! Every artifact is staged in a temporary file in the destination directory
//! and renamed into place only once it is complete, so a crash or a failed
//! authentication never leaves a file that looks finished.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

/// Refuse to clobber `path` unless `force` is set.
pub fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists; use -f to overwrite", path.display());
    }
    Ok(())
}

/// Create a staging file next to `path` with owner-only permissions.
pub fn stage(path: &Path) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    let tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("staging output in {}", parent.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
    }
    Ok(tmp)
}

/// Flush a staged file to disk and move it to `path`.
pub fn commit(mut tmp: NamedTempFile, path: &Path, force: bool) -> Result<()> {
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    if force {
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("writing {}", path.display()))?;
    } else {
        tmp.persist_noclobber(path)
            .map_err(|e| e.error)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// Atomically write `data` to `path`.
pub fn write_atomic(path: &Path, data: &[u8], force: bool) -> Result<()> {
    let mut tmp = stage(path)?;
    tmp.write_all(data)
        .with_context(|| format!("writing {}", path.display()))?;
    commit(tmp, path, force)
}

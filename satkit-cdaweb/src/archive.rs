// Satkit CDAWeb - Remote archives
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Remote archive transport.
//!
//! [`RemoteArchive`] is the seam the download loop talks to: change into a
//! directory, then stream named files into a writer. Failures carry the
//! server's three-digit reply code so callers can tell a missing file
//! (`550`) from anything else.
//!
//! [`MirrorArchive`] serves a local directory tree laid out like the
//! archive, e.g. a rsync'd copy of `cdaweb.gsfc.nasa.gov/pub/data`.

use satkit::TransferError;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Cache directory name under the user's cache directory.
pub const MIRROR_DIR: &str = "satkit/cdaweb";

/// Default mirror root.
pub fn default_mirror_root() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.cache_dir().join(MIRROR_DIR))
        .unwrap_or_else(|| PathBuf::from(".cache/satkit/cdaweb"))
}

/// A file archive reachable by directory and name.
pub trait RemoteArchive {
    /// Change the working directory, relative to the archive root.
    fn change_dir(&mut self, dir: &str) -> Result<(), TransferError>;

    /// Stream `name`, relative to the working directory, into `out`.
    /// Returns the number of bytes written.
    fn retrieve(&mut self, name: &str, out: &mut dyn Write) -> Result<u64, TransferError>;
}

/// Map an IO failure onto an FTP-style reply.
fn transfer_error(err: &io::Error, what: &str) -> TransferError {
    match err.kind() {
        io::ErrorKind::NotFound => TransferError::new("550", format!("{}: No such file", what)),
        io::ErrorKind::PermissionDenied => {
            TransferError::new("550", format!("{}: Permission denied", what))
        }
        _ => TransferError::new("451", format!("{}: {}", what, err)),
    }
}

/// Directory-backed archive.
#[derive(Debug, Clone)]
pub struct MirrorArchive {
    root: PathBuf,
    cwd: PathBuf,
}

impl MirrorArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cwd: root.clone(),
            root,
        }
    }

    /// Mirror under the user's cache directory.
    pub fn default_location() -> Self {
        Self::new(default_mirror_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    // Paths may not climb out of the mirror root
    fn resolve(&self, base: &Path, rel: &str) -> Result<PathBuf, TransferError> {
        let rel = Path::new(rel.trim_start_matches('/'));
        if rel
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(TransferError::new(
                "553",
                format!("{}: Path escapes archive root", rel.display()),
            ));
        }
        Ok(base.join(rel))
    }
}

impl RemoteArchive for MirrorArchive {
    fn change_dir(&mut self, dir: &str) -> Result<(), TransferError> {
        let target = self.resolve(&self.root, dir)?;
        if !target.is_dir() {
            return Err(TransferError::new(
                "550",
                format!("{}: No such directory", dir),
            ));
        }
        log::debug!("archive cwd {}", target.display());
        self.cwd = target;
        Ok(())
    }

    fn retrieve(&mut self, name: &str, out: &mut dyn Write) -> Result<u64, TransferError> {
        let path = self.resolve(&self.cwd, name)?;
        let mut file = File::open(&path).map_err(|e| transfer_error(&e, name))?;
        let written = io::copy(&mut file, out).map_err(|e| transfer_error(&e, name))?;
        log::debug!("retrieved {} ({} bytes)", path.display(), written);
        Ok(written)
    }
}

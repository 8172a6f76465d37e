//! Parameter validation helpers
//!
//! Raised at API entry with the offending parameter name, before any
//! output is touched.

use crate::error::ArchiveError;
use crate::Result;
use std::path::Path;

pub(crate) fn ensure_directory(param: &'static str, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ArchiveError::NotFound {
            param,
            path: path.to_path_buf(),
        });
    }
    if path.is_file() {
        return Err(ArchiveError::IsAFile {
            param,
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ArchiveError::NotADirectory {
            param,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_file(param: &'static str, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ArchiveError::NotFound {
            param,
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(ArchiveError::IsADirectory {
            param,
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(ArchiveError::NotAFile {
            param,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_relative(param: &'static str, path: &Path) -> Result<()> {
    if path.is_absolute() {
        return Err(ArchiveError::Rooted {
            param,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

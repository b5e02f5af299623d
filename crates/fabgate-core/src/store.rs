//! filesystem credential store
//!
//! msp directories (`signcerts`, `keystore`) are expected to hold exactly one file.
//! hidden entries and subdirectories are skipped; anything else is ambiguous.

use crate::error::{GatewayError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// read the only file in `dir`
pub fn read_single_file(dir: impl AsRef<Path>) -> Result<Vec<u8>> {
    let dir = dir.as_ref();
    let path = single_file(dir)?;
    debug!("reading credential {}", path.display());
    fs::read(&path).map_err(|e| GatewayError::io(&path, e))
}

fn single_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| GatewayError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GatewayError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        // metadata() follows symlinks
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push((name, path)),
            Ok(_) => {}
            Err(e) => return Err(GatewayError::io(&path, e)),
        }
    }

    match files.len() {
        0 => Err(GatewayError::EmptyCredentialStore(dir.to_path_buf())),
        1 => Ok(files.remove(0).1),
        _ => {
            let mut entries: Vec<String> = files.into_iter().map(|(name, _)| name).collect();
            entries.sort();
            Err(GatewayError::AmbiguousCredentialStore {
                path: dir.to_path_buf(),
                entries,
            })
        }
    }
}

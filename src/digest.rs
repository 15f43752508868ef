//! Content digest of a generated site tree.
//!
//! Two builds of the same snapshot, config and year must produce the same
//! tree. The digest makes that checkable from the build report: SHA-256 over
//! every file's relative path and contents, visited in sorted path order.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Hex digest of the whole tree under `root`.
///
/// Paths are hashed with `/` separators so the value does not depend on the
/// host platform. Directories only contribute through the files they hold.
pub fn tree_digest(root: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?;
        let name: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let contents = fs::read(entry.path())?;
        hasher.update(name.join("/").as_bytes());
        hasher.update(b"\0");
        hasher.update((contents.len() as u64).to_le_bytes());
        hasher.update(&contents);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

//! Sibling file names used around a persisted JSON file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `foo.json` -> `foo.json.bak`
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files directly inside `dir`, sorted by file name.
///
/// Every file is a candidate; whether it is an image is decided when it is
/// decoded. Entries that cannot be read are logged and left out.
pub fn discover_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() {
                    files.push(path.to_path_buf());
                }
            }
            Err(err) => warn!("Skipping unreadable entry in {}: {}", dir.display(), err),
        }
    }

    files
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::ExportedVerse;

/// Write an exported verse into `dir`, keeping only the final path component
/// of the backend-supplied filename.
pub fn save_export(dir: &Path, export: &ExportedVerse) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(safe_file_name(&export.filename));
    fs::write(&path, &export.content)?;
    info!(path = %path.display(), bytes = export.content.len(), "verse exported");
    Ok(path)
}

fn safe_file_name(raw: &str) -> String {
    let name = Path::new(raw.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.is_empty() || name == ".." {
        "verse-export.txt".to_string()
    } else {
        name
    }
}

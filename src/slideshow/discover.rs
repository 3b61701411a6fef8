//! Listing the images in a folder.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions picked up by [`discover_images`], in listing order.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gif", "bmp", "png", "tif"];

/// Image files directly inside `dir`, grouped by extension in
/// [`DEFAULT_EXTENSIONS`] order and sorted by name within each group.
pub fn discover_images<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    discover_images_with(dir, DEFAULT_EXTENSIONS)
}

/// Like [`discover_images`] with a custom extension list. Extensions are
/// given without the dot and matched case-insensitively.
pub fn discover_images_with<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut groups: Vec<Vec<PathBuf>> = vec![Vec::new(); extensions.len()];
    for file in files {
        let Some(ext) = file.extension().and_then(OsStr::to_str) else {
            continue;
        };
        if let Some(group) = extensions.iter().position(|e| e.eq_ignore_ascii_case(ext)) {
            groups[group].push(file);
        }
    }

    Ok(groups.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_grouped_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "z.jpg", "c.GIF", "d.tif", "e.tiff", "notes.txt", "x.jpeg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.png"), b"").unwrap();

        let found = discover_images(dir.path()).unwrap();
        assert_eq!(names(&found), vec!["z.jpg", "x.jpeg", "c.GIF", "a.png", "b.png", "d.tif"]);
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.tiff", "c.jpg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = discover_images_with(dir.path(), &["tiff", "png"]).unwrap();
        assert_eq!(names(&found), vec!["b.tiff", "a.png"]);
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_images(dir.path().join("nope")).is_err());
    }
}

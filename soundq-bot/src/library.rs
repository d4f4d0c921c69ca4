//! Local sounds folder lookup
//!
//! Sounds are matched by file-name prefix against the top level of the
//! configured folder. Matches are taken in file-name order so the same
//! prefix always picks the same file.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// The configured sounds folder
#[derive(Debug, Clone)]
pub struct SoundLibrary {
    folder: PathBuf,
}

impl SoundLibrary {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Canonical path of the first file whose name starts with `name`.
    ///
    /// A missing folder finds nothing. Hidden files are never matched.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if !self.folder.is_dir() {
            tracing::debug!(folder = %self.folder.display(), "Sounds folder not found");
            return None;
        }

        let walker = WalkDir::new(&self.folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file()
                        && entry.file_name().to_string_lossy().starts_with(name)
                    {
                        return match entry.path().canonicalize() {
                            Ok(path) => Some(path),
                            Err(e) => {
                                tracing::warn!("Cannot canonicalize {}: {}", entry.path().display(), e);
                                None
                            }
                        };
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        None
    }
}

/// Dot-files below the root. The root itself is always walked.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folder_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for f in files {
            fs::write(dir.path().join(f), b"x").unwrap();
        }
        dir
    }

    #[test]
    fn test_prefix_match_first_in_name_order() {
        let dir = folder_with(&["airhorn_long.mp3", "airhorn.mp3", "bell.ogg"]);
        let library = SoundLibrary::new(dir.path());

        let found = library.find("air").unwrap();
        assert_eq!(found.file_name().unwrap(), "airhorn.mp3");
        assert!(found.is_absolute());

        assert_eq!(library.find("bell").unwrap().file_name().unwrap(), "bell.ogg");
        assert!(library.find("cow").is_none());
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let dir = folder_with(&["Bell.ogg"]);
        let library = SoundLibrary::new(dir.path());
        assert!(library.find("bell").is_none());
        assert!(library.find("Bell").is_some());
    }

    #[test]
    fn test_hidden_and_nested_files_ignored() {
        let dir = folder_with(&[".secret.mp3"]);
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("subsound.mp3"), b"x").unwrap();

        let library = SoundLibrary::new(dir.path());
        assert!(library.find(".secret").is_none());
        assert!(library.find("sub").is_none());
    }

    #[test]
    fn test_missing_folder_and_empty_name() {
        let library = SoundLibrary::new("/no/such/sounds/folder");
        assert!(library.find("anything").is_none());

        let dir = folder_with(&["a.mp3"]);
        assert!(SoundLibrary::new(dir.path()).find("").is_none());
    }
}

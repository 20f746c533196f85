//! Directory tree walking applying a function on files of a given extension

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files below `dir` whose lowercased extension is `ext` (".xlsx"), sorted by path
///
/// Unreadable entries and Excel lock files (`~$...`) are skipped.
pub fn find_files<P: AsRef<Path>>(dir: P, ext: &str) -> Vec<PathBuf> {
    let ext = ext.trim_start_matches('.').to_lowercase();
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with("~$"))
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|x| x.to_string_lossy().to_lowercase() == ext)
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Apply `f` on every file found by [`find_files`], stopping on the first error
pub fn process<P, F>(dir: P, ext: &str, mut f: F) -> Result<usize>
where
    P: AsRef<Path>,
    F: FnMut(&Path) -> Result<()>,
{
    let files = find_files(dir, ext);
    for file in &files {
        f(file)?;
    }
    Ok(files.len())
}

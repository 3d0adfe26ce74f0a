use crate::matcher;
use fs_err as fs;
use std::path::{Path, PathBuf};

/// Descriptors with this in their path are MIME handler stubs, not applications.
const HANDLER_MARKER: &str = "-handler";

/// `applications/` under every `XDG_DATA_DIRS` entry, then under the user data home.
pub fn search_dirs() -> Vec<PathBuf> {
    let xdg = xdg::BaseDirectories::new();
    search_dirs_from(xdg.get_data_dirs(), xdg.get_data_home())
}

pub fn search_dirs_from(data_dirs: Vec<PathBuf>, data_home: Option<PathBuf>) -> Vec<PathBuf> {
    data_dirs
        .into_iter()
        .chain(data_home)
        .map(|p| p.join("applications"))
        .collect()
}

/// Same as the shell glob `*<program>*.desktop` applied to a file name.
pub fn matches_pattern(file_name: &str, program: &str, ignore_case: bool) -> bool {
    file_name
        .strip_suffix(".desktop")
        .is_some_and(|stem| matcher::contains(stem, program, ignore_case))
}

fn is_handler(path: &Path) -> bool {
    path.to_string_lossy().contains(HANDLER_MARKER)
}

/// First launchable descriptor for `program`, searching `dirs` in order.
pub fn find_descriptor(program: &str, dirs: &[PathBuf], ignore_case: bool) -> Option<PathBuf> {
    dirs.iter()
        .find_map(|dir| find_in_dir(program, dir, ignore_case))
}

fn find_in_dir(program: &str, dir: &Path, ignore_case: bool) -> Option<PathBuf> {
    let read_dir = fs::read_dir(dir).ok()?;
    log::debug!("searching {}", dir.display());

    let mut candidates: Vec<PathBuf> = read_dir
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|name| matches_pattern(name, program, ignore_case))
        })
        .collect();
    candidates.sort();

    let found = candidates.into_iter().find(|path| !is_handler(path));
    if let Some(path) = &found {
        log::debug!("found {} for '{program}'", path.display());
    }
    found
}

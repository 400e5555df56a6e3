//! Font lookup for tick labels.

use std::path::{Path, PathBuf};

use rusttype::Font;
use tracing::debug;

use crate::error::GaugeError;

const MAX_SEARCH_DEPTH: usize = 4;

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// True when `path` is a TrueType/OpenType file for the regular face of
/// `family`, e.g. `Arial.ttf`, `arial.ttf` or `Arial-Regular.otf`.
pub fn matches_family(path: &Path, family: &str) -> bool {
    let is_font = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"));
    if !is_font {
        return false;
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let (stem, family) = (squash(stem), squash(family));
    !family.is_empty() && (stem == family || stem == format!("{family}regular"))
}

fn search(dir: &Path, family: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if matches_family(&path, family) {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| search(sub, family, depth - 1))
}

/// Look for a font file of `family` in the usual system font directories.
pub fn resolve_font_file(family: &str) -> Option<PathBuf> {
    font_dirs()
        .iter()
        .find_map(|dir| search(dir, family, MAX_SEARCH_DEPTH))
}

pub fn load_font(path: &Path) -> Result<Font<'static>, GaugeError> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data).ok_or_else(|| GaugeError::FontLoad(path.to_path_buf()))
}

/// Load the font at `path` if given, otherwise the system font for `family`.
pub fn load_family(family: &str, path: Option<&Path>) -> Result<Font<'static>, GaugeError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            resolve_font_file(family).ok_or_else(|| GaugeError::FontNotFound(family.to_string()))?
        }
    };
    debug!(family, path = %path.display(), "loading label font");
    load_font(&path)
}

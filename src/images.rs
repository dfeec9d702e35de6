use std::path::Path;

use walkdir::WalkDir;

use crate::lyrics::LyricLine;
use crate::ui::prelude::*;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Collect background image file names from a directory, sorted for stable
/// assignment across runs. An unreadable directory warns and yields an empty
/// pool instead of failing the run.
pub fn scan_pool(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image(entry.path()) {
                    names.push(entry.file_name().to_string_lossy().to_string());
                }
            }
            Err(err) => {
                emit(
                    Level::Warn,
                    "images.unreadable",
                    &format!("Could not read images directory: {err}"),
                    None,
                );
                return Vec::new();
            }
        }
    }
    names.sort();
    names
}

/// Cycle the pool over the lines: line 0 gets image 0, line 1 image 1, and so
/// on, wrapping around. An empty pool leaves every line without an image.
pub fn assign_backgrounds(lines: &mut [LyricLine], pool: &[String]) {
    if pool.is_empty() {
        return;
    }
    for (index, line) in lines.iter_mut().enumerate() {
        line.background_image = Some(pool[index % pool.len()].clone());
    }
}

//! フォント・背景画像の候補探索

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];
const BACKGROUND_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

fn list_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        let ext = crate::platform::io::extension_of(&path);
        if path.is_file() && extensions.contains(&ext.as_str()) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// ディレクトリ内のフォント（名前順）
pub fn font_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    list_with_extensions(dir, FONT_EXTENSIONS)
}

/// ディレクトリ内の背景画像（名前順）
pub fn background_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    list_with_extensions(dir, BACKGROUND_EXTENSIONS)
}

/// システムフォントの候補。
///
/// ディストリ差が大きいため、ある確率が高そうなものを列挙する
pub fn system_font_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![
        // DejaVu
        PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        PathBuf::from("/usr/share/fonts/dejavu/DejaVuSans.ttf"),
        // Liberation
        PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
        // Noto
        PathBuf::from("/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf"),
        // FreeFont
        PathBuf::from("/usr/share/fonts/truetype/freefont/FreeSans.ttf"),
        // macOS
        PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"),
        PathBuf::from("/Library/Fonts/Arial.ttf"),
    ];
    if cfg!(target_os = "windows") {
        candidates.insert(0, PathBuf::from("C:\\Windows\\Fonts\\arial.ttf"));
        candidates.insert(1, PathBuf::from("C:\\Windows\\Fonts\\segoeui.ttf"));
    }
    candidates
}

/// 最初に見つかったシステムフォント
pub fn find_system_font() -> Option<PathBuf> {
    system_font_candidates().into_iter().find(|p| p.is_file())
}

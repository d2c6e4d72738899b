//! Parameter presets stored as pretty-printed JSON.

use anyhow::{Context, Result};
use std::path::Path;

use crate::engine::params::Parameters;

/// 既定のプリセットファイル
pub const DEFAULT_PRESET_PATH: &str = "Parameter/default.json";

/// Reads a preset; keys missing from the file take their defaults. When
/// the file does not exist it is created with the defaults.
pub fn load_or_init(path: &Path) -> Result<Parameters> {
    if !path.exists() {
        let params = Parameters::default();
        save(path, &params)?;
        log::info!(target: "Preset", "created default preset at {}", path.display());
        return Ok(params);
    }
    load(path)
}

pub fn load(path: &Path) -> Result<Parameters> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read preset {}", path.display()))?;
    let params: Parameters = serde_json::from_str(&text)
        .with_context(|| format!("invalid preset {}", path.display()))?;
    Ok(params)
}

pub fn save(path: &Path, params: &Parameters) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(params).context("failed to encode preset")?;
    std::fs::write(path, json).with_context(|| format!("failed to write preset {}", path.display()))?;
    Ok(())
}

//! Console configuration.
//!
//! Settings come from `waymark.toml` in the working directory, then from
//! the user config dir. A missing or unparseable file means defaults with
//! a warning; configuration problems never stop startup.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for zone `.xml` files.
    pub maps_dir: PathBuf,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            maps_dir: detect_maps_dir(),
        }
    }
}

/// Load settings from the usual places. Never fails; the fallback is a
/// default `Settings` with the maps directory auto-detected.
pub fn load_settings() -> Settings {
    let Some(path) = config_file() else {
        info!("no waymark.toml found; using defaults");
        return Settings::default();
    };
    match try_load_settings(&path) {
        Ok(settings) => {
            info!("settings loaded from '{}'", path.display());
            settings
        },
        Err(e) => {
            warn!("could not load settings from '{}': {e:#}. Using defaults.", path.display());
            Settings::default()
        },
    }
}

fn config_file() -> Option<PathBuf> {
    let local = PathBuf::from("waymark.toml");
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("waymark/waymark.toml");
    user.is_file().then_some(user)
}

fn try_load_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path).with_context(|| format!("reading settings from '{}'", path.display()))?;
    let settings =
        toml::from_str(&text).with_context(|| format!("parsing settings from '{}'", path.display()))?;
    Ok(settings)
}

/// Most likely maps directory when none is configured: `data/maps` (or
/// bare `maps`) beside the working directory or the executable.
fn detect_maps_dir() -> PathBuf {
    let mut candidates = vec![PathBuf::from("data/maps"), PathBuf::from("maps")];

    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("data/maps"));
        candidates.push(dir.join("maps"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("data/maps"));
            candidates.push(parent.join("maps"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("data/maps"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_sets_maps_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("waymark.toml");
        fs::write(&path, "maps_dir = \"/srv/mud/maps\"\n")?;

        let settings = try_load_settings(&path)?;
        assert_eq!(settings.maps_dir, PathBuf::from("/srv/mud/maps"));
        Ok(())
    }

    #[test]
    fn empty_settings_file_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("waymark.toml");
        fs::write(&path, "")?;

        let settings = try_load_settings(&path)?;
        assert_eq!(settings.maps_dir, Settings::default().maps_dir);
        Ok(())
    }

    #[test]
    fn unparseable_settings_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("waymark.toml");
        fs::write(&path, "maps_dir = [nonsense")?;

        assert!(try_load_settings(&path).is_err());
        Ok(())
    }
}

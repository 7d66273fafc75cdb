// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! On-disk UI preferences. Losing this file costs a scroll position and
//! some toggles, so reads never fail: anything unreadable falls back to
//! the defaults and the next save rewrites it.

use anyhow::{Context, Result, anyhow};
use longbox_app::UiPreferences;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::APP_NAME;

pub fn default_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("LONGBOX_PREFS_PATH") {
        return Ok(PathBuf::from(path));
    }

    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set LONGBOX_PREFS_PATH to the preferences file")
    })?;
    Ok(data_root.join(APP_NAME).join("ui.toml"))
}

pub fn load(path: &Path) -> UiPreferences {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return UiPreferences::default(),
    };

    match toml::from_str(&raw) {
        Ok(prefs) => prefs,
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable preferences");
            UiPreferences::default()
        }
    }
}

pub fn save(path: &Path, prefs: &UiPreferences) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create preferences directory {}", parent.display()))?;
    }

    let rendered = toml::to_string(prefs).context("encode preferences")?;
    fs::write(path, rendered)
        .with_context(|| format!("write preferences file {}", path.display()))
}

//! Loads a detector configuration from disk.
//!
//! Both JSON (`conf.json` style) and TOML are accepted, chosen by file
//! extension. The capture keys (`fps`, `camera_warmup_time`) are read so they can
//! be reported, but this tool replays still frames and never acts on them.

use anyhow::{Context, Result, bail};
use needle_motion::MotionConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaptureSettings {
    pub fps: Option<f64>,
    pub camera_warmup_time: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub motion: MotionConfig,
    pub capture: CaptureSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => bail!("unsupported configuration format {:?} for {}", other, path.display()),
    }
}

pub fn parse(text: &str, path: &Path) -> Result<Settings> {
    let settings = match format_of(path)? {
        Format::Json => Settings {
            motion: serde_json::from_str(text).context("invalid detector settings")?,
            capture: serde_json::from_str(text).context("invalid capture settings")?,
        },
        Format::Toml => Settings {
            motion: toml::from_str(text).context("invalid detector settings")?,
            capture: toml::from_str(text).context("invalid capture settings")?,
        },
    };
    settings.motion.validate()?;
    Ok(settings)
}

pub fn load(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse(&text, path).with_context(|| format!("loading {}", path.display()))
}

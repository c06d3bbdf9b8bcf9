//! Project configuration stored in `qgate.toml` at the project root.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::mode::Mode;

pub const CONFIG_FILE_NAME: &str = "qgate.toml";

/// Quality pipeline configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to defaults, and
/// a missing file is the same as an empty one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QualityConfig {
    /// Mode used by the command line when `--mode` is not given.
    pub default_mode: Mode,

    /// Wall-clock budget for each individual check, in seconds.
    pub check_timeout_secs: u64,

    /// Captured stdout/stderr beyond this many bytes per stream is dropped.
    pub output_limit_bytes: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            default_mode: Mode::Essential,
            check_timeout_secs: 10 * 60,
            output_limit_bytes: 200_000,
        }
    }
}

impl QualityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.check_timeout_secs == 0 {
            return Err(anyhow!("check_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `QualityConfig::default()`.
pub fn load_config(path: &Path) -> Result<QualityConfig> {
    if !path.exists() {
        let cfg = QualityConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: QualityConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `qgate.toml` from a project root.
pub fn load_project_config(project_dir: &Path) -> Result<QualityConfig> {
    load_config(&project_dir.join(CONFIG_FILE_NAME))
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &QualityConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

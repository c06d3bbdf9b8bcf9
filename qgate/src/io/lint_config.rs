//! Materializes bundled golangci-lint rulesets into short-lived config files.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempPath;
use tracing::debug;

use crate::core::mode::LintAsset;

const STRICT: &str = include_str!("lint_configs/strict.yml");
const STYLE: &str = include_str!("lint_configs/style.yml");
const COMPLEXITY: &str = include_str!("lint_configs/complexity.yml");
const SECURITY: &str = include_str!("lint_configs/security.yml");

/// Stable name shown in captured output in place of the per-run file name.
pub const LINT_CONFIG_PLACEHOLDER: &str = ".golangci.yml";

/// Config file names golangci-lint discovers on its own.
pub const LOCAL_CONFIG_NAMES: [&str; 4] = [
    ".golangci.yml",
    ".golangci.yaml",
    ".golangci.toml",
    ".golangci.json",
];

const TEMP_PREFIX: &str = ".golangci-qgate-";
const TEMP_SUFFIX: &str = ".yml";

/// Bundled ruleset bytes.
pub fn asset_contents(asset: LintAsset) -> &'static str {
    match asset {
        LintAsset::Strict => STRICT,
        LintAsset::Style => STYLE,
        LintAsset::Complexity => COMPLEXITY,
        LintAsset::Security => SECURITY,
    }
}

/// Look up a bundled ruleset by name.
pub fn asset_by_name(name: &str) -> Result<LintAsset> {
    LintAsset::ALL
        .into_iter()
        .find(|asset| asset.name() == name)
        .ok_or_else(|| anyhow!("lint config asset {name:?} not found"))
}

/// A materialized ruleset file. The file is removed when the handle is
/// released or dropped, whichever comes first.
#[derive(Debug)]
pub struct LinterConfigHandle {
    asset: LintAsset,
    path: TempPath,
}

impl LinterConfigHandle {
    pub fn asset(&self) -> LintAsset {
        self.asset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Substitutions that hide the per-run file name in captured output.
    ///
    /// The full path comes first so it is never left half-replaced.
    pub fn redactions(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            self.path.display().to_string(),
            LINT_CONFIG_PLACEHOLDER.to_string(),
        )];
        if let Some(name) = self.path.file_name().and_then(|n| n.to_str()) {
            pairs.push((name.to_string(), LINT_CONFIG_PLACEHOLDER.to_string()));
        }
        pairs
    }

    /// Remove the file now, surfacing removal errors.
    pub fn release(self) -> Result<()> {
        let shown = self.path.display().to_string();
        self.path
            .close()
            .with_context(|| format!("remove lint config {shown}"))?;
        debug!(path = %shown, "lint config released");
        Ok(())
    }
}

/// Write `asset` to a uniquely named file inside `dir`.
///
/// Names carry a random suffix so concurrent runs in the same directory never
/// share a file.
pub fn materialize(asset: LintAsset, dir: &Path) -> Result<LinterConfigHandle> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .with_context(|| format!("create lint config in {}", dir.display()))?;
    file.write_all(asset_contents(asset).as_bytes())
        .with_context(|| format!("write lint config {}", file.path().display()))?;
    file.flush().context("flush lint config")?;
    let path = file.into_temp_path();
    debug!(asset = asset.name(), path = %path.display(), "lint config materialized");
    Ok(LinterConfigHandle { asset, path })
}

/// First golangci-lint config file present in `dir`, if any.
pub fn find_local_config(dir: &Path) -> Option<PathBuf> {
    LOCAL_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

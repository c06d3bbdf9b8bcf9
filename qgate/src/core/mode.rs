//! Check modes and the mode → checks descriptor table.
//!
//! The table is a total function over [`Mode`]; adding a mode forces every
//! match below to be revisited.

use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::checks::CheckKind;

/// Named preset selecting which checks run and which linter ruleset applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Essential,
    Strict,
    Style,
    Complexity,
    Security,
    Local,
}

impl Mode {
    /// All modes in display order.
    pub const ALL: [Mode; 6] = [
        Mode::Essential,
        Mode::Strict,
        Mode::Style,
        Mode::Complexity,
        Mode::Security,
        Mode::Local,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Essential => "essential",
            Mode::Strict => "strict",
            Mode::Style => "style",
            Mode::Complexity => "complexity",
            Mode::Security => "security",
            Mode::Local => "local",
        }
    }

    /// One-line description shown by `qgate modes`.
    pub fn description(self) -> &'static str {
        match self {
            Mode::Essential => "build, vet, vulnerability and secret scans; no deep linting",
            Mode::Strict => "build, vet, strict golangci-lint ruleset, vulnerability scan",
            Mode::Style => "build and style-focused golangci-lint ruleset",
            Mode::Complexity => "build and complexity-focused golangci-lint ruleset",
            Mode::Security => "build, security golangci-lint ruleset, vulnerability and secret scans",
            Mode::Local => "build, vet, golangci-lint with the project's own config file",
        }
    }

    /// Resolve the mode to the checks it enables.
    pub fn plan(self) -> ModePlan {
        match self {
            Mode::Essential => ModePlan {
                build: true,
                vet: true,
                vulnerability_scan: true,
                secret_scan: true,
                lint: LintSource::Skip,
            },
            Mode::Strict => ModePlan {
                build: true,
                vet: true,
                vulnerability_scan: true,
                secret_scan: false,
                lint: LintSource::Embedded(LintAsset::Strict),
            },
            Mode::Style => ModePlan {
                build: true,
                vet: false,
                vulnerability_scan: false,
                secret_scan: false,
                lint: LintSource::Embedded(LintAsset::Style),
            },
            Mode::Complexity => ModePlan {
                build: true,
                vet: false,
                vulnerability_scan: false,
                secret_scan: false,
                lint: LintSource::Embedded(LintAsset::Complexity),
            },
            Mode::Security => ModePlan {
                build: true,
                vet: false,
                vulnerability_scan: true,
                secret_scan: true,
                lint: LintSource::Embedded(LintAsset::Security),
            },
            Mode::Local => ModePlan {
                build: true,
                vet: true,
                vulnerability_scan: false,
                secret_scan: false,
                lint: LintSource::Local,
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    /// Case-sensitive: `Strict` is not `strict`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Mode::ALL.iter().map(|m| m.as_str()).collect();
                anyhow!("invalid mode {s:?} (expected one of: {})", valid.join(", "))
            })
    }
}

/// Bundled golangci-lint rulesets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintAsset {
    Strict,
    Style,
    Complexity,
    Security,
}

impl LintAsset {
    pub const ALL: [LintAsset; 4] = [
        LintAsset::Strict,
        LintAsset::Style,
        LintAsset::Complexity,
        LintAsset::Security,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LintAsset::Strict => "strict",
            LintAsset::Style => "style",
            LintAsset::Complexity => "complexity",
            LintAsset::Security => "security",
        }
    }
}

/// Where the deep-lint check gets its configuration from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSource {
    /// Deep linting does not run.
    Skip,
    /// A bundled ruleset is materialized into a temp file for the run.
    Embedded(LintAsset),
    /// golangci-lint discovers the project's own config file.
    Local,
}

/// Checks enabled for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePlan {
    pub build: bool,
    pub vet: bool,
    pub vulnerability_scan: bool,
    pub secret_scan: bool,
    pub lint: LintSource,
}

impl ModePlan {
    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::Build => self.build,
            CheckKind::Vet => self.vet,
            CheckKind::DeepLint => self.lint != LintSource::Skip,
            CheckKind::VulnerabilityScan => self.vulnerability_scan,
            CheckKind::SecretScan => self.secret_scan,
        }
    }

    /// Enabled checks in pipeline order.
    pub fn enabled_checks(&self) -> Vec<CheckKind> {
        CheckKind::PIPELINE_ORDER
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_mode_name() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().expect("parse"), mode);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("Strict".parse::<Mode>().is_err());
        assert!("ESSENTIAL".parse::<Mode>().is_err());
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        let err = "turbo".parse::<Mode>().expect_err("turbo is not a mode");
        assert!(err.to_string().contains("invalid mode \"turbo\""));
        assert!(err.to_string().contains("essential"));
    }

    #[test]
    fn default_mode_is_essential() {
        assert_eq!(Mode::default(), Mode::Essential);
    }

    #[test]
    fn essential_skips_deep_lint() {
        let plan = Mode::Essential.plan();
        assert_eq!(plan.lint, LintSource::Skip);
        assert_eq!(
            plan.enabled_checks(),
            vec![
                CheckKind::Build,
                CheckKind::Vet,
                CheckKind::VulnerabilityScan,
                CheckKind::SecretScan,
            ]
        );
    }

    #[test]
    fn strict_runs_four_checks_with_embedded_ruleset() {
        let plan = Mode::Strict.plan();
        assert_eq!(plan.lint, LintSource::Embedded(LintAsset::Strict));
        assert_eq!(
            plan.enabled_checks(),
            vec![
                CheckKind::Build,
                CheckKind::Vet,
                CheckKind::DeepLint,
                CheckKind::VulnerabilityScan,
            ]
        );
    }

    #[test]
    fn local_mode_uses_project_config() {
        let plan = Mode::Local.plan();
        assert_eq!(plan.lint, LintSource::Local);
        assert!(plan.is_enabled(CheckKind::DeepLint));
        assert!(!plan.is_enabled(CheckKind::SecretScan));
    }

    #[test]
    fn every_mode_builds_first() {
        for mode in Mode::ALL {
            assert_eq!(mode.plan().enabled_checks()[0], CheckKind::Build, "{mode}");
        }
    }

    #[test]
    fn embedded_modes_map_to_their_own_asset() {
        assert_eq!(
            Mode::Style.plan().lint,
            LintSource::Embedded(LintAsset::Style)
        );
        assert_eq!(
            Mode::Complexity.plan().lint,
            LintSource::Embedded(LintAsset::Complexity)
        );
        assert_eq!(
            Mode::Security.plan().lint,
            LintSource::Embedded(LintAsset::Security)
        );
    }
}

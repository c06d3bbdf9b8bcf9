//! Static descriptors for every check the pipeline can run.

/// Pipeline stage, in the fixed order the orchestrator walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Build,
    Vet,
    DeepLint,
    VulnerabilityScan,
    SecretScan,
}

impl CheckKind {
    pub const PIPELINE_ORDER: [CheckKind; 5] = [
        CheckKind::Build,
        CheckKind::Vet,
        CheckKind::DeepLint,
        CheckKind::VulnerabilityScan,
        CheckKind::SecretScan,
    ];

    pub fn spec(self) -> &'static CheckSpec {
        match self {
            CheckKind::Build => &BUILD,
            CheckKind::Vet => &VET,
            CheckKind::DeepLint => &DEEP_LINT,
            CheckKind::VulnerabilityScan => &VULNERABILITY_SCAN,
            CheckKind::SecretScan => &SECRET_SCAN,
        }
    }
}

/// Immutable description of one potential pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    pub kind: CheckKind,
    /// Display name used in results and reports.
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub success_message: &'static str,
    pub failure_advice: &'static str,
    pub install_hint: &'static str,
    /// Caller-supplied paths are appended as positional arguments.
    pub accepts_paths: bool,
}

pub const BUILD: CheckSpec = CheckSpec {
    kind: CheckKind::Build,
    name: "Build",
    program: "go",
    args: &["build", "./..."],
    success_message: "Code compiles",
    failure_advice: "Fix the compilation errors first; remaining checks were skipped",
    install_hint: "install Go from https://go.dev/dl/",
    accepts_paths: false,
};

pub const VET: CheckSpec = CheckSpec {
    kind: CheckKind::Vet,
    name: "Vet",
    program: "go",
    args: &["vet", "./..."],
    success_message: "go vet found no issues",
    failure_advice: "Fix the suspicious constructs reported by go vet",
    install_hint: "install Go from https://go.dev/dl/",
    accepts_paths: false,
};

pub const DEEP_LINT: CheckSpec = CheckSpec {
    kind: CheckKind::DeepLint,
    name: "DeepLint",
    program: "golangci-lint",
    args: &["run"],
    success_message: "golangci-lint found no issues",
    failure_advice: "Address the golangci-lint findings listed below",
    install_hint: "go install github.com/golangci/golangci-lint/v2/cmd/golangci-lint@latest",
    accepts_paths: true,
};

pub const VULNERABILITY_SCAN: CheckSpec = CheckSpec {
    kind: CheckKind::VulnerabilityScan,
    name: "VulnerabilityScan",
    program: "govulncheck",
    args: &["./..."],
    success_message: "No known vulnerabilities in reachable code",
    failure_advice: "Upgrade the affected modules to a fixed version",
    install_hint: "go install golang.org/x/vuln/cmd/govulncheck@latest",
    accepts_paths: false,
};

pub const SECRET_SCAN: CheckSpec = CheckSpec {
    kind: CheckKind::SecretScan,
    name: "SecretScan",
    program: "gitleaks",
    args: &["detect", "--source", ".", "--no-banner", "--redact"],
    success_message: "No secrets detected",
    failure_advice: "Remove the leaked secrets and rotate the affected credentials",
    install_hint: "see https://github.com/gitleaks/gitleaks#installing",
    accepts_paths: false,
};

/// Scope used by path-aware checks when the caller gives no paths.
pub const DEFAULT_PATH_SCOPE: &str = "./...";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_kind_matches_lookup_key() {
        for kind in CheckKind::PIPELINE_ORDER {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn only_deep_lint_accepts_paths() {
        let scoped: Vec<CheckKind> = CheckKind::PIPELINE_ORDER
            .into_iter()
            .filter(|kind| kind.spec().accepts_paths)
            .collect();
        assert_eq!(scoped, vec![CheckKind::DeepLint]);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = CheckKind::PIPELINE_ORDER
            .iter()
            .map(|kind| kind.spec().name)
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CheckKind::PIPELINE_ORDER.len());
    }
}

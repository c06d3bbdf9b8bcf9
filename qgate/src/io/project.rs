//! Minimal project-type detection.

use std::path::Path;

/// Ecosystem tag for a project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Go,
    Unknown,
}

impl ProjectKind {
    /// Only Go projects have applicable checks.
    pub fn has_checks(self) -> bool {
        matches!(self, ProjectKind::Go)
    }
}

/// A directory with a `go.mod` or `go.work` file is a Go project.
pub fn detect_project(dir: &Path) -> ProjectKind {
    if dir.join("go.mod").is_file() || dir.join("go.work").is_file() {
        ProjectKind::Go
    } else {
        ProjectKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn go_mod_marks_go_project() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(detect_project(temp.path()), ProjectKind::Unknown);
        fs::write(temp.path().join("go.mod"), "module example.com/demo\n").expect("write");
        assert_eq!(detect_project(temp.path()), ProjectKind::Go);
        assert!(detect_project(temp.path()).has_checks());
    }

    #[test]
    fn go_work_marks_go_project() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("go.work"), "go 1.22\n").expect("write");
        assert_eq!(detect_project(temp.path()), ProjectKind::Go);
    }
}

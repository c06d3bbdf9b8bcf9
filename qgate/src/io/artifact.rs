//! Persistence of the failure artifact (`QUALITY_FAILURES.md`).
//!
//! The artifact mirrors the latest completed run only: it is rewritten
//! wholesale after a failing run and removed after a clean one.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

pub const FAILURE_ARTIFACT_NAME: &str = "QUALITY_FAILURES.md";

pub fn artifact_path(project_dir: &Path) -> PathBuf {
    project_dir.join(FAILURE_ARTIFACT_NAME)
}

/// Replace the artifact contents (temp file + rename, never appended).
///
/// Every call stages into its own uniquely named temp file; the last rename wins.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".quality-failures-")
        .suffix(".md.tmp")
        .tempfile_in(dir)
        .with_context(|| format!("create temp artifact in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp artifact {}", tmp.path().display()))?;
    tmp.flush().context("flush temp artifact")?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("replace {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "failure artifact written");
    Ok(())
}

/// Remove the artifact. Returns whether a file was removed.
pub fn remove_artifact(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "failure artifact removed");
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_overwrites_previous_contents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = artifact_path(temp.path());
        write_artifact(&path, "first\n").expect("first");
        write_artifact(&path, "second\n").expect("second");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second\n");
        let entries: Vec<_> = fs::read_dir(temp.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(FAILURE_ARTIFACT_NAME)]);
    }

    #[test]
    fn concurrent_writers_do_not_collide() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = artifact_path(temp.path());

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let path = path.clone();
                std::thread::spawn(move || {
                    for round in 0..20 {
                        write_artifact(&path, &format!("writer {n} round {round}\n"))?;
                    }
                    anyhow::Ok(())
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("join").expect("write");
        }

        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.ends_with("round 19\n"), "{contents}");
    }

    #[test]
    fn remove_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = artifact_path(temp.path());
        write_artifact(&path, "stale\n").expect("write");
        assert!(remove_artifact(&path).expect("remove"));
        assert!(!remove_artifact(&path).expect("remove again"));
        assert!(!path.exists());
    }
}

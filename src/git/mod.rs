//! Repository cloning.
//!
//! Setup starts by cloning the configured repository with the system
//! `git`. The target directory must be missing or empty.

use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Result, RigupError};

/// Last path component of a repository URL, without `.git`.
static REPO_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^/\\:]+?)(?:\.git)?[/\\]*$").expect("repository name regex is valid")
});

/// Clone `url` into `target`, checking out `branch` when given.
///
/// # Errors
///
/// Returns `CloneFailed` if `target` exists and is not empty, if `git`
/// cannot be started, or if `git clone` exits unsuccessfully.
pub fn clone_repository(url: &str, target: &Path, branch: Option<&str>) -> Result<()> {
    if !is_empty_dir(target)? {
        return Err(RigupError::CloneFailed {
            url: url.to_string(),
            message: format!("{} already exists and is not empty", target.display()),
        });
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone");
    if let Some(branch) = branch {
        cmd.args(["--branch", branch]);
    }
    cmd.arg(url).arg(target);

    debug!("Running {:?}", cmd);
    let output = cmd.output().map_err(|e| RigupError::CloneFailed {
        url: url.to_string(),
        message: format!("could not run git: {}", e),
    })?;

    if !output.status.success() {
        return Err(RigupError::CloneFailed {
            url: url.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    info!("Cloned {} into {}", url, target.display());
    Ok(())
}

/// Directory name git would pick for `url`.
///
/// Handles `https://host/org/app.git`, `git@host:org/app.git`, local
/// paths and trailing slashes. Returns `None` when no name can be found.
pub fn repo_dir_name(url: &str) -> Option<String> {
    REPO_NAME_REGEX
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty() && name != "." && name != "..")
}

/// Whether `dir` is a git working tree.
pub fn is_git_checkout(dir: &Path) -> bool {
    dir.join(".git").exists()
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    match std::fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(RigupError::Io(e)),
    }
}

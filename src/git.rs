//! Thin wrapper over the system `git` binary.
//!
//! Every call runs `git -C <work_dir> <args...>` and blocks until it returns.
//! Non-zero exits become [`Error::Git`] carrying the trimmed stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, error};

use crate::error::{Error, Result};

/// Runs git commands inside one directory.
#[derive(Debug, Clone)]
pub struct Git {
    work_dir: PathBuf,
}

impl Git {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Runs git and returns the raw output, whatever the exit status.
    pub fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(dir = %self.work_dir.display(), args = ?args, "Running git");
        Command::new("git")
            .arg("-C")
            .arg(&self.work_dir)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                error!(error = ?e, dir = %self.work_dir.display(), "Failed to launch git process");
                Error::Spawn {
                    program: "git".to_string(),
                    source: e,
                }
            })
    }

    /// Runs git and returns stdout; fails on a non-zero exit.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(
                dir = %self.work_dir.display(),
                args = ?args,
                status = %output.status,
                stderr = %stderr,
                "Git exited with non-zero code"
            );
            return Err(Error::Git {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `git config --get <key>`; an unset key is `None`.
    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        let output = self.output(&["config", "--get", key])?;
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(value))
            }
            // 1 means the key is not set
            Some(1) => Ok(None),
            _ => Err(Error::Git {
                command: format!("config --get {key}"),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    pub fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.run(&["config", key, value]).map(|_| ())
    }

    pub fn init(&self) -> Result<()> {
        self.run(&["init"]).map(|_| ())
    }

    pub fn add(&self, pathspec: &str) -> Result<()> {
        self.run(&["add", pathspec]).map(|_| ())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch]).map(|_| ())
    }

    pub fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["pull", remote, branch]).map(|_| ())
    }

    pub fn checkout(&self, args: &[&str]) -> Result<()> {
        let mut full = vec!["checkout"];
        full.extend_from_slice(args);
        self.run(&full).map(|_| ())
    }
}

/// `git config --global --get <key>` outside of any repository.
pub(crate) fn global_config_get(key: &str) -> Result<Option<String>> {
    let output = Command::new("git")
        .args(["config", "--global", "--get", key])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::Spawn {
            program: "git".to_string(),
            source: e,
        })?;
    if output.status.success() {
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(value).filter(|v| !v.is_empty()))
    } else {
        Ok(None)
    }
}

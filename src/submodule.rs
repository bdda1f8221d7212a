//! Submodules of a repository.
//!
//! The registry keeps no state of its own: [`SubmoduleRegistry::refresh`]
//! re-reads `.gitmodules` and re-queries `git submodule status` every time it
//! is called, and hands back a fresh map.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{is_separator, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::gitmodules::read_gitmodules;
use crate::repository::Repository;

/// Where a submodule stands, as reported by `git submodule status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleStatus {
    /// git reports nothing for the path.
    Unregistered,
    /// Listed but not initialised (`-`).
    Registered,
    /// Checked-out commit differs from the recorded one (`+`), or conflicts (`U`).
    OutOfDate,
    /// Checked out at the recorded commit.
    Current,
}

impl SubmoduleStatus {
    fn from_code(code: char) -> Result<Self> {
        match code {
            '-' => Ok(SubmoduleStatus::Registered),
            '+' | 'U' => Ok(SubmoduleStatus::OutOfDate),
            ' ' => Ok(SubmoduleStatus::Current),
            other => Err(Error::Parse {
                what: "submodule status".to_string(),
                message: format!("unknown status code '{other}'"),
            }),
        }
    }
}

/// A repository submodule: its path, url, commit and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleRecord {
    pub url: String,
    pub path: String,
    pub commit: Option<String>,
    pub status: SubmoduleStatus,
}

impl SubmoduleRecord {
    /// A record not yet known to git. Trailing separators are stripped from `path`.
    pub fn new(url: impl Into<String>, path: impl AsRef<str>) -> Self {
        Self {
            url: url.into(),
            path: normalize_path(path.as_ref()),
            commit: None,
            status: SubmoduleStatus::Unregistered,
        }
    }

    /// Adds the submodule to `repo` and commits the result. No-op once git knows the path.
    pub fn init(&self, repo: &Repository, message: Option<&str>) -> Result<()> {
        if self.status != SubmoduleStatus::Unregistered {
            debug!(path = %self.path, status = ?self.status, "Submodule already registered");
            return Ok(());
        }
        let default_message = format!("Add a submodule for \"{}\" at \"{}\"", self.url, self.path);
        let message = message.unwrap_or(&default_message);

        let git = repo.git();
        git.run(&["submodule", "add", &self.url, &self.path])?;
        git.run(&["submodule", "init", "--", &self.path])?;
        git.commit(message)?;
        info!(url = %self.url, path = %self.path, "Added submodule");
        Ok(())
    }

    /// Checks the submodule out at the commit recorded by the parent.
    pub fn update(&self, repo: &Repository) -> Result<()> {
        let git = repo.git();
        if self.status == SubmoduleStatus::Registered {
            git.run(&["submodule", "init", "--", &self.path])?;
        }
        git.run(&["submodule", "update", "--", &self.path])?;
        info!(path = %self.path, "Updated submodule");
        Ok(())
    }

    /// Location of the nested working copy.
    pub fn location(&self, repo: &Repository) -> PathBuf {
        repo.path().join(&self.path)
    }

    /// Opens the nested working copy as its own repository.
    pub fn working_copy(&self, repo: &Repository) -> Result<Repository> {
        Repository::open(self.location(repo))
    }
}

/// Snapshot of a repository's submodules, keyed by path.
pub type Submodules = BTreeMap<String, SubmoduleRecord>;

/// Submodule access for one repository.
pub struct SubmoduleRegistry<'r> {
    repo: &'r Repository,
}

impl<'r> SubmoduleRegistry<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    /// Parses `.gitmodules` and queries the status of every entry.
    pub fn refresh(&self) -> Result<Submodules> {
        let mut submodules = Submodules::new();
        let gitmodules = self.repo.path().join(".gitmodules");
        if !gitmodules.exists() {
            return Ok(submodules);
        }

        let file = File::open(&gitmodules).map_err(|e| Error::io(&gitmodules, e))?;
        for section in read_gitmodules(BufReader::new(file))? {
            let (path, url) = match (section.get("path"), section.get("url")) {
                (Some(path), Some(url)) => (path, url),
                _ => {
                    return Err(Error::Parse {
                        what: ".gitmodules".to_string(),
                        message: format!("section [{}] needs both path and url", section.name),
                    })
                }
            };
            let mut record = SubmoduleRecord::new(url, path);
            let (status, commit) = self.query_status(&record.path)?;
            record.status = status;
            record.commit = commit;
            submodules.insert(record.path.clone(), record);
        }
        debug!(count = submodules.len(), "Refreshed submodules");
        Ok(submodules)
    }

    /// Fresh lookup of one submodule by path.
    pub fn get(&self, path: &str) -> Result<Option<SubmoduleRecord>> {
        Ok(self.refresh()?.remove(&normalize_path(path)))
    }

    /// Registers `url` at `path` unless a submodule already lives there.
    pub fn add(&self, url: &str, path: &str, message: Option<&str>) -> Result<SubmoduleRecord> {
        let record = match self.get(path)? {
            Some(existing) if existing.status != SubmoduleStatus::Unregistered => {
                info!(path = %existing.path, url = %existing.url, "Submodule path already registered");
                return Ok(existing);
            }
            // listed in .gitmodules only
            Some(listed) => listed,
            None => SubmoduleRecord::new(url, path),
        };
        record.init(self.repo, message)?;
        self.get(&record.path)?
            .ok_or_else(|| Error::SubmoduleMissing(record.path.clone()))
    }

    fn query_status(&self, path: &str) -> Result<(SubmoduleStatus, Option<String>)> {
        let output = self.repo.git().output(&["submodule", "status", "--", path])?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().find(|l| !l.trim().is_empty());
        match (output.status.success(), line) {
            (true, Some(line)) => parse_status_line(line),
            _ => {
                debug!(path = path, "No submodule status reported");
                Ok((SubmoduleStatus::Unregistered, None))
            }
        }
    }
}

fn parse_status_line(line: &str) -> Result<(SubmoduleStatus, Option<String>)> {
    static STATUS_LINE: OnceLock<Regex> = OnceLock::new();
    let re = STATUS_LINE.get_or_init(|| {
        Regex::new(r"^(.)([0-9a-f]{40}(?:[0-9a-f]{24})?)\s").expect("valid status regex")
    });
    let caps = re.captures(line).ok_or_else(|| Error::Parse {
        what: "submodule status".to_string(),
        message: format!("unexpected line '{line}'"),
    })?;
    let code = caps[1].chars().next().unwrap_or(' ');
    let status = SubmoduleStatus::from_code(code)?;
    Ok((status, Some(caps[2].to_string())))
}

fn normalize_path(path: &str) -> String {
    path.trim_end_matches(is_separator).to_string()
}

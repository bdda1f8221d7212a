//! A local git working copy.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::git::Git;
use crate::submodule::SubmoduleRegistry;

/// Handle on a working copy. Submodule bookkeeping lives in [`SubmoduleRegistry`].
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    git: Git,
}

impl Repository {
    /// Attaches to an existing working copy.
    ///
    /// `path` must contain a `.git` directory, or a `.git` file pointing at
    /// the git dir as nested submodule checkouts have.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !is_working_copy(path) {
            return Err(Error::NotAWorkingCopy(path.to_path_buf()));
        }
        debug!(path = %path.display(), "Opened working copy");
        Ok(Self {
            path: path.to_path_buf(),
            git: Git::new(path),
        })
    }

    /// Runs `git init` in `path`, creating the directory first when asked to.
    pub fn initialize(path: impl AsRef<Path>, create_directory: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if !create_directory {
                return Err(Error::NotAWorkingCopy(path.to_path_buf()));
            }
            fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
            debug!(path = %path.display(), "Created repository directory");
        }
        Git::new(path).init()?;
        info!(path = %path.display(), "Initialized working copy");
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Absolute path of the git metadata directory.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let out = self.git.run(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(out.trim()))
    }

    /// The checked-out branch, `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let output = self.git.output(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(branch).filter(|b| !b.is_empty()))
    }

    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        self.git.config_get(&format!("remote.{name}.url"))
    }

    pub fn has_remote(&self, name: &str) -> Result<bool> {
        Ok(self.remote_url(name)?.is_some())
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.git.run(&["remote", "add", name, url])?;
        info!(remote = name, url = url, "Added remote");
        Ok(())
    }

    /// Names of all configured remotes.
    pub fn remotes(&self) -> Result<Vec<String>> {
        let out = self.git.run(&["remote"])?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    pub fn submodules(&self) -> SubmoduleRegistry<'_> {
        SubmoduleRegistry::new(self)
    }
}

fn is_working_copy(path: &Path) -> bool {
    let dot_git = path.join(".git");
    if dot_git.is_dir() {
        return true;
    }
    dot_git.is_file()
        && fs::read_to_string(&dot_git)
            .map(|content| content.starts_with("gitdir:"))
            .unwrap_or(false)
}

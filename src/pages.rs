//! Project registration and the gh-pages publishing workflow.
//!
//! Two repositories take part: the parent working copy tracks the submodule
//! pointer, and the gh-pages working copy nested inside it carries its own
//! history on the pages branch. Nothing is rolled back on failure; each step
//! checks what already exists so a command can be run again.

use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{error, info, warn};

use crate::config::Settings;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::hosting::{HostingApi, NewProject};
use crate::project::{RemoteProject, UrlKind};
use crate::repository::Repository;
use crate::submodule::{SubmoduleRecord, SubmoduleStatus};

pub const PLACEHOLDER_FILE: &str = "index.html";
pub const PLACEHOLDER_CONTENT: &str = "Documentation coming soon...";

/// What to register on the hosting service.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub project_name: String,
    pub description: String,
    pub is_public: bool,
    pub remote_name: String,
    pub master_branch: String,
    /// Read from the repository's git config when `None`.
    pub credentials: Option<Credentials>,
}

/// Result of [`update_pages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Changes were committed and pushed.
    Published { remote: String, branch: String },
    /// Changes are staged; committing and pushing is left to the user.
    StagedOnly,
}

/// Result of [`clean_pages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// The gh-pages submodule does not exist yet; nothing was touched.
    NotCreated,
    Cleaned { removed: usize },
}

/// Creates the project on the hosting service, adds it as a remote and pushes to it.
pub async fn register(
    repo: &Repository,
    api: &dyn HostingApi,
    request: RegisterRequest,
) -> Result<RemoteProject> {
    let credentials = match request.credentials {
        Some(credentials) => credentials,
        None => Credentials::resolve(Some(repo))?,
    };
    if !credentials.is_valid() {
        error!("GitHub credentials are not configured");
        return Err(Error::MissingCredentials);
    }

    info!(
        project = %request.project_name,
        user = ?credentials.user,
        "Creating a repository on GitHub"
    );
    let mut project = api
        .create_project(
            NewProject {
                name: request.project_name.clone(),
                description: request.description.clone(),
                is_public: request.is_public,
            },
            &credentials,
        )
        .await?;
    project.backfill_owner(&credentials);
    let ssh_url = project.url(UrlKind::Ssh)?;

    if repo.has_remote(&request.remote_name)? {
        warn!(
            remote = %request.remote_name,
            "Remote already exists, keeping it"
        );
    } else {
        repo.add_remote(&request.remote_name, &ssh_url)?;
    }

    repo.git().push(&request.remote_name, &request.master_branch)?;
    info!(
        remote = %request.remote_name,
        branch = %request.master_branch,
        "Pushed local branch to the new repository"
    );
    Ok(project)
}

/// Adds the gh-pages submodule as a root branch of the project's repository.
pub fn add_pages_submodule(
    repo: &Repository,
    pages_path: &str,
    remote_name: &str,
    pages_branch: &str,
) -> Result<SubmoduleRecord> {
    let url = repo
        .remote_url(remote_name)?
        .ok_or_else(|| Error::MissingRemote(remote_name.to_string()))?;

    // the root branch is only ever created on first registration
    if let Some(existing) = repo.submodules().get(pages_path)? {
        if existing.status != SubmoduleStatus::Unregistered {
            info!(path = %existing.path, "gh-pages submodule already exists");
            return validate_pages_submodule(repo, pages_path, pages_branch);
        }
    }
    let record = repo.submodules().add(&url, pages_path, None)?;

    let pages = record.working_copy(repo)?;
    let git = pages.git();
    git.run(&["symbolic-ref", "HEAD", &format!("refs/heads/{pages_branch}")])?;

    // the index still describes the default branch
    let index = pages.git_dir()?.join("index");
    if index.exists() {
        fs::remove_file(&index).map_err(|e| Error::io(&index, e))?;
    }
    empty_output_root(pages.path())?;

    let placeholder = pages.path().join(PLACEHOLDER_FILE);
    fs::write(&placeholder, PLACEHOLDER_CONTENT).map_err(|e| Error::io(&placeholder, e))?;
    git.add(PLACEHOLDER_FILE)?;
    git.commit("initial commit")?;
    git.push("origin", pages_branch)?;
    info!(path = %record.path, branch = pages_branch, "Created gh-pages root branch");

    repo.git().add(&record.path)?;
    repo.git().commit("update gh-pages submodule")?;
    info!(path = %record.path, "Committed gh-pages submodule reference");

    Ok(repo
        .submodules()
        .get(&record.path)?
        .unwrap_or(record))
}

/// Checks the gh-pages submodule exists and has the pages branch checked out.
pub fn validate_pages_submodule(
    repo: &Repository,
    pages_path: &str,
    pages_branch: &str,
) -> Result<SubmoduleRecord> {
    let record = repo
        .submodules()
        .get(pages_path)?
        .ok_or_else(|| Error::SubmoduleMissing(pages_path.to_string()))?;
    if record.status == SubmoduleStatus::Registered {
        return Err(Error::SubmoduleUninitialized(record.path));
    }
    let pages = record.working_copy(repo)?;

    match pages.current_branch()? {
        Some(branch) if branch == pages_branch => Ok(record),
        Some(branch) => Err(Error::WrongBranch {
            path: record.path,
            expected: pages_branch.to_string(),
            found: branch,
        }),
        None => Err(Error::NoActiveBranch {
            path: record.path,
            expected: pages_branch.to_string(),
        }),
    }
}

/// Stages the built documentation and, given a message, commits and pushes it.
pub fn update_pages(
    repo: &Repository,
    settings: &Settings,
    commit_message: Option<&str>,
) -> Result<PublishOutcome> {
    let record = validate_pages_submodule(repo, &settings.pages_path(), &settings.pages_branch)?;
    let pages = record.working_copy(repo)?;

    pages.git().add(".")?;
    info!(path = %record.path, "Added modified and untracked content to git index");

    let Some(message) = commit_message else {
        info!(
            "No commit message set... You will have to commit the last changes and push them to GitHub"
        );
        return Ok(PublishOutcome::StagedOnly);
    };

    pages.git().commit(message)?;
    pages.git().push(&settings.remote_name, &settings.pages_branch)?;
    info!(
        path = %record.path,
        remote = %settings.remote_name,
        branch = %settings.pages_branch,
        "Pushed documentation update"
    );
    info!(
        "You might want to update your submodule reference: git add {} && git commit -m \"built html doc updated\"",
        record.path
    );
    Ok(PublishOutcome::Published {
        remote: settings.remote_name.clone(),
        branch: settings.pages_branch.clone(),
    })
}

/// Resets the gh-pages submodule to its branch and empties the html root.
///
/// Uncommitted work in the submodule is lost.
pub fn clean_pages(repo: &Repository, settings: &Settings) -> Result<CleanOutcome> {
    let Some(record) = repo.submodules().get(&settings.pages_path())? else {
        info!("You have not yet created the gh-pages submodule.");
        return Ok(CleanOutcome::NotCreated);
    };
    if record.status == SubmoduleStatus::Unregistered {
        info!(path = %record.path, "gh-pages submodule is listed but unknown to git");
        return Ok(CleanOutcome::NotCreated);
    }

    record.update(repo)?;
    let pages = record.working_copy(repo)?;
    let git = pages.git();
    let branch = settings.pages_branch.as_str();

    match git.checkout(&[branch]) {
        Ok(()) => {
            info!(branch, "Checked out the gh-pages branch");
            git.pull(&settings.remote_name, branch)?;
        }
        Err(e) => {
            warn!(error = %e, branch, "Local gh-pages branch missing, tracking the remote one");
            let remote_branch = format!("{}/{branch}", settings.remote_name);
            git.checkout(&["-t", &remote_branch])?;
        }
    }

    let removed = empty_output_root(&repo.path().join(&settings.html_root))?;
    info!(removed, html_root = %settings.html_root.display(), "Cleaned documentation output");
    Ok(CleanOutcome::Cleaned { removed })
}

/// Cleans the output, runs the documentation generator and disables Jekyll.
pub fn build_pages(repo: &Repository, settings: &Settings) -> Result<()> {
    let outcome = clean_pages(repo, settings)?;
    info!(?outcome, "Building documentation");

    let status = Command::new(&settings.builder)
        .current_dir(repo.path())
        .arg("-d")
        .arg(&settings.doctrees_dir)
        .args(["-b", "html"])
        .arg(&settings.source_dir)
        .arg(&settings.html_dir)
        .status()
        .map_err(|e| {
            error!(error = ?e, builder = %settings.builder, "Failed to launch documentation builder");
            Error::Spawn {
                program: settings.builder.clone(),
                source: e,
            }
        })?;
    if !status.success() {
        error!(builder = %settings.builder, %status, "Documentation builder failed");
        return Err(Error::Command {
            command: settings.builder.clone(),
            status: status.to_string(),
        });
    }

    // a .nojekyll file at the root of the gh-pages branch disables Jekyll
    let html_root = repo.path().join(&settings.html_root);
    fs::create_dir_all(&html_root).map_err(|e| Error::io(&html_root, e))?;
    let no_jekyll = html_root.join(".nojekyll");
    fs::write(&no_jekyll, b"").map_err(|e| Error::io(&no_jekyll, e))?;
    info!(html_root = %html_root.display(), "Documentation built");
    Ok(())
}

/// Removes everything under `root` except the `.git` entry. Returns the number of entries removed.
fn empty_output_root(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    let entries = fs::read_dir(root).map_err(|e| Error::io(root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        let path = entry.path();
        if entry.file_name() == ".git" {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
        removed += 1;
    }
    Ok(removed)
}

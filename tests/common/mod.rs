#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;

use github_tools::repository::Repository;

static GIT_ENV: Once = Once::new();

/// Commit identity, default branch and file:// submodule clones for every git child process.
pub fn git_env() {
    GIT_ENV.call_once(|| {
        std::env::set_var("GIT_AUTHOR_NAME", "Test Author");
        std::env::set_var("GIT_AUTHOR_EMAIL", "author@example.com");
        std::env::set_var("GIT_COMMITTER_NAME", "Test Author");
        std::env::set_var("GIT_COMMITTER_EMAIL", "author@example.com");
        std::env::set_var("GIT_CONFIG_NOSYSTEM", "1");
        std::env::set_var("GIT_CONFIG_COUNT", "2");
        std::env::set_var("GIT_CONFIG_KEY_0", "protocol.file.allow");
        std::env::set_var("GIT_CONFIG_VALUE_0", "always");
        std::env::set_var("GIT_CONFIG_KEY_1", "init.defaultBranch");
        std::env::set_var("GIT_CONFIG_VALUE_1", "master");
    });
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("git runs");
    assert!(
        output.status.success(),
        "git {:?} in {} failed: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A working copy at `path` with one commit on master.
pub fn repo_with_commit(path: &Path) -> Repository {
    git_env();
    let repo = Repository::initialize(path, true).expect("init repo");
    fs::write(path.join("README.rst"), "testing...").unwrap();
    git(path, &["add", "README.rst"]);
    git(path, &["commit", "-m", "testing..."]);
    repo
}

/// A bare repository standing in for the hosted project.
pub fn bare_upstream(path: &Path) -> PathBuf {
    git_env();
    let output = Command::new("git")
        .args(["init", "--bare"])
        .arg(path)
        .output()
        .expect("git init --bare runs");
    assert!(output.status.success());
    path.to_path_buf()
}

/// Local working copy whose `origin` is a bare upstream holding master.
pub struct Published {
    pub upstream: PathBuf,
    pub local: Repository,
}

pub fn published(root: &Path) -> Published {
    let upstream = bare_upstream(&root.join("upstream.git"));
    let local = repo_with_commit(&root.join("local"));
    git(local.path(), &["remote", "add", "origin", upstream.to_str().unwrap()]);
    git(local.path(), &["push", "origin", "master"]);
    Published { upstream, local }
}

/// Number of commits on `branch` in a bare repository, 0 when the branch is missing.
pub fn commit_count(bare: &Path, branch: &str) -> usize {
    let output = Command::new("git")
        .arg("--git-dir")
        .arg(bare)
        .args(["rev-list", "--count", branch])
        .output()
        .expect("git runs");
    if !output.status.success() {
        return 0;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().unwrap_or(0)
}

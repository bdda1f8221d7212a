mod common;

use std::fs;

use github_tools::credentials::Credentials;
use github_tools::error::Error;
use github_tools::git::Git;
use github_tools::project::{RemoteProject, UrlKind};
use github_tools::repository::Repository;
use tempfile::tempdir;

use common::{git, git_env, repo_with_commit};

#[test]
fn initialize_creates_git_dir() {
    git_env();
    let tmp = tempdir().unwrap();
    let repo = Repository::initialize(tmp.path(), false).expect("init");
    assert!(tmp.path().join(".git").is_dir());
    assert_eq!(repo.path(), tmp.path());
}

#[test]
fn initialize_can_create_the_directory() {
    git_env();
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("no-folder");
    Repository::initialize(&path, true).expect("init");
    assert!(path.join(".git").is_dir());
}

#[test]
fn initialize_refuses_missing_directory() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("no-folder");
    let err = Repository::initialize(&path, false).unwrap_err();
    assert!(matches!(err, Error::NotAWorkingCopy(_)));
    assert!(!path.exists());
}

#[test]
fn open_rejects_plain_directory() {
    let tmp = tempdir().unwrap();
    let err = Repository::open(tmp.path()).unwrap_err();
    assert!(matches!(err, Error::NotAWorkingCopy(p) if p == tmp.path()));
}

#[test]
fn current_branch_and_detached_head() {
    let tmp = tempdir().unwrap();
    let repo = repo_with_commit(&tmp.path().join("repo"));
    assert_eq!(repo.current_branch().unwrap().as_deref(), Some("master"));

    git(repo.path(), &["checkout", "--detach"]);
    assert_eq!(repo.current_branch().unwrap(), None);
}

#[test]
fn remotes_are_read_from_config() {
    let tmp = tempdir().unwrap();
    let repo = repo_with_commit(&tmp.path().join("repo"));
    assert!(!repo.has_remote("origin").unwrap());

    repo.add_remote("origin", "git@github.com:damien/foo.git").unwrap();
    assert!(repo.has_remote("origin").unwrap());
    assert_eq!(
        repo.remote_url("origin").unwrap().as_deref(),
        Some("git@github.com:damien/foo.git")
    );
    assert_eq!(repo.remotes().unwrap(), vec!["origin".to_string()]);
}

#[test]
fn credentials_come_from_repository_config() {
    let tmp = tempdir().unwrap();
    let repo = repo_with_commit(&tmp.path().join("repo"));
    repo.git().config_set("github.user", "damien").unwrap();
    repo.git().config_set("github.token", "xyz").unwrap();

    let credentials = Credentials::resolve(Some(&repo)).unwrap();
    assert_eq!(credentials.user(), Some("damien"));
    assert_eq!(credentials.token(), Some("xyz"));
    assert!(credentials.is_valid());
}

#[test]
fn credentials_without_token_are_not_valid() {
    let tmp = tempdir().unwrap();
    let repo = repo_with_commit(&tmp.path().join("repo"));
    repo.git().config_set("github.user", "damien").unwrap();

    let credentials = Credentials::from_git(repo.git()).unwrap();
    assert_eq!(credentials.user(), Some("damien"));
    assert!(!credentials.is_valid());
}

#[test]
fn project_owner_resolves_through_git_config() {
    let tmp = tempdir().unwrap();
    let repo = repo_with_commit(&tmp.path().join("repo"));
    repo.git().config_set("github.user", "damien").unwrap();

    let mut project = RemoteProject::new("foo", None, "", true);
    project.resolve_owner(&Git::new(repo.path())).unwrap();
    assert_eq!(
        project.url(UrlKind::Pages).unwrap(),
        "http://damien.github.com/foo"
    );
}

#[test]
fn git_errors_carry_stderr() {
    let tmp = tempdir().unwrap();
    let repo = repo_with_commit(&tmp.path().join("repo"));
    fs::write(repo.path().join("other.txt"), "x").unwrap();
    let err = repo.git().checkout(&["no-such-branch"]).unwrap_err();
    match err {
        Error::Git { command, stderr, .. } => {
            assert_eq!(command, "checkout no-such-branch");
            assert!(!stderr.is_empty());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

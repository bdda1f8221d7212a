//! Error type shared by every github-tools operation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while registering projects or managing the gh-pages submodule.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Your github.user and github.token git config values are not set")]
    MissingCredentials,

    #[error("Project name not defined")]
    MissingProjectName,

    #[error("The project owner or the github user need to be set")]
    MissingOwner,

    #[error("No remote named '{0}' is configured")]
    MissingRemote(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{} is not a git working copy", .0.display())]
    NotAWorkingCopy(PathBuf),

    #[error("No submodule is registered at '{0}'")]
    SubmoduleMissing(String),

    #[error("The \"{0}\" submodule is registered but not checked out")]
    SubmoduleUninitialized(String),

    #[error("\"{expected}\" is not the current branch of the \"{path}\" submodule (found \"{found}\")")]
    WrongBranch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("The \"{path}\" submodule has no active branch (expected \"{expected}\")")]
    NoActiveBranch { path: String, expected: String },

    #[error("git {command} failed ({status}): {stderr}")]
    Git {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}")]
    Command { command: String, status: String },

    #[error("Hosting API request failed: {0}")]
    Network(String),

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for configuration and validation failures the user is expected to fix.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::MissingCredentials
                | Error::MissingProjectName
                | Error::MissingOwner
                | Error::MissingRemote(_)
                | Error::InvalidConfig(_)
                | Error::NotAWorkingCopy(_)
                | Error::SubmoduleMissing(_)
                | Error::SubmoduleUninitialized(_)
                | Error::WrongBranch { .. }
                | Error::NoActiveBranch { .. }
        )
    }

    /// Remediation hint printed by the CLI next to user errors.
    pub fn hint(&self) -> Option<String> {
        let hint = match self {
            Error::MissingCredentials => {
                "Set them with `git config github.user <login>` and `git config github.token <token>`."
                    .to_string()
            }
            Error::NotAWorkingCopy(_) => "Run the command from the root of a git working copy.".to_string(),
            Error::SubmoduleMissing(_) => "Create it with `gh-tools create-pages-submodule`, or check out \
                 the pages branch of your remote (git checkout -t <remote>/<pages branch>) \
                 and rebuild the documentation."
                .to_string(),
            Error::SubmoduleUninitialized(path) => {
                format!("Check it out with `git submodule update --init -- {path}`.")
            }
            Error::WrongBranch { path, expected, .. } | Error::NoActiveBranch { path, expected } => {
                format!("Check out the {expected} branch in {path} (git -C {path} checkout {expected}) and rebuild the documentation.")
            }
            Error::MissingRemote(_) => "Register the project first (gh-tools register-project).".to_string(),
            _ => return None,
        };
        Some(hint)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

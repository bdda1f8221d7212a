//! GitHub API credentials and the committer identity, both read from git config.

use tracing::{debug, info};

use crate::error::Result;
use crate::git::{self, Git};
use crate::repository::Repository;

pub const USER_KEY: &str = "github.user";
pub const TOKEN_KEY: &str = "github.token";

/// User credential for the GitHub API.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            token: Some(token.into()),
        }
    }

    /// Reads `github.user` and `github.token` through the given git handle.
    pub fn from_git(git: &Git) -> Result<Self> {
        let user = git.config_get(USER_KEY)?.filter(|v| !v.is_empty());
        let token = git.config_get(TOKEN_KEY)?.filter(|v| !v.is_empty());
        debug!(
            dir = %git.work_dir().display(),
            user = ?user,
            token_set = token.is_some(),
            "Read GitHub credentials from git config"
        );
        Ok(Self { user, token })
    }

    /// Credentials of `repo`, or of the current directory when no repository is given.
    pub fn resolve(repo: Option<&Repository>) -> Result<Self> {
        match repo {
            Some(repo) => Self::from_git(repo.git()),
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|e| crate::error::Error::io(".", e))?;
                Self::from_git(&Git::new(cwd))
            }
        }
    }

    /// Both the user and the token are set.
    pub fn is_valid(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Author name and email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// The global `user.name` / `user.email` pair, read when called.
///
/// Returns `None` when either value is unset; the caller picks the fallback.
pub fn global_identity() -> Result<Option<Identity>> {
    let name = git::global_config_get("user.name")?;
    let email = git::global_config_get("user.email")?;
    let identity = match (name, email) {
        (Some(name), Some(email)) => Some(Identity { name, email }),
        _ => None,
    };
    info!(identity = ?identity, "Resolved global git identity");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_both_fields() {
        assert!(Credentials::new("damien", "xyz").is_valid());
        assert!(!Credentials::default().is_valid());
        let no_token = Credentials {
            user: Some("damien".into()),
            token: None,
        };
        assert!(!no_token.is_valid());
    }

    #[test]
    fn debug_output_hides_the_token() {
        let rendered = format!("{:?}", Credentials::new("damien", "xyz"));
        assert!(rendered.contains("damien"));
        assert!(!rendered.contains("xyz"));
    }
}

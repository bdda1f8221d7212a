//! Hosted project record and the URLs derived from it.

use serde::Deserialize;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::git::Git;

/// The different GitHub urls of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// Read/write access over ssh.
    Ssh,
    /// Read-only clone url.
    Git,
    /// Project home page.
    Http,
    /// Published gh-pages site.
    Pages,
    /// Issue tracker.
    Issues,
}

impl UrlKind {
    fn render(self, owner: &str, name: &str) -> String {
        match self {
            UrlKind::Ssh => format!("git@github.com:{owner}/{name}.git"),
            UrlKind::Git => format!("git://github.com/{owner}/{name}.git"),
            UrlKind::Http => format!("http://github.com/{owner}/{name}"),
            UrlKind::Pages => format!("http://{owner}.github.com/{name}"),
            UrlKind::Issues => format!("http://github.com/{owner}/{name}/issues"),
        }
    }
}

/// All five urls of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUrls {
    pub ssh: String,
    pub git: String,
    pub http: String,
    pub pages: String,
    pub issues: String,
}

/// A GitHub project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteProject {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub description: String,
    pub is_public: bool,
}

#[derive(Deserialize)]
struct RepositoryEnvelope {
    repository: RepositoryDetails,
}

#[derive(Deserialize)]
struct RepositoryDetails {
    name: String,
    owner: String,
    #[serde(default)]
    description: Option<String>,
    private: bool,
}

impl RemoteProject {
    pub fn new(
        name: impl Into<String>,
        owner: Option<String>,
        description: impl Into<String>,
        is_public: bool,
    ) -> Self {
        Self {
            name: Some(name.into()),
            owner,
            description: description.into(),
            is_public,
        }
    }

    /// Builds a project from a `{"repository": {...}}` API response body.
    pub fn from_json(body: &str) -> Result<Self> {
        let envelope: RepositoryEnvelope =
            serde_json::from_str(body).map_err(|e| Error::Parse {
                what: "repository JSON".to_string(),
                message: e.to_string(),
            })?;
        let details = envelope.repository;
        Ok(Self {
            name: Some(details.name),
            owner: Some(details.owner),
            description: details.description.unwrap_or_default(),
            is_public: !details.private,
        })
    }

    /// Sets the owner from the credentials' user when no owner is known yet.
    pub fn backfill_owner(&mut self, credentials: &Credentials) {
        if self.owner.is_none() {
            self.owner = credentials.user.clone();
        }
    }

    /// Like [`backfill_owner`](Self::backfill_owner), reading the credentials through `git`.
    pub fn resolve_owner(&mut self, git: &Git) -> Result<()> {
        if self.owner.is_none() {
            let credentials = Credentials::from_git(git)?;
            debug!(user = ?credentials.user, "Falling back to the github user as project owner");
            self.backfill_owner(&credentials);
        }
        Ok(())
    }

    pub fn url(&self, kind: UrlKind) -> Result<String> {
        let name = self.name.as_deref().ok_or(Error::MissingProjectName)?;
        let owner = self
            .owner
            .as_deref()
            .filter(|o| !o.is_empty())
            .ok_or(Error::MissingOwner)?;
        Ok(kind.render(owner, name))
    }

    pub fn urls(&self) -> Result<ProjectUrls> {
        Ok(ProjectUrls {
            ssh: self.url(UrlKind::Ssh)?,
            git: self.url(UrlKind::Git)?,
            http: self.url(UrlKind::Http)?,
            pages: self.url(UrlKind::Pages)?,
            issues: self.url(UrlKind::Issues)?,
        })
    }
}

impl std::fmt::Display for RemoteProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.url(UrlKind::Http) {
            Ok(url) => f.write_str(&url),
            Err(_) => f.write_str("<unnamed project>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{"repository": {"description": "just a test",
        "name": "foo", "private": false,
        "url": "http://github.com/damien/foo",
        "watchers": 0, "forks": 0, "fork": false,
        "owner": "damien", "homepage": ""}}"#;

    #[test]
    fn urls_follow_the_templates() {
        let project = RemoteProject::new("foo", Some("damien".into()), "just a test", true);
        let urls = project.urls().unwrap();
        assert_eq!(urls.ssh, "git@github.com:damien/foo.git");
        assert_eq!(urls.git, "git://github.com/damien/foo.git");
        assert_eq!(urls.http, "http://github.com/damien/foo");
        assert_eq!(urls.pages, "http://damien.github.com/foo");
        assert_eq!(urls.issues, "http://github.com/damien/foo/issues");
        assert_eq!(project.to_string(), "http://github.com/damien/foo");
    }

    #[test]
    fn url_without_name_is_a_configuration_error() {
        let project = RemoteProject {
            owner: Some("damien".into()),
            ..Default::default()
        };
        for kind in [UrlKind::Ssh, UrlKind::Git, UrlKind::Http, UrlKind::Pages, UrlKind::Issues] {
            assert!(matches!(project.url(kind), Err(Error::MissingProjectName)));
        }
    }

    #[test]
    fn url_without_owner_needs_backfill() {
        let mut project = RemoteProject::new("foo", None, "", true);
        assert!(matches!(project.url(UrlKind::Ssh), Err(Error::MissingOwner)));

        project.backfill_owner(&Credentials::default());
        assert!(matches!(project.url(UrlKind::Ssh), Err(Error::MissingOwner)));

        project.backfill_owner(&Credentials::new("damien", "xyz"));
        assert_eq!(project.url(UrlKind::Ssh).unwrap(), "git@github.com:damien/foo.git");
    }

    #[test]
    fn backfill_keeps_an_existing_owner() {
        let mut project = RemoteProject::new("foo", Some("org".into()), "", true);
        project.backfill_owner(&Credentials::new("damien", "xyz"));
        assert_eq!(project.owner.as_deref(), Some("org"));
    }

    #[test]
    fn parses_api_response() {
        let project = RemoteProject::from_json(RESPONSE).unwrap();
        assert_eq!(project.name.as_deref(), Some("foo"));
        assert_eq!(project.owner.as_deref(), Some("damien"));
        assert_eq!(project.description, "just a test");
        assert!(project.is_public);
    }

    #[test]
    fn private_flag_is_inverted() {
        let body = r#"{"repository": {"name": "foo", "owner": "damien", "private": true}}"#;
        let project = RemoteProject::from_json(body).unwrap();
        assert!(!project.is_public);
        assert_eq!(project.description, "");
    }

    #[test]
    fn malformed_response_is_a_parse_error() {
        let err = RemoteProject::from_json(r#"{"error": "not found"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}

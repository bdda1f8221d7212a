//! # hosting: the hosting service's project API
//!
//! [`HostingApi`] is the seam between the publish workflow and the network:
//! the workflow only ever asks to create a project or to show one.
//! [`GitHubClient`] talks to the real service with `reqwest`; tests use the
//! `mockall` generated `MockHostingApi` (exported with the `test-export-mocks`
//! feature so integration tests can reach it).
//!
//! Calls are never retried. Transport failures and non-success statuses are
//! [`Error::Network`]; an unexpected body shape is [`Error::Parse`].

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{error, info};

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::project::RemoteProject;

pub const DEFAULT_API_URL: &str = "http://github.com/api/v2/json";

/// Attributes of a project to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

/// Create and show projects on the hosting service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Create a new project owned by the credentials' user.
    async fn create_project(
        &self,
        req: NewProject,
        credentials: &Credentials,
    ) -> Result<RemoteProject>;

    /// Fetch the project details.
    async fn fetch_project(&self, name: &str, owner: &str) -> Result<RemoteProject>;
}

/// [`HostingApi`] over HTTP.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("github-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let api_url = api_url.into().trim_end_matches('/').to_string();
        info!(api_url = %api_url, "Initialized hosting API client");
        Ok(Self { http, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn read_project(&self, url: &str, resp: reqwest::Response) -> Result<RemoteProject> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            error!(url = %url, status = %status, "Hosting API returned error. Response body: {body}");
            return Err(Error::Network(format!("{url} returned {status}")));
        }
        RemoteProject::from_json(&body)
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn create_project(
        &self,
        req: NewProject,
        credentials: &Credentials,
    ) -> Result<RemoteProject> {
        let url = format!("{}/repos/create", self.api_url);
        let public = if req.is_public { "1" } else { "0" };
        let form = [
            ("login", credentials.user().unwrap_or_default()),
            ("token", credentials.token().unwrap_or_default()),
            ("name", req.name.as_str()),
            ("description", req.description.as_str()),
            ("public", public),
        ];
        info!(url = %url, name = %req.name, public = req.is_public, "Creating project");

        let resp = self.http.post(&url).form(&form).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to reach hosting API");
            Error::from(e)
        })?;
        let project = self.read_project(&url, resp).await?;
        info!(project = %project, "Project created");
        Ok(project)
    }

    async fn fetch_project(&self, name: &str, owner: &str) -> Result<RemoteProject> {
        let url = format!("{}/repos/show/{owner}/{name}", self.api_url);
        info!(url = %url, "Fetching project");

        let resp = self.http.get(&url).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to reach hosting API");
            Error::from(e)
        })?;
        self.read_project(&url, resp).await
    }
}

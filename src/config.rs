// github-tools/src/config.rs

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hosting::DEFAULT_API_URL;

/// Resolved settings for every command. Built once by [`crate::load_config`].
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Repository name on the hosting service.
    pub project_name: Option<String>,
    pub description: String,
    /// Documentation root, `docs` by default.
    pub doc_root: PathBuf,
    /// Documentation sources, `<doc_root>/source`.
    pub source_dir: PathBuf,
    /// Build output, `<doc_root>/build`.
    pub build_dir: PathBuf,
    pub doctrees_dir: PathBuf,
    /// Where the generator writes html, `<build_dir>/html`.
    pub html_dir: PathBuf,
    /// Path of the gh-pages submodule, relative to the repository root.
    pub pages_root: PathBuf,
    /// Directory emptied by `clean-pages`; same as `pages_root` unless set.
    pub html_root: PathBuf,
    pub remote_name: String,
    pub master_branch: String,
    pub pages_branch: String,
    /// Documentation generator invoked by `build-pages`.
    pub builder: String,
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        let doc_root = PathBuf::from("docs");
        let build_dir = doc_root.join("build");
        let html_dir = build_dir.join("html");
        Self {
            project_name: None,
            description: String::new(),
            source_dir: doc_root.join("source"),
            doctrees_dir: build_dir.join("doctrees"),
            pages_root: html_dir.clone(),
            html_root: html_dir.clone(),
            doc_root,
            build_dir,
            html_dir,
            remote_name: "origin".to_string(),
            master_branch: "master".to_string(),
            pages_branch: "gh-pages".to_string(),
            builder: "sphinx-build".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Settings {
    /// Submodule path as git records it.
    pub fn pages_path(&self) -> String {
        self.pages_root.to_string_lossy().into_owned()
    }

    pub fn require_project_name(&self) -> Result<&str> {
        self.project_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(Error::MissingProjectName)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("pages.remote_name", &self.remote_name),
            ("pages.master_branch", &self.master_branch),
            ("pages.branch", &self.pages_branch),
            ("docs.builder", &self.builder),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        if self.pages_root.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("pages.root must not be empty".to_string()));
        }
        if self.pages_root.is_absolute() {
            return Err(Error::InvalidConfig(format!(
                "pages.root must be relative to the repository root, got {}",
                self.pages_root.display()
            )));
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            project_name = ?self.project_name,
            pages_root = %self.pages_root.display(),
            html_root = %self.html_root.display(),
            remote_name = %self.remote_name,
            pages_branch = %self.pages_branch,
            "Loaded Settings"
        );
        debug!(?self, "Settings loaded (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sphinx_layout() {
        let settings = Settings::default();
        assert_eq!(settings.html_dir, PathBuf::from("docs/build/html"));
        assert_eq!(settings.pages_root, PathBuf::from("docs/build/html"));
        assert_eq!(settings.html_root, settings.pages_root);
        assert_eq!(settings.doctrees_dir, PathBuf::from("docs/build/doctrees"));
        assert_eq!(settings.remote_name, "origin");
        assert_eq!(settings.master_branch, "master");
        assert_eq!(settings.pages_branch, "gh-pages");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn empty_branch_is_invalid() {
        let settings = Settings {
            pages_branch: " ".into(),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn project_name_is_required_on_demand() {
        let mut settings = Settings::default();
        assert!(matches!(settings.require_project_name(), Err(Error::MissingProjectName)));
        settings.project_name = Some("foo".into());
        assert_eq!(settings.require_project_name().unwrap(), "foo");
    }
}

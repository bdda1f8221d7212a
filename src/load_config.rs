/// `load_config` module: reads the optional YAML config file and resolves it into [`Settings`].
///
/// Every field is optional in the file; missing values fall back to the
/// Sphinx layout (`docs/source`, `docs/build/html`) and to the `origin`,
/// `master` and `gh-pages` names. Derived paths (html output, pages root,
/// html root) are computed here once so commands never default lazily.
///
/// The hosting API base url can be overridden with `GITHUB_API_URL`.
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::Settings;

pub const DEFAULT_CONFIG_FILE: &str = "gh-tools.yaml";
pub const API_URL_ENV: &str = "GITHUB_API_URL";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub project: ProjectSection,
    pub docs: DocsSection,
    pub pages: PagesSection,
    pub hosting: HostingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsSection {
    pub docroot: Option<PathBuf>,
    pub builddir: Option<PathBuf>,
    pub sourcedir: Option<PathBuf>,
    pub builder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesSection {
    pub root: Option<PathBuf>,
    pub htmlroot: Option<PathBuf>,
    pub remote_name: Option<String>,
    pub master_branch: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostingSection {
    pub api_url: Option<String>,
}

impl FileConfig {
    /// Applies defaults and derives the dependent paths.
    pub fn resolve(self) -> Settings {
        let defaults = Settings::default();

        let doc_root = self.docs.docroot.unwrap_or(defaults.doc_root);
        let build_dir = doc_root.join(self.docs.builddir.unwrap_or_else(|| "build".into()));
        let source_dir = doc_root.join(self.docs.sourcedir.unwrap_or_else(|| "source".into()));
        let html_dir = build_dir.join("html");
        let pages_root = self.pages.root.unwrap_or_else(|| html_dir.clone());
        let html_root = self.pages.htmlroot.unwrap_or_else(|| pages_root.clone());

        Settings {
            project_name: self.project.name,
            description: self.project.description.unwrap_or_default(),
            doctrees_dir: build_dir.join("doctrees"),
            doc_root,
            source_dir,
            build_dir,
            html_dir,
            pages_root,
            html_root,
            remote_name: self.pages.remote_name.unwrap_or(defaults.remote_name),
            master_branch: self.pages.master_branch.unwrap_or(defaults.master_branch),
            pages_branch: self.pages.branch.unwrap_or(defaults.pages_branch),
            builder: self.docs.builder.unwrap_or(defaults.builder),
            api_url: self.hosting.api_url.unwrap_or(defaults.api_url),
        }
    }
}

/// Loads `path` (or `gh-tools.yaml` under `base_dir` when present) and validates the result.
pub fn load_config(path: Option<&Path>, base_dir: &Path) -> Result<Settings> {
    let file_config = match path {
        Some(path) => read_file(path)?,
        None => {
            let default_path = base_dir.join(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                read_file(&default_path)?
            } else {
                info!(base_dir = ?base_dir, "No config file found, using defaults");
                FileConfig::default()
            }
        }
    };

    let mut settings = file_config.resolve();

    if let Ok(api_url) = std::env::var(API_URL_ENV) {
        if !api_url.trim().is_empty() {
            info!(api_url = %api_url, "{API_URL_ENV} found in env");
            settings.api_url = api_url;
        }
    }

    if let Err(e) = settings.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    settings.trace_loaded();
    Ok(settings)
}

fn read_file(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to read config file");
        e
    })
    .with_context(|| format!("Failed to read config file {path:?}"))?;

    // an empty file deserializes to unit, not to an empty map
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str::<FileConfig>(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// # gh-tools CLI
///
/// Command parsing and dispatch. Each subcommand maps onto one function of
/// [`crate::pages`]; this module only loads settings, opens the working copy,
/// builds the hosting client and prints what happened.
///
/// For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::credentials::{global_identity, Credentials};
use crate::error::Error;
use crate::hosting::{GitHubClient, HostingApi};
use crate::load_config::load_config;
use crate::pages::{self, CleanOutcome, PublishOutcome, RegisterRequest};
use crate::project::RemoteProject;
use crate::repository::Repository;

/// CLI for gh-tools: host a python package on GitHub and publish its documentation.
#[derive(Parser)]
#[clap(
    name = "gh-tools",
    version,
    about = "Register a project on GitHub and publish its documentation to gh-pages"
)]
pub struct Cli {
    /// Working copy to operate on
    #[clap(long, short = 'C', global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Path to the YAML config file (defaults to gh-tools.yaml in the working copy)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a repository at GitHub and push your local repository to it
    RegisterProject {
        /// Repository name (defaults to project.name from the config)
        #[clap(long)]
        name: Option<String>,
        /// Repository description (defaults to project.description from the config)
        #[clap(long)]
        description: Option<String>,
        /// Create a private repository
        #[clap(long)]
        private: bool,
    },
    /// Create a submodule with a gh-pages root branch to host your documentation
    CreatePagesSubmodule,
    /// Push your documentation to GitHub
    UpdatePages {
        /// Commit message for the doc update; without it changes are only staged
        #[clap(long, short = 'm')]
        commit_message: Option<String>,
    },
    /// Update the gh-pages submodule and remove the built documentation
    CleanPages,
    /// Clean, then build the documentation into the gh-pages submodule
    BuildPages,
    /// Show the project urls
    ShowProject {
        /// Fetch the project details from GitHub
        #[clap(long)]
        remote: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let settings = load_config(cli.config.as_deref(), &cli.repo)?;
    let repo = open_working_copy(&cli.repo)?;

    let result = match cli.command {
        Commands::RegisterProject {
            name,
            description,
            private,
        } => {
            let project_name = match name {
                Some(name) => name,
                None => settings.require_project_name().map_err(user_error)?.to_string(),
            };
            let api = GitHubClient::new(&settings.api_url)?;
            let request = RegisterRequest {
                project_name,
                description: description.unwrap_or_else(|| settings.description.clone()),
                is_public: !private,
                remote_name: settings.remote_name.clone(),
                master_branch: settings.master_branch.clone(),
                credentials: None,
            };
            let project = pages::register(&repo, &api, request)
                .await
                .map_err(user_error)?;
            println!("Project registered: {project}");
            Ok(())
        }
        Commands::CreatePagesSubmodule => {
            let pages_path = settings.pages_path();
            println!(
                "Create a submodule at {pages_path} and a {} root branch to host your gh-pages...",
                settings.pages_branch
            );
            let record = pages::add_pages_submodule(
                &repo,
                &pages_path,
                &settings.remote_name,
                &settings.pages_branch,
            )
            .map_err(user_error)?;
            println!("gh-pages submodule ready at {} ({})", record.path, record.url);
            Ok(())
        }
        Commands::UpdatePages { commit_message } => {
            match pages::update_pages(&repo, &settings, commit_message.as_deref())
                .map_err(user_error)?
            {
                PublishOutcome::Published { remote, branch } => {
                    println!("Documentation pushed to {remote}/{branch}.");
                    println!(
                        "You might want to update your submodule reference:\n\tgit add {}\n\tgit commit -m \"built html doc updated\"",
                        settings.pages_path()
                    );
                }
                PublishOutcome::StagedOnly => {
                    println!(
                        "No commit message set... You will have to commit the last changes and push them to GitHub"
                    );
                }
            }
            Ok(())
        }
        Commands::CleanPages => {
            report_clean(pages::clean_pages(&repo, &settings).map_err(user_error)?);
            Ok(())
        }
        Commands::BuildPages => {
            pages::build_pages(&repo, &settings).map_err(user_error)?;
            println!("Documentation built in {}", settings.html_dir.display());
            Ok(())
        }
        Commands::ShowProject { remote } => show_project(&repo, &settings, remote).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

/// Opens the working copy or explains why the command cannot run.
fn open_working_copy(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(user_error)
}

fn user_error(e: Error) -> anyhow::Error {
    match e.hint() {
        Some(hint) if e.is_user_error() => anyhow::anyhow!("{e}\n{hint}"),
        _ => e.into(),
    }
}

fn report_clean(outcome: CleanOutcome) {
    match outcome {
        CleanOutcome::NotCreated => println!("You have not yet created the gh-pages submodule."),
        CleanOutcome::Cleaned { removed } => println!("Removed {removed} entries."),
    }
}

async fn show_project(repo: &Repository, settings: &Settings, remote: bool) -> Result<()> {
    let name = settings.require_project_name().map_err(user_error)?;
    let credentials = Credentials::resolve(Some(repo))?;
    let owner = credentials.user.clone();

    let project = if remote {
        let owner = owner.as_deref().ok_or_else(|| user_error(Error::MissingOwner))?;
        let api = GitHubClient::new(&settings.api_url)?;
        api.fetch_project(name, owner).await?
    } else {
        let mut project =
            RemoteProject::new(name, None, settings.description.clone(), true);
        project.backfill_owner(&credentials);
        project
    };

    let urls = project.urls().map_err(user_error)?;
    println!("name:        {name}");
    println!("description: {}", project.description);
    println!("public:      {}", project.is_public);
    println!("home:        {}", urls.http);
    println!("ssh:         {}", urls.ssh);
    println!("clone:       {}", urls.git);
    println!("pages:       {}", urls.pages);
    println!("issues:      {}", urls.issues);
    if let Some(identity) = global_identity()? {
        println!("author:      {identity}");
    }
    Ok(())
}

//! github-tools: register a project on GitHub and publish its documentation
//! through a `gh-pages` submodule.
//!
//! Everything here shells out to the system `git` binary, apart from the two
//! hosting API calls behind [`hosting::HostingApi`].

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod gitmodules;
pub mod hosting;
pub mod load_config;
pub mod pages;
pub mod project;
pub mod repository;
pub mod submodule;

pub use cli::{run, Cli, Commands};
pub use error::{Error, Result};

//! # ghops
//!
//! **ghops** runs one git or GitHub API operation per invocation,
//! authenticated with a personal access token.
//!
//! Features:
//! - `ghops clone <url> <dest>` clones with the token injected into the URL
//! - `ghops push [path]` pushes a branch after refreshing the remote's credential
//! - `ghops create|update|delete|show` manage hosted repositories
//! - `ghops branch list|create|delete` manage branches on the hosted repository
//! - `ghops file get|put` and `ghops readme` read and write repository files
//! - `ghops whoami` checks the token
//!
//! The token comes from `--token` or `$GITHUB_TOKEN`. Defaults for the API
//! URL, remote and branch are read from `config.toml` (see `ghops config-path`).

mod progress;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ghops::api::{ApiClient, FileContent, FileUpload, NewRepository, RepoUpdate};
use ghops::git::{PushTarget, clone_repository, push_repository};
use ghops::{Config, Outcome, config_file, load_config};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use progress::step;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "ghops",
    version,
    about = "ghops - clone, push and manage GitHub repositories with a token",
    arg_required_else_help = true
)]
struct Cli {
    /// Personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// API base URL, overriding config.toml
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Clone a repository into a local directory
    Clone { url: String, dest: PathBuf },
    /// Push a local branch to the identically named remote branch
    Push {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        remote: Option<String>,
        #[arg(long)]
        branch: Option<String>,
    },
    /// Create a repository for the authenticated user
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        private: bool,
    },
    /// Update repository settings; only the given fields change
    Update {
        owner: String,
        repo: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        homepage: Option<String>,
        #[arg(long)]
        private: Option<bool>,
        #[arg(long)]
        has_issues: Option<bool>,
        #[arg(long)]
        has_projects: Option<bool>,
        #[arg(long)]
        has_wiki: Option<bool>,
    },
    /// Delete a repository
    Delete { owner: String, repo: String },
    /// Print repository details
    Show { owner: String, repo: String },
    /// Check the token and print the user it belongs to
    Whoami,
    /// Manage branches on the hosted repository
    Branch {
        #[command(subcommand)]
        cmd: BranchCmd,
    },
    /// Read or write files on the hosted repository
    File {
        #[command(subcommand)]
        cmd: FileCmd,
    },
    /// Print the repository's README
    Readme {
        owner: String,
        repo: String,
        #[arg(long)]
        branch: Option<String>,
    },
    /// Print the path of config.toml
    ConfigPath,
}

#[derive(Subcommand, Debug)]
enum BranchCmd {
    /// List branches
    List { owner: String, repo: String },
    /// Create a branch from the head of another branch
    Create {
        owner: String,
        repo: String,
        name: String,
        #[arg(long, default_value = "main")]
        from: String,
    },
    /// Delete a branch
    Delete {
        owner: String,
        repo: String,
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum FileCmd {
    /// Print a file
    Get {
        owner: String,
        repo: String,
        path: String,
        #[arg(long)]
        branch: Option<String>,
    },
    /// Create or overwrite a file with the contents of a local file
    Put {
        owner: String,
        repo: String,
        path: String,
        /// Local file to upload
        #[arg(long)]
        from: PathBuf,
        #[arg(long)]
        branch: Option<String>,
        /// Commit message (default: "Create <path>" or "Update <path>")
        #[arg(long)]
        message: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Pretty-print a JSON payload; returns whether the outcome succeeded.
fn print_payload(outcome: &Outcome<Value>) -> Result<bool> {
    if let Some(v) = outcome.payload() {
        println!("{}", serde_json::to_string_pretty(v)?);
    }
    Ok(outcome.is_success())
}

/// Print a file's text; returns whether the outcome succeeded.
fn print_file(outcome: &Outcome<Option<FileContent>>, what: &str) -> bool {
    match outcome.payload() {
        Some(Some(file)) => print!("{}", file.content),
        Some(None) => eprintln!("{} not found", what),
        None => {}
    }
    outcome.is_success()
}

/// `config.toml` with command-line overrides applied.
///
/// Only commands that use a setting load the file, so a broken file does not
/// get in the way of `clone` or `config-path`.
fn settings(api_url: Option<&str>) -> Result<Config> {
    let mut config = load_config()?;
    if let Some(url) = api_url {
        config.api_url = url.to_string();
    }
    Ok(config)
}

fn api(api_url: Option<&str>) -> Result<ApiClient> {
    ApiClient::from_config(&settings(api_url)?).context("failed to build HTTP client")
}

fn push_target(remote: Option<String>, branch: Option<String>) -> Result<PushTarget> {
    if let (Some(remote), Some(branch)) = (&remote, &branch) {
        return Ok(PushTarget::new(remote.clone(), branch.clone()));
    }
    let config = settings(None)?;
    Ok(PushTarget::new(
        remote.unwrap_or(config.remote),
        branch.unwrap_or(config.branch),
    ))
}

/// CLI entry point.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let token = cli.token.as_deref();
    let api_url = cli.api_url.as_deref();

    let ok = match cli.cmd {
        Cmd::Clone { url, dest } => step(
            format!("cloning into {}", dest.display()),
            format!("cloned into {}", dest.display()),
            || clone_repository(&url, &dest, token),
        )
        .is_success(),
        Cmd::Push {
            path,
            remote,
            branch,
        } => {
            let target = push_target(remote, branch)?;
            step(
                format!("pushing {} to {}", target.branch, target.remote),
                format!("pushed {} to {}", target.branch, target.remote),
                || push_repository(&path, &target, token),
            )
            .is_success()
        }
        Cmd::Create {
            name,
            description,
            private,
        } => {
            let client = api(api_url)?;
            let repo = NewRepository::new(name, description, private);
            print_payload(&step(
                format!("creating {}", repo.name),
                format!("created {}", repo.name),
                || client.create_repository(&repo, token),
            ))?
        }
        Cmd::Update {
            owner,
            repo,
            description,
            homepage,
            private,
            has_issues,
            has_projects,
            has_wiki,
        } => {
            let client = api(api_url)?;
            let update = RepoUpdate {
                description: description.into(),
                homepage: homepage.into(),
                private: private.into(),
                has_issues: has_issues.into(),
                has_projects: has_projects.into(),
                has_wiki: has_wiki.into(),
            };
            print_payload(&step(
                format!("updating {}/{}", owner, repo),
                format!("updated {}/{}", owner, repo),
                || client.update_repository(&owner, &repo, &update, token),
            ))?
        }
        Cmd::Delete { owner, repo } => {
            let client = api(api_url)?;
            step(
                format!("deleting {}/{}", owner, repo),
                format!("deleted {}/{}", owner, repo),
                || client.delete_repository(&owner, &repo, token),
            )
            .is_success()
        }
        Cmd::Show { owner, repo } => {
            let client = api(api_url)?;
            print_payload(&step(
                format!("fetching {}/{}", owner, repo),
                format!("{}/{}", owner, repo),
                || client.get_repository(&owner, &repo, token),
            ))?
        }
        Cmd::Whoami => {
            let client = api(api_url)?;
            print_payload(&step(
                "checking token".to_string(),
                "token is valid".to_string(),
                || client.validate_token(token),
            ))?
        }
        Cmd::Branch { cmd } => {
            let client = api(api_url)?;
            match cmd {
                BranchCmd::List { owner, repo } => print_payload(&step(
                    format!("listing branches of {}/{}", owner, repo),
                    format!("branches of {}/{}", owner, repo),
                    || client.list_branches(&owner, &repo, token),
                ))?,
                BranchCmd::Create {
                    owner,
                    repo,
                    name,
                    from,
                } => print_payload(&step(
                    format!("creating branch {} from {}", name, from),
                    format!("created branch {} in {}/{}", name, owner, repo),
                    || client.create_branch(&owner, &repo, &name, &from, token),
                ))?,
                BranchCmd::Delete { owner, repo, name } => step(
                    format!("deleting branch {}", name),
                    format!("deleted branch {} in {}/{}", name, owner, repo),
                    || client.delete_branch(&owner, &repo, &name, token),
                )
                .is_success(),
            }
        }
        Cmd::File { cmd } => {
            let client = api(api_url)?;
            match cmd {
                FileCmd::Get {
                    owner,
                    repo,
                    path,
                    branch,
                } => print_file(
                    &step(
                        format!("fetching {}", path),
                        format!("fetched {}", path),
                        || client.get_file(&owner, &repo, &path, branch.as_deref(), token),
                    ),
                    &path,
                ),
                FileCmd::Put {
                    owner,
                    repo,
                    path,
                    from,
                    branch,
                    message,
                } => {
                    let content = fs::read_to_string(&from)
                        .with_context(|| format!("failed to read {}", from.display()))?;
                    let upload = FileUpload {
                        path,
                        content,
                        branch,
                        message,
                    };
                    step(
                        format!("writing {}", upload.path),
                        format!("wrote {} in {}/{}", upload.path, owner, repo),
                        || client.put_file(&owner, &repo, &upload, token),
                    )
                    .is_success()
                }
            }
        }
        Cmd::Readme {
            owner,
            repo,
            branch,
        } => {
            let client = api(api_url)?;
            print_file(
                &step(
                    format!("fetching README of {}/{}", owner, repo),
                    format!("README of {}/{}", owner, repo),
                    || client.get_readme(&owner, &repo, branch.as_deref(), token),
                ),
                "README",
            )
        }
        Cmd::ConfigPath => {
            println!("{}", config_file()?.display());
            true
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sessionward", version, about = "Sign in, inspect and keep a session alive")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long, env = "SESSIONWARD_EMAIL")]
        email: Option<String>,
        #[arg(long, env = "SESSIONWARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the persisted session
    Logout,
    /// Show the session and renewal diagnostics
    Status,
    /// Print the signed-in user's display name
    Whoami,
    /// Exit successfully if the user holds any of the given roles
    CheckRole {
        #[arg(required = true)]
        roles: Vec<String>,
    },
    /// Update the signed-in user's profile
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Refresh the token pair now
    Refresh,
    /// List the built-in demo accounts
    DemoUsers,
    /// Keep the session alive until Ctrl+C, refreshing before expiry
    Watch,
}

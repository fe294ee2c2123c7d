//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{login::LoginArgs, visibility::VisibilityArgs, watch::WatchArgs};
use crate::domain::models::Subject;

/// Command line of the `studyfeed` binary.
#[derive(Parser)]
#[command(name = "studyfeed")]
#[command(about = "Studyfeed - live feedback log for study monitoring", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file replacing the .studyfeed/ project files
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server origin replacing the default local endpoints (e.g. https://feedback.example.org)
    #[arg(long, global = true, value_name = "ORIGIN")]
    pub server: Option<String>,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Follow the feedback log of a study or category
    Watch(WatchArgs),

    /// Exchange username and password for an access token
    Login(LoginArgs),

    /// Drop the stored access token
    Logout,

    /// Show who the stored token belongs to
    Whoami,

    /// Hide records of a subject on the server
    Hide(VisibilityArgs),

    /// Show previously hidden records of a subject
    Show(VisibilityArgs),
}

/// Exactly one of `--study` / `--category`.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SubjectArgs {
    /// Study ID
    #[arg(long)]
    pub study: Option<i64>,

    /// Category ID
    #[arg(long)]
    pub category: Option<i64>,
}

impl SubjectArgs {
    /// The selected subject.
    pub fn subject(&self) -> Result<Subject> {
        match (self.study, self.category) {
            (Some(id), None) => Ok(Subject::Study(id)),
            (None, Some(id)) => Ok(Subject::Category(id)),
            _ => bail!("Exactly one of --study or --category is required"),
        }
    }
}

//! CLI definition and top-level dispatch.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use crate::api::client::{Client, DEFAULT_ENDPOINT};
use crate::subcommands::{
    delete_input::CmdDeleteInput, list_projects::CmdListProjects, merge_masks::CmdMergeMasks,
    remove_overlap::CmdRemoveOverlap, update_task_metadata::CmdUpdateTaskMetadata,
    wait_job::CmdWaitJob,
};

#[derive(Parser, Debug)]
#[command(
    name = "afcli",
    version,
    about = "Command-line client for the AnnoFab annotation service"
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the projects you belong to (CSV/JSON)
    ListProjects(CmdListProjects),

    /// Merge user-supplied metadata keys into one or more tasks
    UpdateTaskMetadata(CmdUpdateTaskMetadata),

    /// Delete input data after confirmation
    DeleteInput(CmdDeleteInput),

    /// Poll an async job until it finishes
    WaitJob(CmdWaitJob),

    /// Merge per-label segmentation masks into a single annotation
    MergeMasks(CmdMergeMasks),

    /// Resolve overlaps between segmentation masks, topmost wins
    RemoveOverlap(CmdRemoveOverlap),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.cmd {
            Commands::ListProjects(cmd) => cmd.run(),
            Commands::UpdateTaskMetadata(cmd) => cmd.run(),
            Commands::DeleteInput(cmd) => cmd.run(),
            Commands::WaitJob(cmd) => cmd.run(),
            Commands::MergeMasks(cmd) => cmd.run(),
            Commands::RemoveOverlap(cmd) => cmd.run(),
        }
    }
}

/// Connection flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// API endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token (default: the AFCLI_TOKEN environment variable)
    #[arg(long)]
    pub token: Option<String>,
}

impl ClientArgs {
    pub fn build(&self) -> Result<Client> {
        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("AFCLI_TOKEN").ok())
            .ok_or_else(|| anyhow!("no API token: pass --token or set AFCLI_TOKEN"))?;
        Ok(Client::new(&self.endpoint, &token)?)
    }
}

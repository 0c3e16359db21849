//! `afcli list-projects` — projects visible to the caller, as CSV or JSON.

use anyhow::Result;
use clap::Args;
use itertools::Itertools;
use std::path::PathBuf;

use crate::api::projects;
use crate::cli::ClientArgs;
use crate::format::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct CmdListProjects {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Only projects of this organization
    #[arg(long)]
    pub organization: Option<String>,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Write here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl CmdListProjects {
    pub fn run(self) -> Result<()> {
        let client = self.client.build()?;
        let projects = projects::get_my_projects(&client, self.organization.as_deref())?
            .into_iter()
            .sorted_by(|a, b| a.title.cmp(&b.title))
            .collect_vec();
        log::info!("{} project(s)", projects.len());
        let text = format::render(&projects, self.format)?;
        format::emit(&text, self.output.as_deref())
    }
}

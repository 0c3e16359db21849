//! `afcli wait-job` — poll an async job until it reaches a terminal state.

use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Duration;

use crate::api::jobs;
use crate::cli::ClientArgs;
use crate::model::JobStatus;

#[derive(Args, Debug)]
pub struct CmdWaitJob {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long)]
    pub project: String,

    /// Job type, e.g. "copy-annotation" or "gen-inputs"
    #[arg(long = "type")]
    pub job_type: String,

    /// Specific job id; default is the most recently created job of the type
    #[arg(long)]
    pub job: Option<String>,

    /// Poll interval
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// Give up after this long
    #[arg(long, default_value = "1h", value_parser = humantime::parse_duration)]
    pub max_wait: Duration,
}

impl CmdWaitJob {
    pub fn run(self) -> Result<()> {
        let client = self.client.build()?;
        let status = jobs::wait_for_job(
            &client,
            &self.project,
            &self.job_type,
            self.job.as_deref(),
            self.interval,
            self.max_wait,
        )?;
        match status {
            JobStatus::Succeeded => {
                log::info!("job succeeded");
                Ok(())
            }
            JobStatus::Failed => Err(anyhow!("job failed")),
            JobStatus::Progress => unreachable!("wait_for_job returns terminal statuses only"),
        }
    }
}

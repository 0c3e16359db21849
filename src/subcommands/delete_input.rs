//! `afcli delete-input` — delete input data after confirmation.

use anyhow::Result;
use clap::Args;

use crate::api::{inputs, projects};
use crate::cli::ClientArgs;
use crate::model::ProjectRole;
use crate::util::confirm;

#[derive(Args, Debug)]
pub struct CmdDeleteInput {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long)]
    pub project: String,

    /// Input-data ids to delete. Repeat or comma-separate.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub input: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

impl CmdDeleteInput {
    pub fn run(self) -> Result<()> {
        let client = self.client.build()?;
        projects::ensure_role(&client, &self.project, &[ProjectRole::Owner])?;

        if !confirm::confirm(
            &format!(
                "Delete {} input-data entr{} from project {}?",
                self.input.len(),
                if self.input.len() == 1 { "y" } else { "ies" },
                self.project
            ),
            self.yes,
        )? {
            log::info!("aborted");
            return Ok(());
        }

        let mut deleted = 0usize;
        for input_id in &self.input {
            match self.delete_one(&client, input_id) {
                Ok(true) => deleted += 1,
                Ok(false) => log::warn!("input data {input_id} not found; skipping"),
                Err(e) => log::warn!("skipping input data {input_id}: {e:#}"),
            }
        }
        log::info!("deleted {deleted} / {} input-data entr(ies)", self.input.len());
        Ok(())
    }

    fn delete_one(&self, client: &crate::api::client::Client, input_id: &str) -> Result<bool> {
        if !inputs::input_exists(client, &self.project, input_id)? {
            return Ok(false);
        }
        let input = inputs::get_input(client, &self.project, input_id)?;
        inputs::delete_input(client, &self.project, input_id)?;
        log::info!("deleted input data {input_id} ({})", input.input_data_name);
        Ok(true)
    }
}

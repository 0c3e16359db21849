//! `afcli update-task-metadata` — merge JSON metadata keys into tasks.

use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashMap;

use crate::api::{projects, tasks};
use crate::cli::ClientArgs;
use crate::model::ProjectRole;
use crate::util::confirm;

#[derive(Args, Debug)]
pub struct CmdUpdateTaskMetadata {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long)]
    pub project: String,

    /// Target task ids. Repeat or comma-separate.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub task: Vec<String>,

    /// Metadata as a JSON object, e.g. '{"reviewed": true}'. Keys are
    /// merged into each task's existing metadata.
    #[arg(long)]
    pub metadata: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

impl CmdUpdateTaskMetadata {
    pub fn run(self) -> Result<()> {
        let patch: HashMap<String, serde_json::Value> =
            serde_json::from_str(&self.metadata).context("--metadata must be a JSON object")?;

        let client = self.client.build()?;
        projects::ensure_role(&client, &self.project, &[ProjectRole::Owner])?;

        if !confirm::confirm(
            &format!("Update metadata of {} task(s)?", self.task.len()),
            self.yes,
        )? {
            log::info!("aborted");
            return Ok(());
        }

        let mut updated = 0usize;
        for task_id in &self.task {
            match self.update_one(&client, task_id, &patch) {
                Ok(()) => updated += 1,
                Err(e) => log::warn!("skipping task {task_id}: {e:#}"),
            }
        }
        log::info!("updated {updated} / {} task(s)", self.task.len());
        Ok(())
    }

    fn update_one(
        &self,
        client: &crate::api::client::Client,
        task_id: &str,
        patch: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let task = tasks::get_task(client, &self.project, task_id)?;
        let metadata = merged_metadata(&task.metadata, patch);
        tasks::put_metadata(client, &self.project, task_id, &metadata)?;
        Ok(())
    }
}

/// Existing keys not named in the patch survive; patched keys win.
fn merged_metadata(
    current: &HashMap<String, serde_json::Value>,
    patch: &HashMap<String, serde_json::Value>,
) -> HashMap<String, serde_json::Value> {
    let mut out = current.clone();
    for (k, v) in patch {
        out.insert(k.clone(), v.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_overrides_and_preserves() {
        let current: HashMap<String, serde_json::Value> =
            [("a".to_string(), json!(1)), ("b".to_string(), json!("x"))]
                .into_iter()
                .collect();
        let patch: HashMap<String, serde_json::Value> =
            [("b".to_string(), json!("y")), ("c".to_string(), json!(true))]
                .into_iter()
                .collect();
        let merged = merged_metadata(&current, &patch);
        assert_eq!(merged["a"], json!(1));
        assert_eq!(merged["b"], json!("y"));
        assert_eq!(merged["c"], json!(true));
    }
}

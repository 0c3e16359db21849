//! `afcli remove-overlap` — per frame, resolve overlaps between all
//! segmentation masks in painter's order (topmost wins) and re-upload
//! only the masks that changed.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::api::client::Client;
use crate::api::{annotations, projects, tasks};
use crate::cli::ClientArgs;
use crate::mask::{self, Mask};
use crate::model::ProjectRole;
use crate::util::confirm;

#[derive(Args, Debug)]
pub struct CmdRemoveOverlap {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long)]
    pub project: String,

    /// Target task ids. Repeat or comma-separate.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub task: Vec<String>,

    /// Tasks processed concurrently
    #[arg(long, default_value_t = 1)]
    pub parallelism: usize,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct FrameStats {
    seen: usize,
    updated: usize,
}

impl CmdRemoveOverlap {
    pub fn run(self) -> Result<()> {
        let client = self.client.build()?;
        projects::ensure_role(
            &client,
            &self.project,
            &[ProjectRole::Owner, ProjectRole::Worker],
        )?;
        let me = projects::get_my_account(&client)?;

        if !confirm::confirm(
            &format!(
                "Remove segmentation overlaps in {} task(s)?",
                self.task.len()
            ),
            self.yes,
        )? {
            log::info!("aborted");
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism.max(1))
            .build()
            .context("build task pool")?;
        let pb = ProgressBar::new(self.task.len() as u64);

        let stats: FrameStats = pool.install(|| {
            self.task
                .par_iter()
                .map(|task_id| {
                    let r = tasks::with_assignment(
                        &client,
                        &self.project,
                        task_id,
                        &me.account_id,
                        |task| self.process_task(&client, task_id, &task.input_data_id_list),
                    );
                    pb.inc(1);
                    match r {
                        Ok(s) => s,
                        Err(e) => {
                            log::warn!("skipping task {task_id}: {e:#}");
                            FrameStats::default()
                        }
                    }
                })
                .reduce(FrameStats::default, |a, b| FrameStats {
                    seen: a.seen + b.seen,
                    updated: a.updated + b.updated,
                })
        });
        pb.finish_and_clear();

        log::info!(
            "removed overlaps in {} / {} frame(s)",
            stats.updated,
            stats.seen
        );
        Ok(())
    }

    fn process_task(
        &self,
        client: &Client,
        task_id: &str,
        input_ids: &[String],
    ) -> Result<FrameStats> {
        let mut stats = FrameStats::default();
        for input_id in input_ids {
            stats.seen += 1;
            match self.process_frame(client, task_id, input_id) {
                Ok(n) if n > 0 => stats.updated += 1,
                Ok(_) => {}
                Err(e) => log::warn!("skipping frame {input_id} of task {task_id}: {e:#}"),
            }
        }
        Ok(stats)
    }

    /// Returns the number of masks re-uploaded for this frame.
    fn process_frame(&self, client: &Client, task_id: &str, input_id: &str) -> Result<usize> {
        let frame = annotations::get_frame(client, &self.project, task_id, input_id)?;
        let seg: Vec<_> = frame.details.iter().filter(|d| d.is_segmentation()).collect();
        if seg.len() < 2 {
            return Ok(0);
        }

        // The detail list is back-to-front, which is exactly the ordering
        // remove_overlap wants.
        let order: Vec<String> = seg.iter().map(|d| d.annotation_id.clone()).collect();
        let mut masks: HashMap<String, Mask> = HashMap::with_capacity(seg.len());
        for d in &seg {
            masks.insert(d.annotation_id.clone(), annotations::download_mask(client, d)?);
        }

        let resolved = mask::remove_overlap(&masks, &order)?;

        // Only persist masks the resolution actually changed.
        let mut uploaded = 0usize;
        for id in &order {
            if resolved[id] != masks[id] {
                annotations::upload_mask(client, &self.project, input_id, id, &resolved[id])?;
                uploaded += 1;
            }
        }
        if uploaded > 0 {
            log::info!(
                "task {task_id} frame {input_id}: re-uploaded {uploaded} of {} mask(s)",
                order.len()
            );
        }
        Ok(uploaded)
    }
}

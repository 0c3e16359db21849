//! `afcli merge-masks` — within each frame, merge all segmentation masks
//! of a label into that label's front-most annotation and drop the rest.
//!
//! Tasks fan out over a rayon pool; a failure on one frame is logged and
//! skipped, never fatal to the batch.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::api::client::Client;
use crate::api::{annotations, projects, tasks};
use crate::cli::ClientArgs;
use crate::mask;
use crate::model::{AnnotationDetail, ProjectRole};
use crate::util::confirm;

#[derive(Args, Debug)]
pub struct CmdMergeMasks {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long)]
    pub project: String,

    /// Target task ids. Repeat or comma-separate.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub task: Vec<String>,

    /// Only merge annotations of this label id
    #[arg(long)]
    pub label: Option<String>,

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

impl CmdMergeMasks {
    pub fn run(self) -> Result<()> {
        let client = self.client.build()?;
        projects::ensure_role(
            &client,
            &self.project,
            &[ProjectRole::Owner, ProjectRole::Worker],
        )?;
        let me = projects::get_my_account(&client)?;

        if !confirm::confirm(
            &format!("Merge segmentation masks in {} task(s)?", self.task.len()),
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
                        |task| self.merge_task(&client, task_id, &task.input_data_id_list),
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
            "merged masks in {} / {} frame(s)",
            stats.updated,
            stats.seen
        );
        Ok(())
    }

    fn merge_task(&self, client: &Client, task_id: &str, input_ids: &[String]) -> Result<FrameStats> {
        let mut stats = FrameStats::default();
        for input_id in input_ids {
            stats.seen += 1;
            match self.merge_frame(client, task_id, input_id) {
                Ok(true) => stats.updated += 1,
                Ok(false) => {}
                Err(e) => log::warn!("skipping frame {input_id} of task {task_id}: {e:#}"),
            }
        }
        Ok(stats)
    }

    /// Returns true when the frame was modified.
    fn merge_frame(&self, client: &Client, task_id: &str, input_id: &str) -> Result<bool> {
        let mut frame = annotations::get_frame(client, &self.project, task_id, input_id)?;
        let groups = label_groups(&frame.details, self.label.as_deref());
        if groups.is_empty() {
            return Ok(false);
        }
        let n_groups = groups.len();

        let mut dropped: Vec<String> = Vec::new();
        for group in groups {
            // Back-to-front order; the last annotation is the front-most
            // and keeps the merged mask.
            let masks = group
                .iter()
                .map(|d| annotations::download_mask(client, d))
                .collect::<Result<Vec<_>>>()?;
            let merged = mask::merge(&masks)?;
            let Some((keep, rest)) = group.split_last() else {
                continue;
            };
            annotations::upload_mask(
                client,
                &self.project,
                input_id,
                &keep.annotation_id,
                &merged,
            )?;
            dropped.extend(rest.iter().map(|d| d.annotation_id.clone()));
        }

        frame.details.retain(|d| !dropped.contains(&d.annotation_id));
        annotations::put_frame(client, &frame)?;
        log::info!(
            "task {task_id} frame {input_id}: merged {n_groups} group(s), dropped {} annotation(s)",
            dropped.len()
        );
        Ok(true)
    }
}

/// Segmentation annotations grouped by label, groups and members both in
/// the frame's back-to-front order. Singleton groups are omitted; there is
/// nothing to merge.
fn label_groups<'a>(
    details: &'a [AnnotationDetail],
    label: Option<&str>,
) -> Vec<Vec<&'a AnnotationDetail>> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: Vec<Vec<&AnnotationDetail>> = Vec::new();
    for d in details {
        if !d.is_segmentation() {
            continue;
        }
        if label.is_some_and(|l| l != d.label_id) {
            continue;
        }
        match order.iter().position(|&l| l == d.label_id) {
            Some(i) => groups[i].push(d),
            None => {
                order.push(&d.label_id);
                groups.push(vec![d]);
            }
        }
    }
    groups.retain(|g| g.len() >= 2);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, label: &str, holding: &str) -> AnnotationDetail {
        AnnotationDetail {
            annotation_id: id.to_string(),
            label_id: label.to_string(),
            data_holding_type: holding.to_string(),
            url: None,
            etag: None,
            data: None,
        }
    }

    #[test]
    fn groups_by_label_and_keeps_order() {
        let details = vec![
            detail("a1", "car", "outer"),
            detail("b1", "tree", "outer"),
            detail("a2", "car", "outer"),
            detail("v1", "car", "inner"), // vector shape, ignored
        ];
        let groups = label_groups(&details, None);
        assert_eq!(groups.len(), 1); // tree is a singleton
        let ids: Vec<&str> = groups[0].iter().map(|d| d.annotation_id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2"]);
    }

    #[test]
    fn label_filter_narrows_groups() {
        let details = vec![
            detail("a1", "car", "outer"),
            detail("a2", "car", "outer"),
            detail("b1", "tree", "outer"),
            detail("b2", "tree", "outer"),
        ];
        let groups = label_groups(&details, Some("tree"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0][0].label_id, "tree");
    }

    #[test]
    fn nothing_to_merge_without_duplicates() {
        let details = vec![detail("a1", "car", "outer"), detail("b1", "tree", "outer")];
        assert!(label_groups(&details, None).is_empty());
    }
}

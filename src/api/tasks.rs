//! Task endpoints, plus the assignment dance mutating subcommands need:
//! the service rejects annotation writes unless the caller is the task's
//! current operator.

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::collections::HashMap;

use crate::api::client::Client;
use crate::model::{Task, TaskStatus};

pub fn get_task(client: &Client, project_id: &str, task_id: &str) -> Result<Task> {
    client
        .get_json(&format!("projects/{project_id}/tasks/{task_id}"), &[])
        .with_context(|| format!("get task {task_id}"))
}

/// Replace the task's metadata map.
pub fn put_metadata(
    client: &Client,
    project_id: &str,
    task_id: &str,
    metadata: &HashMap<String, serde_json::Value>,
) -> Result<Task> {
    client
        .put_json(
            &format!("projects/{project_id}/tasks/{task_id}/metadata"),
            metadata,
        )
        .with_context(|| format!("update metadata of task {task_id}"))
}

/// Change the task's operator (and keep its status).
pub fn assign_operator(
    client: &Client,
    task: &Task,
    account_id: Option<&str>,
) -> Result<Task> {
    let body = json!({
        "status": task.status,
        "account_id": account_id,
        "last_updated_datetime": task.updated_datetime,
    });
    client
        .put_json(
            &format!("projects/{}/tasks/{}/operate", task.project_id, task.task_id),
            &body,
        )
        .with_context(|| format!("assign operator of task {}", task.task_id))
}

/// Run `f` while the caller holds the task assignment.
///
/// If another account is assigned, the task is temporarily reassigned to
/// the caller and the original operator is restored afterwards, whether or
/// not `f` succeeded. Tasks another account is actively `working` on are
/// refused rather than stolen.
pub fn with_assignment<R>(
    client: &Client,
    project_id: &str,
    task_id: &str,
    my_account_id: &str,
    f: impl FnOnce(&Task) -> Result<R>,
) -> Result<R> {
    let task = get_task(client, project_id, task_id)?;

    let mine = task.account_id.as_deref() == Some(my_account_id);
    if task.status == TaskStatus::Working && !mine {
        return Err(anyhow!(
            "task {task_id} is being worked on by another account; skipping"
        ));
    }

    if mine {
        return f(&task);
    }

    let original = task.account_id.clone();
    let held = assign_operator(client, &task, Some(my_account_id))
        .with_context(|| format!("take assignment of task {task_id}"))?;

    let result = f(&held);

    // Put the original operator back even when `f` failed. A failed
    // restore on the success path is an error in its own right; on the
    // failure path it is only logged so the original error surfaces.
    let current = get_task(client, project_id, task_id).unwrap_or(held);
    match assign_operator(client, &current, original.as_deref()) {
        Ok(_) => result,
        Err(restore_err) => match result {
            Ok(_) => Err(restore_err.context(format!("restore operator of task {task_id}"))),
            Err(e) => {
                log::warn!("failed to restore operator of task {task_id}: {restore_err:#}");
                Err(e)
            }
        },
    }
}

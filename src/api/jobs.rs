//! Async job listing and polling.

use anyhow::{anyhow, Result};
use std::time::{Duration, Instant};

use crate::api::client::Client;
use crate::model::{JobInfo, JobStatus};

pub fn list_jobs(client: &Client, project_id: &str, job_type: &str) -> Result<Vec<JobInfo>> {
    Ok(client.get_all_pages(
        &format!("projects/{project_id}/jobs"),
        &[("type", job_type.to_string())],
    )?)
}

/// Pick the job to watch: an explicit id if given, otherwise the most
/// recently created job of the type.
pub fn select_job<'a>(jobs: &'a [JobInfo], job_id: Option<&str>) -> Option<&'a JobInfo> {
    match job_id {
        Some(id) => jobs.iter().find(|j| j.job_id == id),
        None => jobs.iter().max_by(|a, b| {
            a.created_datetime
                .as_deref()
                .cmp(&b.created_datetime.as_deref())
        }),
    }
}

/// Poll until the job reaches a terminal status or `max_wait` elapses.
pub fn wait_for_job(
    client: &Client,
    project_id: &str,
    job_type: &str,
    job_id: Option<&str>,
    interval: Duration,
    max_wait: Duration,
) -> Result<JobStatus> {
    let started = Instant::now();
    loop {
        let jobs = list_jobs(client, project_id, job_type)?;
        let job = select_job(&jobs, job_id)
            .ok_or_else(|| anyhow!("no job of type {job_type} found in project {project_id}"))?;
        if job.job_status.is_terminal() {
            return Ok(job.job_status);
        }
        log::info!(
            "job {} ({job_type}) still in progress, waited {:?}",
            job.job_id,
            started.elapsed()
        );
        if started.elapsed() + interval > max_wait {
            return Err(anyhow!(
                "job {} did not finish within {}",
                job.job_id,
                humantime::format_duration(max_wait)
            ));
        }
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, created: &str, status: JobStatus) -> JobInfo {
        JobInfo {
            project_id: "p".into(),
            job_type: "copy-annotation".into(),
            job_id: id.into(),
            job_status: status,
            created_datetime: Some(created.into()),
            updated_datetime: None,
        }
    }

    #[test]
    fn select_by_id() {
        let jobs = vec![
            job("j1", "2026-01-01T00:00:00Z", JobStatus::Succeeded),
            job("j2", "2026-01-02T00:00:00Z", JobStatus::Progress),
        ];
        assert_eq!(select_job(&jobs, Some("j1")).unwrap().job_id, "j1");
        assert!(select_job(&jobs, Some("nope")).is_none());
    }

    #[test]
    fn select_latest_without_id() {
        let jobs = vec![
            job("old", "2026-01-01T00:00:00Z", JobStatus::Succeeded),
            job("new", "2026-01-02T00:00:00Z", JobStatus::Progress),
        ];
        assert_eq!(select_job(&jobs, None).unwrap().job_id, "new");
    }
}

use anyhow::{anyhow, Result};

use crate::api::client::Client;
use crate::model::{Account, Project, ProjectMember, ProjectRole};

pub fn get_my_account(client: &Client) -> Result<Account> {
    Ok(client.get_json("my/account", &[])?)
}

/// All projects the caller belongs to, optionally filtered by organization.
pub fn get_my_projects(client: &Client, organization: Option<&str>) -> Result<Vec<Project>> {
    let projects: Vec<Project> = client.get_all_pages("my/projects", &[])?;
    Ok(match organization {
        Some(org) => projects
            .into_iter()
            .filter(|p| p.organization_name.as_deref() == Some(org))
            .collect(),
        None => projects,
    })
}

pub fn get_my_member(client: &Client, project_id: &str) -> Result<ProjectMember> {
    Ok(client.get_json(&format!("my/projects/{project_id}/member"), &[])?)
}

/// Fail early when the caller's project role is not one of `allowed`.
/// Mutating subcommands call this before touching anything.
pub fn ensure_role(client: &Client, project_id: &str, allowed: &[ProjectRole]) -> Result<()> {
    let member = get_my_member(client, project_id)?;
    if allowed.contains(&member.member_role) {
        Ok(())
    } else {
        Err(anyhow!(
            "project {project_id}: role {:?} is not allowed for this operation (need one of {allowed:?})",
            member.member_role
        ))
    }
}

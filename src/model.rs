use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default page size for paginated list endpoints.
pub const PAGE_SIZE: u32 = 200;

/// Segmentation annotations keep their mask as an external file.
pub const HOLDING_TYPE_OUTER: &str = "outer";

/// A project visible to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub organization_name: Option<String>,
    pub project_status: String,
    #[serde(default)]
    pub created_datetime: Option<String>,
    #[serde(default)]
    pub updated_datetime: Option<String>,
}

/// The caller's membership in a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_id: String,
    pub account_id: String,
    pub member_role: ProjectRole,
    pub member_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Owner,
    Worker,
    Accepter,
    TrainingDataUser,
}

/// Account record from `GET /my/account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    Working,
    OnHold,
    Break,
    Complete,
}

/// An annotation task: a set of input-data frames worked on as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub project_id: String,
    pub phase: String,
    pub status: TaskStatus,
    /// Currently assigned operator, if any.
    #[serde(default)]
    pub account_id: Option<String>,
    pub input_data_id_list: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub updated_datetime: Option<String>,
}

/// One input-data entry (an image frame).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputData {
    pub input_data_id: String,
    pub project_id: String,
    pub input_data_name: String,
    #[serde(default)]
    pub updated_datetime: Option<String>,
}

/// Editor annotations for one (task, input-data) frame.
///
/// `details` is in the editor's list order, which is painter's order
/// back-to-front for segmentation annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnnotation {
    pub project_id: String,
    pub task_id: String,
    pub input_data_id: String,
    pub details: Vec<AnnotationDetail>,
    #[serde(default)]
    pub updated_datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDetail {
    pub annotation_id: String,
    pub label_id: String,
    /// "inner" for vector shapes, "outer" for file-backed masks.
    pub data_holding_type: String,
    /// Download URL of the outer body, present when `data_holding_type`
    /// is "outer".
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
    /// Inline geometry for inner annotations; opaque to this tool.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl AnnotationDetail {
    pub fn is_segmentation(&self) -> bool {
        self.data_holding_type == HOLDING_TYPE_OUTER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Progress,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Progress)
    }
}

/// An asynchronous background job (copy, import, gen-annotation, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub project_id: String,
    pub job_type: String,
    pub job_id: String,
    pub job_status: JobStatus,
    #[serde(default)]
    pub created_datetime: Option<String>,
    #[serde(default)]
    pub updated_datetime: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_uses_snake_case_wire_names() {
        let t: TaskStatus = serde_json::from_str("\"not_started\"").unwrap();
        assert_eq!(t, TaskStatus::NotStarted);
        assert_eq!(
            serde_json::to_string(&TaskStatus::OnHold).unwrap(),
            "\"on_hold\""
        );
    }

    #[test]
    fn job_terminal_states() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Progress.is_terminal());
    }

    #[test]
    fn detail_parses_with_optional_fields_missing() {
        let d: AnnotationDetail = serde_json::from_str(
            r#"{"annotation_id":"a1","label_id":"car","data_holding_type":"outer"}"#,
        )
        .unwrap();
        assert!(d.is_segmentation());
        assert!(d.url.is_none());
    }
}

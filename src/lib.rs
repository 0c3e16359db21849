pub mod cli;
pub mod error;
pub mod format;
pub mod mask;
pub mod model;

pub mod api {
    pub mod annotations;
    pub mod client;
    pub mod inputs;
    pub mod jobs;
    pub mod projects;
    pub mod tasks;
}

pub mod subcommands {
    pub mod delete_input;
    pub mod list_projects;
    pub mod merge_masks;
    pub mod remove_overlap;
    pub mod update_task_metadata;
    pub mod wait_job;
}

pub mod util {
    pub mod confirm;
}

use anyhow::{Context, Result};

use crate::api::client::Client;
use crate::model::InputData;

pub fn get_input(client: &Client, project_id: &str, input_data_id: &str) -> Result<InputData> {
    client
        .get_json(&format!("projects/{project_id}/inputs/{input_data_id}"), &[])
        .with_context(|| format!("get input data {input_data_id}"))
}

pub fn input_exists(client: &Client, project_id: &str, input_data_id: &str) -> Result<bool> {
    Ok(client.exists(&format!("projects/{project_id}/inputs/{input_data_id}"))?)
}

pub fn delete_input(client: &Client, project_id: &str, input_data_id: &str) -> Result<()> {
    client
        .delete(&format!("projects/{project_id}/inputs/{input_data_id}"))
        .with_context(|| format!("delete input data {input_data_id}"))
}

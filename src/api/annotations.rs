//! Frame annotation endpoints and outer-body (mask file) transfer.

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use crate::api::client::Client;
use crate::mask::Mask;
use crate::model::{AnnotationDetail, FrameAnnotation};

/// Editor annotations of one (task, input-data) frame, details in
/// painter's order back-to-front.
pub fn get_frame(
    client: &Client,
    project_id: &str,
    task_id: &str,
    input_data_id: &str,
) -> Result<FrameAnnotation> {
    client
        .get_json(
            &format!("projects/{project_id}/tasks/{task_id}/inputs/{input_data_id}/annotation"),
            &[],
        )
        .with_context(|| format!("get annotations of frame {input_data_id}"))
}

/// Download and decode the PNG mask behind a segmentation detail.
pub fn download_mask(client: &Client, detail: &AnnotationDetail) -> Result<Mask> {
    let url = detail.url.as_deref().ok_or_else(|| {
        anyhow!(
            "annotation {} has no outer body URL",
            detail.annotation_id
        )
    })?;
    let bytes = client
        .get_bytes(url)
        .with_context(|| format!("download mask of annotation {}", detail.annotation_id))?;
    Mask::decode_png(&bytes)
        .with_context(|| format!("decode mask of annotation {}", detail.annotation_id))
}

/// Upload a replacement mask for an existing segmentation annotation.
pub fn upload_mask(
    client: &Client,
    project_id: &str,
    input_data_id: &str,
    annotation_id: &str,
    mask: &Mask,
) -> Result<()> {
    let png = mask.encode_png()?;
    client
        .put_bytes(
            &format!(
                "projects/{project_id}/inputs/{input_data_id}/annotations/{annotation_id}/outer-body"
            ),
            "image/png",
            png,
        )
        .with_context(|| format!("upload mask of annotation {annotation_id}"))?;
    Ok(())
}

/// Replace the frame's detail list (e.g. after dropping merged-away
/// annotations). `updated_datetime` carries the optimistic lock.
pub fn put_frame(client: &Client, frame: &FrameAnnotation) -> Result<FrameAnnotation> {
    let body = json!({
        "project_id": frame.project_id,
        "task_id": frame.task_id,
        "input_data_id": frame.input_data_id,
        "details": frame.details,
        "updated_datetime": frame.updated_datetime,
    });
    client
        .put_json(
            &format!(
                "projects/{}/tasks/{}/inputs/{}/annotation",
                frame.project_id, frame.task_id, frame.input_data_id
            ),
            &body,
        )
        .with_context(|| format!("put annotations of frame {}", frame.input_data_id))
}

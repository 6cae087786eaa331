use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::errors::AppError;
use crate::generation::{ContentRequest, ContentResponse, UploadResponse, VideoCreateRequest};
use crate::InnerState;

#[tracing::instrument(name = "Generate podcast content", skip(inner, request))]
pub async fn generate_content(
    State(inner): State<InnerState>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<ContentResponse>, AppError> {
    let response = inner.generation_client.create_content(&request).await?;
    Ok(Json(response))
}

#[tracing::instrument(name = "Generate podcast video", skip(inner, request), fields(title = %request.title))]
pub async fn generate_video(
    State(inner): State<InnerState>,
    Json(request): Json<VideoCreateRequest>,
) -> Result<Json<Value>, AppError> {
    let response = inner.generation_client.create_video(&request).await?;
    Ok(Json(response))
}

#[tracing::instrument(name = "Upload video", skip(inner, video))]
pub async fn upload_video(
    State(inner): State<InnerState>,
    Json(video): Json<Value>,
) -> Result<Json<UploadResponse>, AppError> {
    let response = inner.generation_client.upload_video(&video).await?;
    Ok(Json(response))
}

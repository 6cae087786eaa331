use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::InnerState;

/// Lifecycle label of a video. Purely descriptive: any status may be set to
/// any other status by a direct update, there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VideoStatus {
    #[default]
    Draft,
    Pending,
    Processing,
    CreatingAudio,
    CreatingVideo,
    ReadyToPublish,
    Uploading,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Draft => "draft",
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::CreatingAudio => "creating-audio",
            VideoStatus::CreatingVideo => "creating-video",
            VideoStatus::ReadyToPublish => "ready-to-publish",
            VideoStatus::Uploading => "uploading",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        }
    }
}

/// A video row joined with its parent channel's display names. The join is
/// optional on purpose: a deleted channel leaves the reference dangling and
/// the names come back as null.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithChannel {
    pub id: String,
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub channel_name_cn: Option<String>,
    pub title: String,
    pub status: String,
    pub prompt: String,
    pub content: String,
    pub description: String,
    pub tags: String,
    pub audio_url: String,
    pub subtitle_url: String,
    pub video_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub status: VideoStatus,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default)]
    pub subtitle_url: String,
    #[serde(default)]
    pub video_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFilter {
    pub channel_id: Option<String>,
}

const VIDEO_SELECT: &str = r#"
    SELECT v.*, c.name AS channel_name, c.name_cn AS channel_name_cn
    FROM videos v
    LEFT JOIN channels c ON c.id = v.channel_id
"#;

async fn channel_exists(channel_id: &str, db: &PgPool) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM channels WHERE id = $1"#)
        .bind(channel_id)
        .fetch_one(db)
        .await?;

    Ok(count > 0)
}

#[tracing::instrument(name = "List videos", skip(inner), fields(channel_id = ?filter.channel_id))]
pub async fn all_videos(
    State(inner): State<InnerState>,
    Query(filter): Query<VideoFilter>,
) -> Result<Json<Vec<VideoWithChannel>>, AppError> {
    let InnerState { db, .. } = inner;

    let videos = match filter.channel_id {
        Some(ref channel_id) => {
            let sql = format!(
                "{} WHERE v.channel_id = $1 ORDER BY v.created_at DESC",
                VIDEO_SELECT
            );
            sqlx::query_as::<_, VideoWithChannel>(&sql)
                .bind(channel_id)
                .fetch_all(&db)
                .await?
        }
        None => {
            let sql = format!("{} ORDER BY v.created_at DESC", VIDEO_SELECT);
            sqlx::query_as::<_, VideoWithChannel>(&sql)
                .fetch_all(&db)
                .await?
        }
    };

    Ok(Json(videos))
}

#[tracing::instrument(name = "Get video", skip(inner))]
pub async fn get_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    let sql = format!("{} WHERE v.id = $1", VIDEO_SELECT);
    let video = sqlx::query_as::<_, VideoWithChannel>(&sql)
        .bind(&id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(json!({ "success": true, "video": video })))
}

#[tracing::instrument(name = "Create video", skip(inner, payload), fields(title = %payload.title, channel_id = %payload.channel_id))]
pub async fn create_video(
    State(inner): State<InnerState>,
    Json(payload): Json<VideoPayload>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Video title is required".to_string()));
    }

    if !channel_exists(&payload.channel_id, &db).await? {
        return Err(AppError::Validation(
            "Selected channel does not exist".to_string(),
        ));
    }

    let uuid = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().naive_utc();

    sqlx::query(
        r#"INSERT INTO videos
        (id, channel_id, title, status, prompt, content, description, tags,
         audio_url, subtitle_url, video_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)"#,
    )
    .bind(&uuid)
    .bind(&payload.channel_id)
    .bind(&payload.title)
    .bind(payload.status.as_str())
    .bind(&payload.prompt)
    .bind(&payload.content)
    .bind(&payload.description)
    .bind(&payload.tags)
    .bind(&payload.audio_url)
    .bind(&payload.subtitle_url)
    .bind(&payload.video_url)
    .bind(now)
    .execute(&db)
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Video created",
        "id": uuid
    })))
}

#[tracing::instrument(name = "Update video", skip(inner, payload), fields(title = %payload.title, channel_id = %payload.channel_id))]
pub async fn update_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    Json(payload): Json<VideoPayload>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Video title is required".to_string()));
    }

    if !channel_exists(&payload.channel_id, &db).await? {
        return Err(AppError::Validation(
            "Selected channel does not exist".to_string(),
        ));
    }

    let now = chrono::Utc::now().naive_utc();

    let result = sqlx::query(
        r#"UPDATE videos SET channel_id = $1, title = $2, status = $3, prompt = $4,
        content = $5, description = $6, tags = $7, audio_url = $8, subtitle_url = $9,
        video_url = $10, updated_at = $11
        WHERE id = $12"#,
    )
    .bind(&payload.channel_id)
    .bind(&payload.title)
    .bind(payload.status.as_str())
    .bind(&payload.prompt)
    .bind(&payload.content)
    .bind(&payload.description)
    .bind(&payload.tags)
    .bind(&payload.audio_url)
    .bind(&payload.subtitle_url)
    .bind(&payload.video_url)
    .bind(now)
    .bind(&id)
    .execute(&db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Video updated" })))
}

#[tracing::instrument(name = "Delete video", skip(inner))]
pub async fn delete_video(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    let result = sqlx::query(r#"DELETE FROM videos WHERE id = $1"#)
        .bind(&id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Video deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_their_wire_names() {
        let statuses = [
            (VideoStatus::Draft, "draft"),
            (VideoStatus::Pending, "pending"),
            (VideoStatus::Processing, "processing"),
            (VideoStatus::CreatingAudio, "creating-audio"),
            (VideoStatus::CreatingVideo, "creating-video"),
            (VideoStatus::ReadyToPublish, "ready-to-publish"),
            (VideoStatus::Uploading, "uploading"),
            (VideoStatus::Completed, "completed"),
            (VideoStatus::Failed, "failed"),
        ];

        for (status, wire) in statuses {
            assert_eq!(status.as_str(), wire);
            assert_eq!(serde_json::to_value(status).unwrap(), json!(wire));
            let parsed: VideoStatus = serde_json::from_value(json!(wire)).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_value::<VideoStatus>(json!("published")).is_err());
    }

    #[test]
    fn video_payload_defaults_to_draft() {
        let payload: VideoPayload = serde_json::from_value(json!({
            "channelId": "c1",
            "title": "Episode 1"
        }))
        .unwrap();

        assert_eq!(payload.status, VideoStatus::Draft);
        assert_eq!(payload.content, "");
    }
}

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::InnerState;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub name_cn: String,
    pub youtube_url: String,
    pub prompt: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPayload {
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(default)]
    pub youtube_url: String,
    #[serde(default)]
    pub prompt: String,
}

#[tracing::instrument(name = "List channels", skip(inner))]
pub async fn all_channels(
    State(inner): State<InnerState>,
) -> Result<Json<Vec<Channel>>, AppError> {
    let InnerState { db, .. } = inner;

    let channels =
        sqlx::query_as::<_, Channel>(r#"SELECT * FROM channels ORDER BY created_at DESC"#)
            .fetch_all(&db)
            .await?;

    Ok(Json(channels))
}

#[tracing::instrument(name = "Get channel", skip(inner))]
pub async fn get_channel(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    let channel = sqlx::query_as::<_, Channel>(r#"SELECT * FROM channels WHERE id = $1"#)
        .bind(&id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

    Ok(Json(json!({ "success": true, "channel": channel })))
}

#[tracing::instrument(name = "Create channel", skip(inner, payload), fields(name = %payload.name))]
pub async fn create_channel(
    State(inner): State<InnerState>,
    Json(payload): Json<ChannelPayload>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Channel name is required".to_string(),
        ));
    }

    let existing = sqlx::query_as::<_, Channel>(r#"SELECT * FROM channels WHERE name = $1"#)
        .bind(&payload.name)
        .fetch_optional(&db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Channel name already exists".to_string(),
        ));
    }

    let uuid = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().naive_utc();

    let channel = sqlx::query_as::<_, Channel>(
        r#"INSERT INTO channels (id, name, name_cn, youtube_url, prompt, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING *"#,
    )
    .bind(&uuid)
    .bind(&payload.name)
    .bind(&payload.name_cn)
    .bind(&payload.youtube_url)
    .bind(&payload.prompt)
    .bind(now)
    .fetch_one(&db)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict("Channel name already exists".to_string()),
        other => other,
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Channel created",
        "id": channel.id
    })))
}

#[tracing::instrument(name = "Update channel", skip(inner, payload), fields(name = %payload.name))]
pub async fn update_channel(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    Json(payload): Json<ChannelPayload>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Channel name is required".to_string(),
        ));
    }

    // Exclude the channel itself so renaming to its own current name is a
    // no-op rather than a conflict.
    let taken =
        sqlx::query_as::<_, Channel>(r#"SELECT * FROM channels WHERE name = $1 AND id <> $2"#)
            .bind(&payload.name)
            .bind(&id)
            .fetch_optional(&db)
            .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "Channel name is already in use".to_string(),
        ));
    }

    let now = chrono::Utc::now().naive_utc();

    let result = sqlx::query(
        r#"UPDATE channels SET name = $1, name_cn = $2, youtube_url = $3, prompt = $4, updated_at = $5
        WHERE id = $6"#,
    )
    .bind(&payload.name)
    .bind(&payload.name_cn)
    .bind(&payload.youtube_url)
    .bind(&payload.prompt)
    .bind(now)
    .bind(&id)
    .execute(&db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Channel updated" })))
}

#[tracing::instrument(name = "Delete channel", skip(inner))]
pub async fn delete_channel(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, .. } = inner;

    // Videos referencing this channel are left untouched; their channelId
    // dangles afterwards.
    let result = sqlx::query(r#"DELETE FROM channels WHERE id = $1"#)
        .bind(&id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Channel deleted" })))
}

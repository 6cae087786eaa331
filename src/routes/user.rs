use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[tracing::instrument(name = "Find user by username", skip(pool))]
pub async fn find_user_by_username(
    username: &str,
    pool: &PgPool,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE username = $1"#)
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

#[tracing::instrument(name = "Saving new user in the database", skip(password_hash, pool))]
pub async fn insert_user(
    username: &str,
    password_hash: &str,
    pool: &PgPool,
) -> Result<User, AppError> {
    let uuid = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().naive_utc();

    let user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (id, username, password_hash, created_at) VALUES ($1, $2, $3, $4) RETURNING *"#,
    )
    .bind(&uuid)
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use crate::authentication::{
    compute_password_hash, validate_credentials, AuthError, Credentials, Identity,
};
use crate::errors::AppError;
use crate::routes::{find_user_by_username, insert_user};
use crate::utils::{remove_auth_cookie, setup_auth_cookie, AUTH_COOKIE};
use crate::InnerState;

#[derive(Deserialize)]
pub struct AuthPayload {
    pub username: String,
    pub password: String,
}

#[tracing::instrument(name = "Register user", skip(cookies, inner, payload), fields(username = %payload.username))]
pub async fn register_user(
    cookies: Cookies,
    State(inner): State<InnerState>,
    Json(payload): Json<AuthPayload>,
) -> Result<Json<Value>, AppError> {
    let InnerState {
        db, token_codec, ..
    } = inner;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    // Friendly error path; the unique index on users.username is the
    // authoritative check and surfaces as a Conflict too if two
    // registrations race past this lookup.
    if find_user_by_username(username, &db).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = compute_password_hash(&payload.password)?;
    let user = insert_user(username, &password_hash, &db).await.map_err(
        |e| match e {
            AppError::Conflict(_) => AppError::Conflict("Username already exists".to_string()),
            other => other,
        },
    )?;

    let identity = Identity {
        user_id: user.id,
        username: user.username,
    };
    let token = token_codec.issue(&identity)?;
    setup_auth_cookie(&token, &cookies);

    tracing::info!("New account registered");

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful",
        "token": token
    })))
}

#[tracing::instrument(name = "Login user", skip(cookies, inner, payload), fields(username = %payload.username))]
pub async fn login_user(
    cookies: Cookies,
    State(inner): State<InnerState>,
    Json(payload): Json<AuthPayload>,
) -> Result<Json<Value>, AppError> {
    let InnerState {
        db, token_codec, ..
    } = inner;

    let credentials = Credentials {
        username: payload.username,
        password: payload.password,
    };

    // Unknown usernames and wrong passwords map to the same message so the
    // endpoint cannot be used to enumerate accounts.
    let user = validate_credentials(&credentials, &db)
        .await
        .map_err(|auth_error| match auth_error {
            AuthError::InvalidCredentials(_) => {
                AppError::Authentication(anyhow::anyhow!("Invalid username or password"))
            }
            AuthError::UnexpectedError(e) => {
                AppError::Unexpected(e.context("Credential validation failed"))
            }
        })?;

    let identity = Identity {
        user_id: user.id,
        username: user.username,
    };
    let token = token_codec.issue(&identity)?;
    setup_auth_cookie(&token, &cookies);

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token
    })))
}

/// A missing or invalid cookie means the caller is anonymous; that is a
/// normal answer here, not an error.
#[tracing::instrument(name = "Current user", skip(cookies, inner))]
pub async fn current_user(
    cookies: Cookies,
    State(inner): State<InnerState>,
) -> Result<Json<Value>, AppError> {
    let identity = cookies
        .get(AUTH_COOKIE)
        .and_then(|cookie| inner.token_codec.verify(cookie.value()));

    match identity {
        Some(identity) => Ok(Json(json!({ "success": true, "user": identity }))),
        None => Ok(Json(json!({ "success": false, "user": null }))),
    }
}

#[tracing::instrument(name = "Logout user", skip(cookies))]
pub async fn logout_user(cookies: Cookies) -> Result<Json<Value>, AppError> {
    remove_auth_cookie(&cookies);
    Ok(Json(json!({ "success": true })))
}

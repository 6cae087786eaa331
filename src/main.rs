mod authentication;
mod db;
mod errors;
mod generation;
mod routes;
mod utils;

use crate::authentication::TokenCodec;
use crate::db::init_db;
use crate::generation::GenerationClient;

use crate::routes::{
    all_channels, all_videos, create_channel, create_video, current_user, delete_channel,
    delete_video, generate_content, generate_video, get_channel, get_video, health_check,
    login_user, logout_user, register_user, update_channel, update_video, upload_video,
};

use axum::routing::{get, post};
use axum::Router;
use axum_prometheus::PrometheusMetricLayer;
use sqlx::PgPool;
use std::error::Error;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone)]
pub struct InnerState {
    pub db: PgPool,
    pub token_codec: TokenCodec,
    pub generation_client: GenerationClient,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mm2_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = init_db().await?;

    // A missing signing secret is fatal: without it no session token can be
    // issued or verified.
    let secret = std::env::var("SECRET_TOKEN")?;
    let token_codec = TokenCodec::from_secret(&secret);

    let generation_client = GenerationClient::from_env();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app_state = InnerState {
        db,
        token_codec,
        generation_client,
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .route("/auth/logout", post(logout_user))
        .route("/auth/me", get(current_user))
        .route("/channels", get(all_channels).post(create_channel))
        .route(
            "/channels/:id",
            get(get_channel).put(update_channel).delete(delete_channel),
        )
        .route("/videos", get(all_videos).post(create_video))
        .route(
            "/videos/:id",
            get(get_video).put(update_video).delete(delete_video),
        )
        .route("/generation/content", post(generate_content))
        .route("/generation/video", post(generate_video))
        .route("/generation/upload", post(upload_video))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer)
        .layer(CookieManagerLayer::new())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001")
        .await
        .expect("Could not initialize TcpListener");

    tracing::debug!(
        "listening on {}",
        listener
            .local_addr()
            .expect("Could not convert listener address to local address")
    );

    axum::serve(listener, app)
        .await
        .expect("Could not successfully connect");

    Ok(())
}

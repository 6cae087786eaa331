use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

static DB_POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Opens the process-lifetime connection pool on first use and reuses it for
/// every subsequent call. `get_or_try_init` makes the first open single-flight,
/// so concurrent first callers cannot race to create duplicate pools.
pub async fn init_db() -> Result<PgPool, anyhow::Error> {
    let pool = DB_POOL
        .get_or_try_init(|| async {
            let database_url =
                std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

            tracing::info!("Opening database connection pool");

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&database_url)
                .await
                .context("Failed to connect to the database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            Ok::<_, anyhow::Error>(pool)
        })
        .await?;

    Ok(pool.clone())
}

use std::sync::Arc;
use backend::{build_rocket, config::AppConfig, queries::PgStore, routes::AppState};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting survey server");

    let config = AppConfig::from_lookup(|key| secret_store.get(key))
        .map_err(CustomError::new)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(store.clone(), store, config);

    Ok(build_rocket(state).into())
}

//! Student registry server.
//!
//! Run from repo root: `cargo run -p student-server`
//! Settings come from the environment or a `.env` file (see `ServerConfig`).

use student_registry::{
    app,
    ensure_database_exists,
    ensure_students_table,
    AppState,
    PgStudentStore,
    ServerConfig,
    StoreKind,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("student_registry=info,student_server=info,tower_http=info")
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let state = match config.store {
        StoreKind::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            ensure_students_table(&pool, &config.schema).await?;
            AppState::new(PgStudentStore::new(pool, &config.schema))
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory store; records are lost on exit");
            AppState::in_memory()
        }
    };

    let router = app(state, config.body_limit);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

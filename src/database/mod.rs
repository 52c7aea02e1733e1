use anyhow::Result;
use sqlx::{
    Postgres,
    migrate::MigrateDatabase,
    postgres::{PgPool, PgPoolOptions},
};

pub mod models;
pub mod repositories;
pub mod transaction;
pub mod utils;

const MAX_CONNECTIONS: u32 = 10;

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    if !Postgres::database_exists(database_url).await.unwrap_or(false) {
        log::info!("Creating database {}", database_url);
        Postgres::create_database(database_url).await?;
        log::info!("Database created successfully");
    }

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}

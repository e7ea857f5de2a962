pub mod entities;
pub mod models;
pub mod schema;
pub mod services;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Opens the connection pool and makes sure the schema exists.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(max_connections).sqlx_logging(false);

    let db = Database::connect(opt).await?;
    schema::init_schema(&db).await?;
    info!(backend = ?db.get_database_backend(), "Database initialized successfully");
    Ok(db)
}

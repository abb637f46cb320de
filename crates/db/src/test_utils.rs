//! Test utilities for database operations.
//!
//! Provides an in-memory SQLite database with the schema derived from the
//! entities, for integration tests that exercise real queries without a
//! running `PostgreSQL`.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::entities;

/// Connect to a fresh in-memory SQLite database and create all tables.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    // A single pooled connection keeps every query on the same in-memory
    // database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1);

    let db = Database::connect(opt).await?;
    create_schema(&db).await?;
    Ok(db)
}

/// Create every entity's table on the given connection.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    db.execute(backend.build(&schema.create_table_from_entity(entities::User)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(entities::Group)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(entities::Post)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(entities::Comment)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(entities::Follow)))
        .await?;

    Ok(())
}

//! Database connection and schema lifecycle.

use sea_orm::sea_query::{Alias, Table};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    Statement,
};
use sea_orm_migration::{MigratorTrait, SchemaManager};

use super::migrations::Migrator;

/// Tables owned by the identity migrations, children before parents so they
/// can be dropped in order.
const IDENTITY_TABLES: &[&str] = &[
    "role_claims",
    "employee_roles",
    "employee_claims",
    "employee_logins",
    "employee_tokens",
    "employees",
    "roles",
    "persisted_grants",
    "keys",
    "device_codes",
];

/// Bookkeeping table of applied migrations.
const MIGRATIONS_TABLE: &str = "seaql_migrations";

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Initialize database connection and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(database_url).await?;

        // Run pending migrations
        db.run_migrations().await?;
        tracing::info!("Database connected and migrations applied");

        Ok(db)
    }

    /// Connect without running migrations (for CLI commands and seeding,
    /// which owns the migration step).
    pub async fn connect_without_migrations(database_url: &str) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(database_url).await?;
        Ok(Self { connection })
    }

    /// Connect with explicit pool options.
    pub async fn connect_with_options(options: ConnectOptions) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(options).await?;
        Ok(Self { connection })
    }

    /// Wrap an existing connection.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        use sea_orm::{EntityTrait, QueryOrder};
        use sea_orm_migration::seaql_migrations;

        if !SchemaManager::new(&self.connection)
            .has_table("seaql_migrations")
            .await?
        {
            return Ok(Migrator::migrations()
                .iter()
                .map(|m| (m.name().to_string(), false))
                .collect());
        }

        // Get applied migrations from database
        let applied: std::collections::HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        // Map all defined migrations with their applied status
        let migrations: Vec<(String, bool)> = Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect();

        Ok(migrations)
    }

    /// Reset database and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    /// Drop every identity table and the migration history. Returns whether
    /// any identity table was dropped.
    ///
    /// Tables are dropped directly so a schema whose migration history is
    /// missing or out of date is still removed.
    pub async fn ensure_deleted(&self) -> Result<bool, DbErr> {
        let manager = SchemaManager::new(&self.connection);

        let mut dropped = false;
        for table in IDENTITY_TABLES {
            if manager.has_table(*table).await? {
                manager
                    .drop_table(Table::drop().table(Alias::new(*table)).to_owned())
                    .await?;
                dropped = true;
            }
        }

        if manager.has_table(MIGRATIONS_TABLE).await? {
            manager
                .drop_table(Table::drop().table(Alias::new(MIGRATIONS_TABLE)).to_owned())
                .await?;
        }

        Ok(dropped)
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

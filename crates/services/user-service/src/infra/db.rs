//! Database connection and initialization.

use std::collections::HashSet;

use sea_orm::{
    ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
};
use sea_orm_migration::{seaql_migrations, MigratorTrait, SchemaManager};

use common::DatabaseConfig;

use super::migrations::Migrator;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Initialize database connection and run migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(config).await?;

        // Run pending migrations
        Migrator::up(&db.connection, None).await?;
        tracing::info!("Database connected and migrations applied");

        Ok(db)
    }

    /// Connect without running migrations (for CLI commands).
    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .sqlx_logging(false);

        let connection = SeaDatabase::connect(options).await?;
        Ok(Self { connection })
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
        // The bookkeeping table only exists after the first `up`
        let manager = SchemaManager::new(&self.connection);
        let applied: HashSet<String> = if manager.has_table("seaql_migrations").await? {
            seaql_migrations::Entity::find()
                .order_by_asc(seaql_migrations::Column::Version)
                .all(&self.connection)
                .await?
                .into_iter()
                .map(|m| m.version)
                .collect()
        } else {
            HashSet::new()
        };

        let names = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        Ok(mark_applied(names, &applied))
    }

    /// Reset database and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }
}

fn mark_applied(names: Vec<String>, applied: &HashSet<String>) -> Vec<(String, bool)> {
    names
        .into_iter()
        .map(|name| {
            let is_applied = applied.contains(&name);
            (name, is_applied)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_keeps_migration_order() {
        let names = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect::<Vec<_>>();
        let applied = HashSet::from([names[0].clone()]);

        let status = mark_applied(names.clone(), &applied);

        assert_eq!(status.len(), names.len());
        assert_eq!(status[0], (names[0].clone(), true));
        assert!(status[1..].iter().all(|(_, is_applied)| !is_applied));
    }

    #[test]
    fn test_fresh_database_reports_nothing_applied() {
        let status = mark_applied(vec!["m1".to_string(), "m2".to_string()], &HashSet::new());

        assert_eq!(
            status,
            vec![("m1".to_string(), false), ("m2".to_string(), false)]
        );
    }
}

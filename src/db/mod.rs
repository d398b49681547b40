use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::message::{Author, Message};
pub use repositories::user::{NewUser, ProfileUpdate, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite:")
                .trim_start_matches("//")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !path_str.is_empty() && !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn messages(&self) -> repositories::message::MessageRepository {
        repositories::message::MessageRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn follows(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn likes(&self) -> repositories::like::LikeRepository {
        repositories::like::LikeRepository::new(self.conn.clone())
    }
}

/// Which unique column an insert or update collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Other,
}

/// Inspects a repository error for a unique constraint violation.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<UniqueField> {
    let db_err = err.downcast_ref::<DbErr>()?;

    match db_err.sql_err()? {
        SqlErr::UniqueConstraintViolation(msg) => {
            let msg = msg.to_lowercase();
            Some(if msg.contains("username") {
                UniqueField::Username
            } else if msg.contains("email") {
                UniqueField::Email
            } else {
                UniqueField::Other
            })
        }
        _ => None,
    }
}

/// Whether a repository error is a foreign key violation.
#[must_use]
pub fn foreign_key_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::ForeignKeyConstraintViolation(_)))
}

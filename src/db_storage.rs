use crate::errors::{AppError, ResultExt};
use crate::models::{NewUser, UserRecord};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistence for local user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All records in insertion order.
    async fn find_all(&self) -> Result<Vec<UserRecord>, AppError>;

    /// Persist a new record and return it with its assigned id.
    async fn save(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Exact match on cpf. The first record wins if several share a cpf.
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<UserRecord>, AppError>;
}

/// Postgres-backed store over the `users` table.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_all(&self) -> Result<Vec<UserRecord>, AppError> {
        sqlx::query_as::<_, UserRecord>("SELECT id, name, email, cpf FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")
    }

    async fn save(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (name, email, cpf) VALUES ($1, $2, $3)
             RETURNING id, name, email, cpf",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.cpf)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert user")?;

        tracing::info!("Stored user {}", record.id);
        Ok(record)
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<UserRecord>, AppError> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, cpf FROM users WHERE cpf = $1 ORDER BY id LIMIT 1",
        )
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by cpf")
    }
}

/// In-memory store, used when no database is configured and in tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Vec<UserRecord>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_all(&self) -> Result<Vec<UserRecord>, AppError> {
        Ok(self.users.read().await.clone())
    }

    async fn save(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self.users.write().await;

        // Records are never deleted, so ids stay dense.
        let record = UserRecord {
            id: users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            cpf: user.cpf,
        };
        users.push(record.clone());

        tracing::info!("Stored user {}", record.id);
        Ok(record)
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.cpf == cpf).cloned())
    }
}

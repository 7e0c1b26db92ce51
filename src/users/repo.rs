use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    error::{UserError, UserResult},
    repo_types::{User, UserRow},
};

/// Sole gateway to the `users` table. Every call is exactly one round trip.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts all columns; `user.password` must already be hashed.
    async fn create(&self, user: &User) -> UserResult<()>;

    /// Every row in store order; an empty table yields an empty vec.
    async fn list_all(&self) -> UserResult<Vec<User>>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<User>;

    /// Used for the uniqueness pre-check; `None` when no row has this email.
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Full-row update by id. Zero rows affected is `NotFound`.
    async fn update(&self, user: &User) -> UserResult<()>;

    /// Zero rows affected is `NotFound`.
    async fn delete(&self, id: Uuid) -> UserResult<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
    deadline: Duration,
}

impl PgUserRepository {
    pub fn new(db: PgPool, deadline: Duration) -> Self {
        Self { db, deadline }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> UserResult<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db);

        with_deadline(self.deadline, "create user", user.id, query)
            .await
            .map_err(|e| email_conflict(e, &user.email))?;

        info!(email = %user.email, role = %user.role, "user inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> UserResult<Vec<User>> {
        let query = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, role, is_active, created_at, updated_at
            FROM users
            "#,
        )
        .fetch_all(&self.db);

        let rows = with_deadline(self.deadline, "list users", "all", query).await?;
        rows.into_iter()
            .map(|row| decode_row("list users", row))
            .collect()
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<User> {
        let query = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, role, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db);

        match with_deadline(self.deadline, "get user", id, query).await? {
            Some(row) => decode_row("get user", row),
            None => Err(UserError::NotFound(id)),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let query = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, role, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db);

        with_deadline(self.deadline, "get user by email", email, query)
            .await?
            .map(|row| decode_row("get user by email", row))
            .transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> UserResult<()> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET name = $1, email = $2, password = $3, role = $4, is_active = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(user.id)
        .execute(&self.db);

        let res = with_deadline(self.deadline, "update user", user.id, query)
            .await
            .map_err(|e| email_conflict(e, &user.email))?;

        if res.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id));
        }
        info!("user updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let query = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db);

        let res = with_deadline(self.deadline, "delete user", id, query).await?;
        if res.rows_affected() == 0 {
            return Err(UserError::NotFound(id));
        }
        info!("user deleted");
        Ok(())
    }
}

/// Runs one store round trip under `deadline`. On expiry the future is dropped,
/// which aborts the in-flight query.
pub async fn with_deadline<T, F>(
    deadline: Duration,
    op: &'static str,
    target: impl ToString,
    fut: F,
) -> UserResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let target = target.to_string();
            error!(error = %e, op, %target, "storage error");
            Err(UserError::storage(op, target, e))
        }
        Err(_) => {
            let target = target.to_string();
            warn!(op, %target, ?deadline, "storage deadline exceeded");
            Err(UserError::Timeout { op, target })
        }
    }
}

/// The unique index on `email` backs the application-side uniqueness check.
fn email_conflict(err: UserError, email: &str) -> UserError {
    match err {
        UserError::Storage {
            source: sqlx::Error::Database(ref db),
            ..
        } if db.is_unique_violation() => {
            warn!(%email, "unique index rejected duplicate email");
            UserError::EmailTaken(email.to_string())
        }
        other => other,
    }
}

fn decode_row(op: &'static str, row: UserRow) -> UserResult<User> {
    let id = row.id;
    User::try_from(row).map_err(|e| {
        error!(error = %e, user_id = %id, "stored row failed to decode");
        UserError::storage(op, id, sqlx::Error::Decode(Box::new(e)))
    })
}

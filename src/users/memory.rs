//! In-memory [`UserRepository`] for tests. Mirrors the Postgres semantics the
//! use cases rely on: zero rows affected is `NotFound`, and the unique email
//! index rejects duplicates.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    error::{UserError, UserResult},
    repo::UserRepository,
    repo_types::User,
};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Round trips that would have read from the store.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Round trips that would have written to the store, failed or not.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> UserResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailTaken(user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_all(&self) -> UserResult<Vec<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<User> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(UserError::NotFound(id))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> UserResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::EmailTaken(user.email.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(UserError::NotFound(id)),
        }
    }
}

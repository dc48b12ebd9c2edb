//! In-memory stores
//!
//! Each store keeps its rows in a `BTreeMap` keyed by ID behind a
//! `tokio::sync::RwLock`, so listings come back in insertion order just like
//! `ORDER BY id` does in PostgreSQL.

use super::{StoreResult, TareaStore, TokenStore, UserStore, USERS_EMAIL_UNIQUE};
use crate::auth::token::{generate_token, hash_token, validate_token_format};
use crate::error::StoreError;
use crate::models::tarea::{CreateTarea, Tarea, UpdateTarea};
use crate::models::user::{CreateUser, UpdateUser, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    table: RwLock<Table<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_in_use(table: &Table<User>, email: &str, except: Option<i64>) -> bool {
    table
        .rows
        .values()
        .any(|user| user.email == email && Some(user.id) != except)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> StoreResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|user| user.email == email).cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool> {
        Ok(email_in_use(&*self.table.read().await, email, except))
    }

    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut table = self.table.write().await;
        if email_in_use(&table, &data.email, None) {
            return Err(StoreError::UniqueViolation(USERS_EMAIL_UNIQUE.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: table.allocate_id(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if email_in_use(&table, &data.email, Some(id)) {
            return Err(StoreError::UniqueViolation(USERS_EMAIL_UNIQUE.to_string()));
        }

        let user = table.rows.get_mut(&id).map(|user| {
            user.name = data.name;
            user.email = data.email;
            user.password_hash = data.password_hash;
            user.updated_at = Utc::now();
            user.clone()
        });
        Ok(user)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryTareaStore {
    table: RwLock<Table<Tarea>>,
}

impl InMemoryTareaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TareaStore for InMemoryTareaStore {
    async fn list(&self) -> StoreResult<Vec<Tarea>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn list_by_users(&self, user_ids: &[i64]) -> StoreResult<Vec<Tarea>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|tarea| user_ids.contains(&tarea.user_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Tarea>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, data: CreateTarea) -> StoreResult<Tarea> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let tarea = Tarea {
            id: table.allocate_id(),
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            creation_date: now,
            due_date: Some(data.due_date),
            status: data.status,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(tarea.id, tarea.clone());
        Ok(tarea)
    }

    async fn update(&self, id: i64, data: UpdateTarea) -> StoreResult<Option<Tarea>> {
        let mut table = self.table.write().await;
        let tarea = table.rows.get_mut(&id).map(|tarea| {
            tarea.user_id = data.user_id;
            tarea.title = data.title;
            tarea.description = data.description;
            tarea.due_date = Some(data.due_date);
            tarea.status = data.status;
            tarea.updated_at = Utc::now();
            tarea.clone()
        });
        Ok(tarea)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

/// Token digests mapped to their owner
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, i64>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tokens held for `user_id`
    pub async fn count_for_user(&self, user_id: i64) -> usize {
        self.tokens
            .read()
            .await
            .values()
            .filter(|owner| **owner == user_id)
            .count()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn issue(&self, user_id: i64) -> StoreResult<String> {
        let (token, digest) = generate_token();
        self.tokens.write().await.insert(digest, user_id);
        Ok(token)
    }

    async fn validate(&self, token: &str) -> StoreResult<Option<i64>> {
        if !validate_token_format(token) {
            return Ok(None);
        }
        Ok(self.tokens.read().await.get(&hash_token(token)).copied())
    }

    async fn revoke_all(&self, user_id: i64) -> StoreResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, owner| *owner != user_id);
        Ok((before - tokens.len()) as u64)
    }
}

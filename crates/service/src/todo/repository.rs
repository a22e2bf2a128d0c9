use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::domain::{NewTodo, TodoChanges, TodoQuery};
use crate::errors::ServiceError;

/// Persistence primitives the todo service relies on: lookups keyed on id,
/// equality/range filters, insert, update and delete.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn list(&self, query: &TodoQuery) -> Result<Vec<models::todo::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<models::todo::Model>, ServiceError>;
    async fn create(&self, input: &NewTodo) -> Result<models::todo::Model, ServiceError>;
    async fn update(&self, id: i32, changes: &TodoChanges) -> Result<models::todo::Model, ServiceError>;
    async fn delete(&self, id: i32) -> Result<Option<models::todo::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmTodoRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmTodoRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl TodoRepository for SeaOrmTodoRepository {
    async fn list(&self, query: &TodoQuery) -> Result<Vec<models::todo::Model>, ServiceError> {
        crate::db::todo_service::list_todos(&self.db, query).await
    }

    async fn get(&self, id: i32) -> Result<Option<models::todo::Model>, ServiceError> {
        crate::db::todo_service::get_todo(&self.db, id).await
    }

    async fn create(&self, input: &NewTodo) -> Result<models::todo::Model, ServiceError> {
        crate::db::todo_service::create_todo(&self.db, input).await
    }

    async fn update(&self, id: i32, changes: &TodoChanges) -> Result<models::todo::Model, ServiceError> {
        crate::db::todo_service::update_todo(&self.db, id, changes).await
    }

    async fn delete(&self, id: i32) -> Result<Option<models::todo::Model>, ServiceError> {
        crate::db::todo_service::delete_todo(&self.db, id).await
    }
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockTodoRepository {
        rows: Mutex<BTreeMap<i32, models::todo::Model>>,
        next_id: Mutex<i32>,
    }

    fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, ServiceError> {
        m.lock().map_err(|_| ServiceError::Db("mock store poisoned".into()))
    }

    #[async_trait]
    impl TodoRepository for MockTodoRepository {
        async fn list(&self, query: &TodoQuery) -> Result<Vec<models::todo::Model>, ServiceError> {
            let rows = lock(&self.rows)?;
            Ok(rows
                .values()
                .filter(|m| query.completed.map_or(true, |c| m.completed == c))
                .filter(|m| query.deadline.map_or(true, |b| b.matches(m.deadline_at)))
                .cloned()
                .collect())
        }

        async fn get(&self, id: i32) -> Result<Option<models::todo::Model>, ServiceError> {
            Ok(lock(&self.rows)?.get(&id).cloned())
        }

        async fn create(&self, input: &NewTodo) -> Result<models::todo::Model, ServiceError> {
            models::todo::validate_title(&input.title)?;
            let mut next = lock(&self.next_id)?;
            *next += 1;
            let now = common::time::now();
            let row = models::todo::Model {
                id: *next,
                title: input.title.clone(),
                description: input.description.clone(),
                completed: input.completed,
                deadline_at: input.deadline_at,
                created_at: now,
                updated_at: now,
            };
            lock(&self.rows)?.insert(row.id, row.clone());
            Ok(row)
        }

        async fn update(&self, id: i32, changes: &TodoChanges) -> Result<models::todo::Model, ServiceError> {
            let mut rows = lock(&self.rows)?;
            let row = rows.get_mut(&id).ok_or_else(|| ServiceError::not_found("Todo"))?;
            if let Some(t) = &changes.title { models::todo::validate_title(t)?; row.title = t.clone(); }
            if let Some(d) = &changes.description { row.description = d.clone(); }
            if let Some(c) = changes.completed { row.completed = c; }
            if let Some(dl) = changes.deadline_at { row.deadline_at = dl; }
            row.updated_at = common::time::now();
            Ok(row.clone())
        }

        async fn delete(&self, id: i32) -> Result<Option<models::todo::Model>, ServiceError> {
            Ok(lock(&self.rows)?.remove(&id))
        }
    }
}

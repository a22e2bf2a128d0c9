use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{NewTodo, TodoChanges, TodoFilter, TodoView};
use super::repository::TodoRepository;
use crate::errors::ServiceError;

/// Todo business service independent of web framework.
/// Every operation returns client-facing projections.
pub struct TodoService<R: TodoRepository> {
    repo: Arc<R>,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// List todos, narrowed by completion flag and deadline window.
    ///
    /// # Examples
    /// ```
    /// use service::todo::{TodoService, repository::mock::MockTodoRepository};
    /// use service::todo::domain::{NewTodo, TodoFilter};
    /// use std::sync::Arc;
    /// let svc = TodoService::new(Arc::new(MockTodoRepository::default()));
    /// let input = NewTodo { title: "Buy milk".into(), description: String::new(), completed: true, deadline_at: None };
    /// tokio_test::block_on(svc.create(input)).unwrap();
    /// let done = tokio_test::block_on(svc.list(TodoFilter { completed: Some(true), window_days: None })).unwrap();
    /// assert_eq!(done.len(), 1);
    /// ```
    #[instrument(skip(self))]
    pub async fn list(&self, filter: TodoFilter) -> Result<Vec<TodoView>, ServiceError> {
        let query = filter.resolve(common::time::now());
        let rows = self.repo.list(&query).await?;
        debug!(count = rows.len(), "todos listed");
        Ok(rows.into_iter().map(TodoView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<TodoView, ServiceError> {
        self.repo
            .get(id)
            .await?
            .map(TodoView::from)
            .ok_or_else(|| ServiceError::not_found("Todo"))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: NewTodo) -> Result<TodoView, ServiceError> {
        let created = self.repo.create(&input).await?;
        info!(id = created.id, "todo_created");
        Ok(created.into())
    }

    /// Overwrite only the fields present in `changes`.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: TodoChanges) -> Result<TodoView, ServiceError> {
        let updated = self.repo.update(id, &changes).await?;
        info!(id = updated.id, "todo_updated");
        Ok(updated.into())
    }

    /// Delete a todo. A missing id is not an error and yields `None`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<Option<TodoView>, ServiceError> {
        let deleted = self.repo.delete(id).await?;
        match &deleted {
            Some(_) => info!(id, "todo_deleted"),
            None => debug!(id, "delete of missing todo ignored"),
        }
        Ok(deleted.map(TodoView::from))
    }
}

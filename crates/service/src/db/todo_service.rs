use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use models::todo::{self, Entity as TodoEntity};
use crate::errors::ServiceError;
use crate::todo::domain::{DeadlineBound, NewTodo, TodoChanges, TodoQuery};

/// List todos matching the query, ordered by id.
pub async fn list_todos(db: &DatabaseConnection, query: &TodoQuery) -> Result<Vec<todo::Model>, ServiceError> {
    let mut finder = TodoEntity::find();
    if let Some(done) = query.completed { finder = finder.filter(todo::Column::Completed.eq(done)); }
    match query.deadline {
        Some(DeadlineBound::Until(until)) => { finder = finder.filter(todo::Column::DeadlineAt.lte(until)); }
        Some(DeadlineBound::AnyDeadline) => { finder = finder.filter(todo::Column::DeadlineAt.is_not_null()); }
        Some(DeadlineBound::Nothing) => return Ok(Vec::new()),
        None => {}
    }
    let rows = finder.order_by_asc(todo::Column::Id).all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows)
}

/// Get a todo by id.
pub async fn get_todo(db: &DatabaseConnection, id: i32) -> Result<Option<todo::Model>, ServiceError> {
    let found = TodoEntity::find_by_id(id).one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found)
}

/// Insert a validated todo.
pub async fn create_todo(db: &DatabaseConnection, input: &NewTodo) -> Result<todo::Model, ServiceError> {
    let created = todo::create(db, &input.title, &input.description, input.completed, input.deadline_at).await?;
    Ok(created)
}

/// Overwrite the given fields and refresh `updated_at`.
pub async fn update_todo(db: &DatabaseConnection, id: i32, changes: &TodoChanges) -> Result<todo::Model, ServiceError> {
    let current = TodoEntity::find_by_id(id).one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let Some(existing) = current else { return Err(ServiceError::not_found("Todo")); };
    let mut am: todo::ActiveModel = existing.into();
    if let Some(t) = &changes.title { todo::validate_title(t)?; am.title = Set(t.clone()); }
    if let Some(d) = &changes.description { am.description = Set(d.clone()); }
    if let Some(c) = changes.completed { am.completed = Set(c); }
    if let Some(dl) = changes.deadline_at { am.deadline_at = Set(dl); }
    am.updated_at = Set(common::time::now());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Delete a todo; returns the removed row, or `None` if it did not exist.
pub async fn delete_todo(db: &DatabaseConnection, id: i32) -> Result<Option<todo::Model>, ServiceError> {
    let Some(existing) = get_todo(db, id).await? else { return Ok(None); };
    existing.clone().delete(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(Some(existing))
}

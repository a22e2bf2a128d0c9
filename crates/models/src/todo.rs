use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub completed: bool,
    pub deadline_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.is_empty() {
        return Err(errors::ModelError::Validation("title must not be empty".into()));
    }
    Ok(())
}

/// Insert a new todo. `created_at` and `updated_at` come from one clock reading.
pub async fn create(
    db: &DatabaseConnection,
    title: &str,
    description: &str,
    completed: bool,
    deadline_at: Option<DateTimeWithTimeZone>,
) -> Result<Model, errors::ModelError> {
    validate_title(title)?;

    let now = common::time::now();
    let am = ActiveModel {
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        completed: Set(completed),
        deadline_at: Set(deadline_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

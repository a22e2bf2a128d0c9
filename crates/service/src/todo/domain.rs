//! Todo inputs, list filters and the JSON projection.
//!
//! Request bodies arrive as raw JSON maps. Key-set checks run on the map
//! first; only then are the individual fields decoded into typed values.

use common::time::{self, Timestamp};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Keys a create or update body may carry.
pub const ALLOWED_FIELDS: [&str; 4] = ["title", "description", "completed", "deadline_at"];

/// Tokens accepted as `true` by the `completed` list filter (case-insensitive).
const TRUTHY: [&str; 3] = ["true", "1", "t"];

/// Validated input for creating a todo.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline_at: Option<Timestamp>,
}

/// Fields to overwrite on an existing todo. `None` leaves a field unchanged;
/// `deadline_at: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub deadline_at: Option<Option<Timestamp>>,
}

/// List filters as supplied by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub window_days: Option<i64>,
}

/// Deadline predicate of a windowed list. Todos without a deadline never
/// match any variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeadlineBound {
    /// `deadline_at <= cutoff`.
    Until(Timestamp),
    /// Cutoff lies past every storable instant: any set deadline matches.
    AnyDeadline,
    /// Cutoff lies before every storable instant: nothing matches.
    Nothing,
}

impl DeadlineBound {
    pub fn matches(&self, deadline_at: Option<Timestamp>) -> bool {
        match (self, deadline_at) {
            (_, None) | (Self::Nothing, _) => false,
            (Self::AnyDeadline, Some(_)) => true,
            (Self::Until(cutoff), Some(d)) => d <= *cutoff,
        }
    }
}

/// Store-level predicates a list resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TodoQuery {
    pub completed: Option<bool>,
    pub deadline: Option<DeadlineBound>,
}

/// JSON projection of a todo returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<models::todo::Model> for TodoView {
    fn from(m: models::todo::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            completed: m.completed,
            deadline_at: m.deadline_at.as_ref().map(time::format_iso8601),
            created_at: time::format_iso8601(&m.created_at),
            updated_at: time::format_iso8601(&m.updated_at),
        }
    }
}

pub fn parse_truthy(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    TRUTHY.contains(&lower.as_str())
}

impl TodoFilter {
    /// Build from raw query-string values. A `window` that is not an integer
    /// is ignored.
    pub fn from_query(completed: Option<&str>, window: Option<&str>) -> Self {
        Self {
            completed: completed.map(parse_truthy),
            window_days: window.and_then(|w| w.trim().parse::<i64>().ok()),
        }
    }

    /// Resolve the day window against `now`. A cutoff beyond the storable
    /// years still requires a deadline to be set.
    pub fn resolve(&self, now: Timestamp) -> TodoQuery {
        let deadline = self.window_days.map(|days| match time::window_cutoff(now, days) {
            Some(cutoff) => DeadlineBound::Until(cutoff),
            None if days > 0 => DeadlineBound::AnyDeadline,
            None => DeadlineBound::Nothing,
        });
        TodoQuery { completed: self.completed, deadline }
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ServiceError> {
    body.as_object()
        .ok_or_else(|| ServiceError::Validation("Request body must be a JSON object".into()))
}

fn unexpected_keys(map: &Map<String, Value>) -> Vec<&str> {
    let mut extra: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|k| !ALLOWED_FIELDS.contains(k))
        .collect();
    extra.sort_unstable();
    extra
}

/// Decode one field; absent and `null` both yield `None`.
fn field<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Result<Option<T>, ServiceError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => T::deserialize(v)
            .map(Some)
            .map_err(|e| ServiceError::Validation(format!("Invalid value for field {name}: {e}"))),
    }
}

fn deadline(raw: &str) -> Result<Timestamp, ServiceError> {
    time::parse_iso8601(raw).map_err(|e| ServiceError::Validation(format!("Invalid value for field deadline_at: {e}")))
}

impl NewTodo {
    /// Validate a create body: unexpected keys first, then the title, then
    /// the types of the remaining fields.
    pub fn from_json(body: &Value) -> Result<Self, ServiceError> {
        let map = as_object(body)?;

        let extra = unexpected_keys(map);
        if !extra.is_empty() {
            return Err(ServiceError::Validation(format!("Extra fields provided: {}", extra.join(", "))));
        }

        let missing_title = match map.get("title") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };
        if missing_title {
            return Err(ServiceError::Validation("Missing required field: title".into()));
        }

        let title: String = field(map, "title")?.unwrap_or_default();
        let description: String = field(map, "description")?.unwrap_or_default();
        let completed: bool = field(map, "completed")?.unwrap_or(false);
        let deadline_at = field::<String>(map, "deadline_at")?
            .map(|raw| deadline(&raw))
            .transpose()?;

        Ok(Self { title, description, completed, deadline_at })
    }
}

impl TodoChanges {
    /// Validate an update body. Any key outside the allowed set rejects the
    /// whole request without naming the key.
    pub fn from_json(body: &Value) -> Result<Self, ServiceError> {
        let map = as_object(body)?;

        if !unexpected_keys(map).is_empty() {
            return Err(ServiceError::Validation("Unexpected fields in request".into()));
        }

        let title: Option<String> = field(map, "title")?;
        if let Some(t) = &title {
            models::todo::validate_title(t)
                .map_err(|_| ServiceError::Validation("Field title must not be empty".into()))?;
        }
        let description = field(map, "description")?;
        let completed = field(map, "completed")?;
        let deadline_at = match map.get("deadline_at") {
            None => None,
            Some(Value::Null) => Some(None),
            Some(_) => {
                let raw: Option<String> = field(map, "deadline_at")?;
                Some(raw.map(|r| deadline(&r)).transpose()?)
            }
        };

        Ok(Self { title, description, completed, deadline_at })
    }
}

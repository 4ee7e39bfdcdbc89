use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status string carried by every successful envelope, including creates.
pub const SUCCESS: &str = "Success";
pub const NOT_FOUND: &str = "Not Found";
pub const BAD_REQUEST: &str = "Bad Request";
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// Priority assigned to a todo item created without one.
pub const DEFAULT_PRIORITY: &str = "very-high";

/// Upper bound on rows returned by the activity-group list queries.
pub const LIST_CAP: i64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityGroup {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Child items. Only populated on single-group reads; `None` is omitted
    /// from the JSON entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_items: Option<Vec<TodoItem>>,
}

impl ActivityGroup {
    pub fn without_items(mut self) -> Self {
        self.todo_items = None;
        self
    }
}

/// An activity group that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityGroup {
    pub title: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoItem {
    pub id: i64,
    pub activity_group_id: i64,
    pub title: String,
    pub is_active: bool,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTodoItem {
    pub activity_group_id: i64,
    pub title: String,
    pub is_active: bool,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// API view types

/// Placeholder payload for envelopes that carry no record. Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty {}

/// The `{status, message, data}` wrapper returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: SUCCESS.to_string(),
            message: SUCCESS.to_string(),
            data,
        }
    }
}

impl Envelope<Empty> {
    pub fn failure(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            data: Empty {},
        }
    }
}

/// Result of a service operation, before it is mapped onto HTTP.
///
/// Business-rule failures are values of this type, not errors: the `Err`
/// side of a service call is reserved for persistence failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Same envelope as `Success`, reported with HTTP 201.
    Created(T),
    BadRequest(&'static str),
    NotFound(String),
}

impl<T> Outcome<T> {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success(_) | Self::Created(_) => SUCCESS,
            Self::BadRequest(_) => BAD_REQUEST,
            Self::NotFound(_) => NOT_FOUND,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Created(_))
    }

    /// The payload, if the operation succeeded.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) | Self::Created(data) => Some(data),
            Self::BadRequest(_) | Self::NotFound(_) => None,
        }
    }
}

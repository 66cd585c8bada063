//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's wire schema but are defined
//! independently; integration tests catch any drift between the two crates.
//! Todos are server-owned: the client never synthesizes a `TodoId`, it only
//! carries ids it was handed back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque server-assigned identifier of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
}

/// Metadata attached to a list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListMeta {
    pub total: u64,
}

/// Response of the list endpoint: the todos in server order plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoList {
    pub data: Vec<Todo>,
    pub meta: ListMeta,
}

impl TodoList {
    pub fn total(&self) -> u64 {
        self.meta.total
    }

    /// Whether `meta.total` agrees with the number of returned items.
    ///
    /// A mismatch is display data only and never an error.
    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.meta.total).is_ok_and(|total| total == self.data.len())
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
}

impl CreateTodo {
    /// Property names the server may key field-level errors on.
    pub const FIELDS: &'static [&'static str] = &["title"];

    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub const FIELDS: &'static [&'static str] = &["title", "completed"];

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Filters for the list endpoint. Also the cache key of a list query, so two
/// queries with the same filters share one cached result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ListQuery {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }

    /// Query parameters in wire order. Absent filters stay `None` and are
    /// dropped by the request builder.
    pub fn params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![("completed", self.completed.map(|c| c.to_string()))]
    }
}

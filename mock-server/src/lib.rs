use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListEnvelope {
    pub data: Vec<Todo>,
    pub meta: Meta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// A failed request, rendered as the error envelope.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<BTreeMap<String, String>>,
}

impl ApiFailure {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: "Todo not found".to_string(),
            fields: None,
        }
    }

    fn title_required() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), "Title is required".to_string());
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "VALIDATION_ERROR",
            message: "Invalid request body".to_string(),
            fields: Some(fields),
        }
    }

    fn rejected(status: StatusCode, message: String) -> Self {
        let code = if status == StatusCode::UNPROCESSABLE_ENTITY {
            "VALIDATION_ERROR"
        } else {
            "BAD_REQUEST"
        };
        Self {
            status,
            code,
            message,
            fields: None,
        }
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiFailure {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(code = self.code, %request_id, "request failed");
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message,
                request_id,
                fields: self.fields,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Todos in insertion order.
pub type Db = Arc<RwLock<Vec<Todo>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(
    State(db): State<Db>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListEnvelope>, ApiFailure> {
    let Query(query) = query?;
    let todos = db.read().await;
    let data: Vec<Todo> = todos
        .iter()
        .filter(|todo| query.completed.map_or(true, |c| todo.completed == c))
        .cloned()
        .collect();
    let total = data.len();
    Ok(Json(ListEnvelope {
        data,
        meta: Meta { total },
    }))
}

async fn create_todo(
    State(db): State<Db>,
    input: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<Todo>>), ApiFailure> {
    let Json(input) = input?;
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ApiFailure::title_required());
    }
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        completed: false,
    };
    db.write().await.push(todo.clone());
    Ok((StatusCode::CREATED, Json(DataEnvelope { data: todo })))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<DataEnvelope<Todo>>, ApiFailure> {
    let Json(input) = input?;
    let title = match input.title {
        Some(title) if title.trim().is_empty() => return Err(ApiFailure::title_required()),
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };

    let mut todos = db.write().await;
    let todo = todos
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or_else(ApiFailure::not_found)?;
    if let Some(title) = title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(DataEnvelope { data: todo.clone() }))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<Todo>>, ApiFailure> {
    let mut todos = db.write().await;
    let index = todos
        .iter()
        .position(|todo| todo.id == id)
        .ok_or_else(ApiFailure::not_found)?;
    Ok(Json(DataEnvelope {
        data: todos.remove(index),
    }))
}

//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a base URL and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Parsing runs failed responses through the error normalizer and successful
//! ones through the schema validators, so a parse result is either validated
//! data or a typed `ClientError`.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize;
use crate::schema::{self, Shape};
use crate::types::{CreateTodo, ListQuery, Todo, TodoId, TodoList, UpdateTodo};

const TODOS_PATH: &str = "/api/todos";

/// Synchronous, stateless client for the todo API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: Url,
}

impl TodoClient {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn parse(base_url: &str) -> Result<Self, url::ParseError> {
        Url::parse(base_url).map(Self::new)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request for `path`, resolved against the base URL's origin.
    ///
    /// Parameters whose value is `None` are left out of the query string.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, Option<String>)],
        body: Option<Value>,
    ) -> Result<HttpRequest, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Request(format!("cannot resolve {path}: {e}")))?;

        let present: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (*key, value)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }

        let request = HttpRequest {
            method,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.map(|body| body.to_string()),
        };
        tracing::debug!(method = %request.method, url = %request.url, "built request");
        Ok(request)
    }

    pub fn build_list_todos(&self, query: &ListQuery) -> Result<HttpRequest, ClientError> {
        self.build_request(HttpMethod::Get, TODOS_PATH, &query.params(), None)
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ClientError> {
        self.build_request(HttpMethod::Post, TODOS_PATH, &[], Some(encode(input)?))
    }

    pub fn build_update_todo(
        &self,
        id: &TodoId,
        input: &UpdateTodo,
    ) -> Result<HttpRequest, ClientError> {
        self.build_request(HttpMethod::Patch, &todo_path(id), &[], Some(encode(input)?))
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> Result<HttpRequest, ClientError> {
        self.build_request(HttpMethod::Delete, &todo_path(id), &[], None)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoList, ClientError> {
        normalize::ensure_success(&response)?;
        let value = schema::parse_json(Shape::TodoList, &response.body)?;
        let list = schema::validate_todo_list(value)?;
        if !list.is_consistent() {
            tracing::debug!(
                total = list.meta.total,
                returned = list.data.len(),
                "list total differs from returned item count"
            );
        }
        Ok(list)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ClientError> {
        parse_todo(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ClientError> {
        parse_todo(response)
    }

    /// The server answers a delete with the removed record.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Todo, ClientError> {
        parse_todo(response)
    }
}

fn todo_path(id: &TodoId) -> String {
    format!("{TODOS_PATH}/{}", urlencoding::encode(id.as_str()))
}

fn encode<T: Serialize>(input: &T) -> Result<Value, ClientError> {
    serde_json::to_value(input).map_err(|e| ClientError::Request(format!("cannot encode body: {e}")))
}

fn parse_todo(response: HttpResponse) -> Result<Todo, ClientError> {
    normalize::ensure_success(&response)?;
    let value = schema::parse_json(Shape::Todo, &response.body)?;
    Ok(schema::validate_todo_envelope(value)?)
}

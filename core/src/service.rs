//! Named todo operations over the request builder, transport and cache.
//!
//! # Design
//! `TodoService` owns the explicit per-process state: the query cache, the
//! transport and the notification sink. Each operation builds a request,
//! executes it, and parses the response into validated data or a
//! `ClientError`. Lists go through the cache and the retry policy; mutations
//! run once and, on success, invalidate every cached list. Mutations are not
//! serialized against reads: a list already in flight when a mutation lands
//! may still return the older snapshot to its callers, but that snapshot is
//! not cached.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryPolicy};
use crate::client::TodoClient;
use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{NotificationKind, NotificationSink};
use crate::transport::Transport;
use crate::types::{CreateTodo, ListQuery, Todo, TodoId, TodoList, UpdateTodo};

pub struct TodoService {
    client: TodoClient,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn NotificationSink>,
    cache: QueryCache,
    policy: QueryPolicy,
}

/// Outcome reporting for one mutation kind.
struct Mutation {
    name: &'static str,
    success: Option<&'static str>,
    failure: &'static str,
    fields: &'static [&'static str],
}

const CREATE: Mutation = Mutation {
    name: "create",
    success: Some("Todo created"),
    failure: "Failed to create todo",
    fields: CreateTodo::FIELDS,
};

const UPDATE: Mutation = Mutation {
    name: "update",
    success: None,
    failure: "Failed to update todo",
    fields: UpdateTodo::FIELDS,
};

const DELETE: Mutation = Mutation {
    name: "delete",
    success: Some("Todo deleted"),
    failure: "Failed to delete todo",
    fields: &[],
};

const LIST_FAILURE: &str = "Failed to load todos";

impl TodoService {
    pub fn new(
        client: TodoClient,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn NotificationSink>,
        policy: QueryPolicy,
    ) -> Self {
        let cache = QueryCache::new(&policy);
        Self {
            client,
            transport,
            notifier,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn policy(&self) -> &QueryPolicy {
        &self.policy
    }

    /// Fetch the todos matching `query`, served from cache while fresh.
    pub async fn list(&self, query: &ListQuery) -> Result<Arc<TodoList>, ClientError> {
        // Runs once per shared fetch, so callers waiting on it are notified once.
        let fetch = async {
            let result = self.fetch_list_with_retry(query).await;
            if let Err(err) = &result {
                self.notifier
                    .notify(NotificationKind::Error, &err.message_or(LIST_FAILURE));
            }
            result
        };
        self.cache.get_or_fetch(query.clone(), fetch).await
    }

    pub async fn create(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        let result = async {
            let request = self.client.build_create_todo(input)?;
            let response = self.execute(request).await?;
            self.client.parse_create_todo(response)
        }
        .await;
        self.settle(&CREATE, result)
    }

    /// Apply a partial update. An empty partial still issues the PATCH.
    pub async fn update(&self, id: &TodoId, input: &UpdateTodo) -> Result<Todo, ClientError> {
        let result = async {
            let request = self.client.build_update_todo(id, input)?;
            let response = self.execute(request).await?;
            self.client.parse_update_todo(response)
        }
        .await;
        self.settle(&UPDATE, result)
    }

    pub async fn delete(&self, id: &TodoId) -> Result<Todo, ClientError> {
        let result = async {
            let request = self.client.build_delete_todo(id)?;
            let response = self.execute(request).await?;
            self.client.parse_delete_todo(response)
        }
        .await;
        self.settle(&DELETE, result)
    }

    async fn fetch_list_with_retry(&self, query: &ListQuery) -> Result<TodoList, ClientError> {
        let mut attempt = 0;
        loop {
            match self.fetch_list(query).await {
                Ok(list) => return Ok(list),
                Err(err) if err.is_retryable() && attempt < self.policy.retry => {
                    attempt += 1;
                    tracing::warn!(error = %err, attempt, "list fetch failed, retrying");
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_list(&self, query: &ListQuery) -> Result<TodoList, ClientError> {
        let request = self.client.build_list_todos(query)?;
        let response = self.execute(request).await?;
        self.client.parse_list_todos(response)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        Ok(self.transport.execute(request).await?)
    }

    fn settle<T>(&self, mutation: &Mutation, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match &result {
            Ok(_) => {
                self.cache.invalidate_lists();
                if let Some(message) = mutation.success {
                    self.notifier.notify(NotificationKind::Success, message);
                }
            }
            Err(err) => {
                tracing::debug!(
                    operation = mutation.name,
                    error = %err,
                    request_id = err.request_id(),
                    "mutation failed"
                );
                if let Some(fields) = err.fields() {
                    for key in fields.keys().filter(|key| !mutation.fields.contains(&key.as_str())) {
                        tracing::warn!(operation = mutation.name, field = %key, "error names an unknown input field");
                    }
                }
                self.notifier
                    .notify(NotificationKind::Error, &err.message_or(mutation.failure));
            }
        }
        result
    }
}

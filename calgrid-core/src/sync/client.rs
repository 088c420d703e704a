//! HTTP client for the calendar API.

use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{CalgridError, CalgridResult};
use crate::model::{Calendar, Event, EventPayload, Task, TaskPayload, User};
use crate::sync::Remote;

/// `reqwest`-backed implementation of [`Remote`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_host())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> CalgridResult<Response> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CalgridError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CalgridResult<T> {
        let resp = self.send::<()>(Method::GET, path, None).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_event(&self, method: Method, path: &str, event: &Event) -> CalgridResult<Event> {
        let resp = self.send(method, path, Some(event)).await?;
        let bytes = resp.bytes().await?;
        let payload: EventPayload = serde_json::from_slice(&bytes)?;
        Event::try_from(payload)
    }
}

impl Remote for ApiClient {
    /// GET /events
    async fn list_events(&self) -> CalgridResult<Vec<Event>> {
        let payloads: Vec<EventPayload> = self.get_json("/events").await?;
        payloads.into_iter().map(Event::try_from).collect()
    }

    /// GET /calendars
    async fn list_calendars(&self) -> CalgridResult<Vec<Calendar>> {
        self.get_json("/calendars").await
    }

    /// GET /tasks
    async fn list_tasks(&self) -> CalgridResult<Vec<Task>> {
        let payloads: Vec<TaskPayload> = self.get_json("/tasks").await?;
        payloads.into_iter().map(Task::try_from).collect()
    }

    /// GET /users
    async fn list_users(&self) -> CalgridResult<Vec<User>> {
        self.get_json("/users").await
    }

    /// POST /events
    async fn create_event(&self, event: &Event) -> CalgridResult<Event> {
        self.send_event(Method::POST, "/events", event).await
    }

    /// PUT /events/:id
    async fn update_event(&self, event: &Event) -> CalgridResult<Event> {
        self.send_event(Method::PUT, &format!("/events/{}", event.id), event)
            .await
    }

    /// DELETE /events/:id
    async fn delete_event(&self, id: &str) -> CalgridResult<()> {
        self.send::<()>(Method::DELETE, &format!("/events/{id}"), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/events"), "http://localhost:8080/events");
        assert_eq!(client.url("events/e1"), "http://localhost:8080/events/e1");
    }

    #[test]
    fn test_from_config_uses_environment_host() {
        let config = AppConfig {
            environment: Environment::Development,
        };
        assert_eq!(ApiClient::from_config(&config).base_url(), "http://localhost:8080");
    }
}

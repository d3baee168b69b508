use std::time::Duration;

use log::debug;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{
    ChatReply, Conversation, ErrorBody, LoginRequest, Message, NewTask, RegisterRequest, Task,
    TaskPatch, TokenResponse,
};
use crate::api::{ChatApi, TaskApi};

pub struct ApiClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::invalid(format!("invalid API URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::invalid(format!("invalid API URL {base_url}")));
        }
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url, token: None })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::invalid(format!("invalid API URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// Send the request and turn a non-success status into `ApiError::Status`,
    /// preferring the server's `detail` message over `fallback`.
    async fn send(&self, req: RequestBuilder, fallback: &str) -> ApiResult<Response> {
        let resp = self.with_auth(req).send().await?;
        let status = resp.status();
        debug!("{} {}", status.as_u16(), resp.url());
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| fallback.to_string());
        Err(ApiError::Status { status, detail })
    }

    async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> ApiResult<T> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(what, e))
    }

    pub async fn register(&self, email: &str, name: &str, password: &str) -> ApiResult<TokenResponse> {
        let url = self.endpoint(&["auth", "register"])?;
        let body = RegisterRequest { email, name, password };
        let resp = self.send(self.http.post(url).json(&body), "Registration failed").await?;
        // Some deployments answer 201 with an empty body.
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(TokenResponse::default());
        }
        serde_json::from_str(&text).map_err(|e| ApiError::decode("registration response", e))
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = LoginRequest { email, password };
        let resp = self.send(self.http.post(url).json(&body), "Login failed").await?;
        let token: TokenResponse = Self::decode(resp, "login response").await?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response: access_token missing".into()))
    }
}

impl TaskApi for ApiClient {
    async fn list_tasks(&self, user_id: &str) -> ApiResult<Vec<Task>> {
        let url = self.endpoint(&["users", user_id, "tasks"])?;
        let resp = self.send(self.http.get(url), "Failed to fetch tasks").await?;
        Self::decode(resp, "task list").await
    }

    async fn create_task(&self, user_id: &str, task: &NewTask) -> ApiResult<Task> {
        let url = self.endpoint(&["users", user_id, "tasks"])?;
        let resp = self.send(self.http.post(url).json(task), "Failed to create task").await?;
        Self::decode(resp, "created task").await
    }

    async fn update_task(&self, user_id: &str, task_id: &str, patch: &TaskPatch) -> ApiResult<Task> {
        let url = self.endpoint(&["users", user_id, "tasks", task_id])?;
        let resp = self.send(self.http.put(url).json(patch), "Failed to update task").await?;
        Self::decode(resp, "updated task").await
    }

    async fn toggle_task(&self, user_id: &str, task_id: &str) -> ApiResult<Task> {
        let url = self.endpoint(&["users", user_id, "tasks", task_id, "complete"])?;
        let resp = self
            .send(self.http.patch(url), "Failed to toggle task completion")
            .await?;
        Self::decode(resp, "toggled task").await
    }

    async fn delete_task(&self, user_id: &str, task_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["users", user_id, "tasks", task_id])?;
        self.send(self.http.delete(url), "Failed to delete task").await?;
        Ok(())
    }
}

impl ChatApi for ApiClient {
    async fn conversations(&self, user_id: &str) -> ApiResult<Vec<Conversation>> {
        let url = self.endpoint(&["chat", "conversations", user_id])?;
        let resp = self.send(self.http.get(url), "Failed to fetch conversations").await?;
        Self::decode(resp, "conversation list").await
    }

    async fn messages(&self, conversation_id: &str) -> ApiResult<Vec<Message>> {
        let url = self.endpoint(&["chat", "conversations", conversation_id, "messages"])?;
        let resp = self.send(self.http.get(url), "Failed to fetch messages").await?;
        Self::decode(resp, "message history").await
    }

    async fn send_message(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
    ) -> ApiResult<String> {
        let mut url = self.endpoint(&["chat", user_id])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("message", message);
            if let Some(id) = conversation_id {
                query.append_pair("conversation_id", id);
            }
        }
        let resp = self.send(self.http.post(url), "Failed to get response").await?;
        let reply: ChatReply = Self::decode(resp, "assistant reply").await?;
        Ok(reply.response)
    }
}

pub mod client;
pub mod error;
pub mod models;

use std::future::Future;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
use models::{Conversation, Message, NewTask, Task, TaskPatch};

/// Task endpoints, scoped to one user.
pub trait TaskApi {
    fn list_tasks(&self, user_id: &str) -> impl Future<Output = ApiResult<Vec<Task>>> + Send;
    fn create_task(&self, user_id: &str, task: &NewTask) -> impl Future<Output = ApiResult<Task>> + Send;
    fn update_task(
        &self,
        user_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> impl Future<Output = ApiResult<Task>> + Send;
    fn toggle_task(&self, user_id: &str, task_id: &str) -> impl Future<Output = ApiResult<Task>> + Send;
    fn delete_task(&self, user_id: &str, task_id: &str) -> impl Future<Output = ApiResult<()>> + Send;
}

/// Assistant endpoints.
pub trait ChatApi {
    /// Most recent conversation first.
    fn conversations(&self, user_id: &str) -> impl Future<Output = ApiResult<Vec<Conversation>>> + Send;
    fn messages(&self, conversation_id: &str) -> impl Future<Output = ApiResult<Vec<Message>>> + Send;
    fn send_message(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
    ) -> impl Future<Output = ApiResult<String>> + Send;
}

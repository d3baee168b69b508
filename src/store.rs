use log::{debug, warn};

use crate::api::models::{NewTask, Task, TaskPatch};
use crate::api::{ApiError, ApiResult, TaskApi};

/// The current user's tasks as last returned by the API.
///
/// Every mutation goes to the backend and is followed by a full refresh, so
/// the snapshot is never edited locally. When that refresh fails the mutation
/// still counts as done and the snapshot is flagged stale until the next
/// successful refresh.
#[derive(Debug)]
pub struct TaskStore {
    user_id: String,
    tasks: Vec<Task>,
    stale: bool,
}

fn clean_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::invalid("task title cannot be empty"));
    }
    Ok(title.to_string())
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

impl TaskStore {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), tasks: Vec::new(), stale: true }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True until the first successful refresh, and again after any failed one.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve an exact id or a unique id prefix.
    pub fn find(&self, id_or_prefix: &str) -> ApiResult<&Task> {
        if let Some(task) = self.get(id_or_prefix) {
            return Ok(task);
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) if !id_or_prefix.is_empty() => Ok(task),
            (Some(_), Some(_)) => Err(ApiError::invalid(format!("task id `{id_or_prefix}` is ambiguous"))),
            _ => Err(ApiError::invalid(format!("no task with id `{id_or_prefix}`"))),
        }
    }

    pub async fn refresh(&mut self, api: &impl TaskApi) -> ApiResult<&[Task]> {
        match api.list_tasks(&self.user_id).await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.stale = false;
                debug!("refreshed {} tasks", self.tasks.len());
                Ok(&self.tasks)
            }
            Err(e) => {
                self.stale = true;
                Err(e)
            }
        }
    }

    /// Reload after a change the backend already accepted. A failure here
    /// must not turn that change into an error for the caller.
    pub(crate) async fn refresh_after(&mut self, api: &impl TaskApi, action: &str) {
        if let Err(e) = self.refresh(api).await {
            warn!("{action} succeeded but the task list could not be reloaded: {e}");
        }
    }

    pub async fn create(
        &mut self,
        api: &impl TaskApi,
        title: &str,
        description: Option<&str>,
    ) -> ApiResult<Task> {
        let body = NewTask { title: clean_title(title)?, description: clean_description(description) };
        let created = api.create_task(&self.user_id, &body).await?;
        self.refresh_after(api, "create").await;
        Ok(created)
    }

    pub async fn update(&mut self, api: &impl TaskApi, task_id: &str, mut patch: TaskPatch) -> ApiResult<Task> {
        if patch.is_empty() {
            return Err(ApiError::invalid("nothing to update"));
        }
        if let Some(title) = patch.title.as_deref() {
            patch.title = Some(clean_title(title)?);
        }
        if let Some(description) = patch.description.as_deref() {
            // An explicit empty description clears it on the server.
            patch.description = Some(description.trim().to_string());
        }
        let updated = api.update_task(&self.user_id, task_id, &patch).await?;
        self.refresh_after(api, "update").await;
        Ok(updated)
    }

    pub async fn toggle(&mut self, api: &impl TaskApi, task_id: &str) -> ApiResult<Task> {
        let toggled = api.toggle_task(&self.user_id, task_id).await?;
        self.refresh_after(api, "toggle").await;
        Ok(toggled)
    }

    pub async fn delete(&mut self, api: &impl TaskApi, task_id: &str) -> ApiResult<()> {
        api.delete_task(&self.user_id, task_id).await?;
        self.refresh_after(api, "delete").await;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeTasks;
    use super::*;

    #[tokio::test]
    async fn create_trims_and_refreshes() {
        let api = FakeTasks::default();
        let mut store = TaskStore::new("u1");
        let created = store.create(&api, "  Buy milk ", Some("   ")).await.unwrap();
        assert_eq!(created.title, "Buy milk");
        assert_eq!(created.description, None);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(api.calls(), vec!["create Buy milk", "list u1"]);
    }

    #[tokio::test]
    async fn blank_title_never_reaches_the_backend() {
        let api = FakeTasks::default();
        let mut store = TaskStore::new("u1");
        let err = store.create(&api, "   ", None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        let err = store
            .update(&api, "x", TaskPatch { title: Some(" ".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        let err = store.update(&api, "x", TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn toggle_update_delete_refresh_the_snapshot() {
        let api = FakeTasks::default();
        let mut store = TaskStore::new("u1");
        let id = store.create(&api, "Write report", None).await.unwrap().id;

        store.toggle(&api, &id).await.unwrap();
        assert!(store.get(&id).unwrap().completed);

        let patch = TaskPatch { title: Some("Write final report".into()), ..Default::default() };
        store.update(&api, &id, patch).await.unwrap();
        assert_eq!(store.get(&id).unwrap().title, "Write final report");

        store.delete(&api, &id).await.unwrap();
        assert!(store.tasks().is_empty());
        assert_eq!(
            api.calls(),
            vec![
                "create Write report".to_string(),
                "list u1".into(),
                format!("toggle {id}"),
                "list u1".into(),
                format!("update {id}"),
                "list u1".into(),
                format!("delete {id}"),
                "list u1".into(),
            ]
        );
    }

    #[tokio::test]
    async fn failed_mutation_keeps_snapshot() {
        let api = FakeTasks::default();
        let mut store = TaskStore::new("u1");
        store.create(&api, "Keep me", None).await.unwrap();
        let err = store.toggle(&api, "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));
        assert_eq!(store.tasks().len(), 1);
    }

    #[tokio::test]
    async fn accepted_mutation_survives_a_failed_reload() {
        let api = FakeTasks::with_failing_list();
        let mut store = TaskStore::new("u1");

        let created = store.create(&api, "Buy milk", None).await.unwrap();
        assert_eq!(created.title, "Buy milk");
        assert!(store.is_stale());
        assert_eq!(api.tasks.lock().unwrap().len(), 1);

        store.toggle(&api, &created.id).await.unwrap();
        store.delete(&api, &created.id).await.unwrap();
        assert!(api.tasks.lock().unwrap().is_empty());
        assert!(store.is_stale());

        api.fail_list.store(false, std::sync::atomic::Ordering::SeqCst);
        store.refresh(&api).await.unwrap();
        assert!(!store.is_stale());
    }

    #[tokio::test]
    async fn failed_refresh_is_reported_and_marks_stale() {
        let api = FakeTasks::default();
        let mut store = TaskStore::new("u1");
        assert!(store.is_stale());
        store.refresh(&api).await.unwrap();
        assert!(!store.is_stale());

        api.fail_list.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(matches!(store.refresh(&api).await, Err(ApiError::Status { .. })));
        assert!(store.is_stale());
    }

    #[tokio::test]
    async fn find_by_prefix() {
        let api = FakeTasks::default();
        let mut store = TaskStore::new("u1");
        for title in ["a", "b"] {
            store.create(&api, title, None).await.unwrap();
        }
        assert_eq!(store.find("task-1").unwrap().title, "a");
        assert!(store.find("task-").is_err());
        assert!(store.find("nope").is_err());
        assert!(store.find("").is_err());
    }
}

//! The assistant conversation as seen from one client.
//!
//! The backend owns conversations. Before every send the client asks for the
//! user's conversations and treats the first one as active; with none, the
//! message goes out without an id and the backend opens a new conversation.

use log::{debug, warn};

use crate::api::models::Message;
use crate::api::{ApiError, ApiResult, ChatApi, TaskApi};
use crate::config::LookupFailurePolicy;
use crate::store::TaskStore;

pub const GREETING: &str = "Hi! I'm your AI task assistant. I can help you add, list, complete, or \
delete tasks using natural language. Just ask me something like \"Add buy milk\" or \"What are my \
pending tasks?\"";

pub const SEND_FAILED_REPLY: &str = "I'm sorry, I encountered an error connecting to the agent. \
Please make sure the backend is running.";

/// Id of the conversation a new message belongs to, if any exists yet.
pub async fn resolve_conversation(api: &impl ChatApi, user_id: &str) -> ApiResult<Option<String>> {
    let conversations = api.conversations(user_id).await?;
    Ok(conversations.into_iter().next().map(|c| c.id))
}

pub struct ChatSession {
    user_id: String,
    policy: LookupFailurePolicy,
    transcript: Vec<Message>,
}

impl ChatSession {
    pub fn new(user_id: impl Into<String>, policy: LookupFailurePolicy) -> Self {
        Self { user_id: user_id.into(), policy, transcript: Vec::new() }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Replace the transcript with the active conversation's history, or the
    /// greeting when there is none or it cannot be fetched.
    pub async fn load_history(&mut self, api: &impl ChatApi) -> &[Message] {
        self.transcript = match self.fetch_history(api).await {
            Ok(Some(messages)) => messages,
            Ok(None) => vec![Message::assistant(GREETING)],
            Err(e) => {
                warn!("could not load chat history: {e}");
                vec![Message::assistant(GREETING)]
            }
        };
        &self.transcript
    }

    async fn fetch_history(&self, api: &impl ChatApi) -> ApiResult<Option<Vec<Message>>> {
        match resolve_conversation(api, &self.user_id).await? {
            Some(id) => Ok(Some(api.messages(&id).await?)),
            None => Ok(None),
        }
    }

    /// Send one user message and return the assistant's reply.
    ///
    /// A successful reply may mean the agent changed tasks, so callers should
    /// refresh their task snapshot afterwards.
    pub async fn send(&mut self, api: &impl ChatApi, text: &str) -> ApiResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::invalid("message is empty"));
        }
        self.transcript.push(Message::user(text));

        match self.post(api, text).await {
            Ok(reply) => {
                self.transcript.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.transcript.push(Message::assistant(SEND_FAILED_REPLY));
                Err(e)
            }
        }
    }

    async fn post(&self, api: &impl ChatApi, text: &str) -> ApiResult<String> {
        let conversation_id = match resolve_conversation(api, &self.user_id).await {
            Ok(id) => id,
            Err(e) => match self.policy {
                LookupFailurePolicy::Abort => return Err(e),
                LookupFailurePolicy::Proceed => {
                    warn!("conversation lookup failed, starting a new one: {e}");
                    None
                }
            },
        };
        debug!("sending chat message (conversation {conversation_id:?})");
        api.send_message(&self.user_id, text, conversation_id.as_deref()).await
    }
}

/// Send one message and, once the agent has answered, reload the task
/// snapshot it may have changed. A failed send leaves the store alone.
pub async fn send_and_refresh<A>(
    api: &A,
    chat: &mut ChatSession,
    store: &mut TaskStore,
    text: &str,
) -> ApiResult<String>
where
    A: ChatApi + TaskApi,
{
    let reply = chat.send(api, text).await?;
    store.refresh_after(api, "chat message").await;
    Ok(reply)
}

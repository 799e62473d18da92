use etap_engine::flow::Conversation;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory conversation store keyed by the transport-supplied respondent
/// id. An entry lives from the first action until the conversation reaches
/// a terminal state; nothing is persisted beyond that.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the respondent's conversation, creating one on first contact.
    /// The returned handle serializes turns per respondent while the map
    /// lock stays short.
    pub async fn entry(&self, respondent: &str) -> Arc<Mutex<Conversation>> {
        let mut sessions = self.sessions.lock().await;
        let conversation = sessions.entry(respondent.to_owned()).or_insert_with(|| {
            tracing::info!(respondent, "starting conversation");
            Arc::new(Mutex::new(Conversation::new()))
        });
        Arc::clone(conversation)
    }

    pub async fn evict(&self, respondent: &str) {
        if self.sessions.lock().await.remove(respondent).is_some() {
            tracing::info!(respondent, "conversation closed");
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("operator endpoint answered {0}")]
    Status(reqwest::StatusCode),
}

/// Payload posted to the operator webhook. Notifications are best effort:
/// a failed delivery never reaches the respondent.
#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notification<'a> {
    ResultReady {
        respondent: &'a str,
        stage: u8,
        distortion: u8,
        distorted: bool,
    },
    Transcript {
        respondent: &'a str,
        answers: &'a [String],
    },
}

#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    async fn notify(&self, notification: Notification<'_>) -> Result<(), NotifyError>;
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl WebhookNotifier {
    pub fn new(endpoint: Url) -> Result<Self, NotifyError> {
        let client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl OperatorNotifier for WebhookNotifier {
    async fn notify(&self, notification: Notification<'_>) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&notification)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }
        tracing::debug!(%status, "operator notified");
        Ok(())
    }
}

/// Used when no webhook is configured.
pub struct NullNotifier;

#[async_trait]
impl OperatorNotifier for NullNotifier {
    async fn notify(&self, notification: Notification<'_>) -> Result<(), NotifyError> {
        tracing::debug!(notification = ?notification, "no operator webhook configured, dropping notification");
        Ok(())
    }
}

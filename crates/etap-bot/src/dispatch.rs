use crate::notify::{Notification, OperatorNotifier};
use crate::render;
use crate::store::SessionStore;
use async_trait::async_trait;
use etap_config::QuestionBank;
use etap_engine::flow::{Action, Message};
use futures_util::{FutureExt, StreamExt, select, select_biased};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// One inbound action attributed to a respondent.
#[derive(Debug)]
pub struct Event {
    pub respondent: String,
    pub action: Action,
}

#[derive(Error, Debug)]
#[error("transport closed")]
pub struct DeliveryError;

/// Outbound side of a chat channel. The console implements this by
/// printing; a messenger transport would push to its send API.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, respondent: &str, text: String) -> Result<(), DeliveryError>;
}

/// Routes events to the respondent's conversation and fans the resulting
/// messages back out through the transport.
pub struct Dispatcher {
    bank: Arc<QuestionBank>,
    store: SessionStore,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn OperatorNotifier>,
}

impl Dispatcher {
    pub fn new(
        bank: Arc<QuestionBank>,
        store: SessionStore,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn OperatorNotifier>,
    ) -> Self {
        Self {
            bank,
            store,
            transport,
            notifier,
        }
    }

    /// Applies one event. The store entry lock is held through delivery so
    /// that a respondent's turns never interleave on the transport;
    /// different respondents proceed concurrently.
    pub async fn handle_event(&self, event: Event) {
        let Event { respondent, action } = event;
        let conversation = self.store.entry(&respondent).await;
        let mut guard = conversation.lock().await;
        let turn = guard.handle(&self.bank, action);
        let terminal = guard.is_terminal();

        for message in &turn.messages {
            if let Err(error) = self.transport.deliver(&respondent, render::render(message)).await {
                tracing::error!(
                    error = &error as &dyn std::error::Error,
                    respondent,
                    "dropping remaining messages of the turn"
                );
                break;
            }
        }
        drop(guard);

        for message in &turn.messages {
            if let Message::Summary(summary) = message {
                self.notify(Notification::ResultReady {
                    respondent: &respondent,
                    stage: summary.stage,
                    distortion: summary.distortion,
                    distorted: summary.distorted,
                })
                .await;
            }
        }
        if let Some(answers) = &turn.transcript {
            self.notify(Notification::Transcript {
                respondent: &respondent,
                answers,
            })
            .await;
        }

        if terminal {
            self.store.evict(&respondent).await;
        }
    }

    /// Best effort: a failed notification is logged and never surfaces to
    /// the respondent.
    async fn notify(&self, notification: Notification<'_>) {
        if let Err(error) = self.notifier.notify(notification).await {
            tracing::warn!(
                error = &error as &dyn std::error::Error,
                "operator notification failed"
            );
        }
    }
}

/// Event loop: consumes events until the channel closes or shutdown is
/// signalled, handling each event on the tracker.
pub async fn run(dispatcher: Arc<Dispatcher>, events: mpsc::Receiver<Event>, shutdown: CancellationToken) {
    let tracker = TaskTracker::new();
    let mut events = ReceiverStream::new(events).fuse();
    let mut shutdown_signal = Box::pin(shutdown.cancelled().fuse());
    loop {
        select_biased! {
            () = &mut shutdown_signal => {
                tracing::debug!("shutdown signal received: closing dispatcher");
                break
            },
            event = events.next() => {
                let Some(event) = event else {
                    break
                };
                let dispatcher = Arc::clone(&dispatcher);
                let token = shutdown.clone();
                tracker.spawn(async move {
                    select! {
                        () = dispatcher.handle_event(event).fuse() => {},
                        () = token.cancelled().fuse() => {
                            tracing::debug!("task cancelled");
                        },
                    }
                });
            },
        }
    }
    tracker.close();
    tracker.wait().await;
    tracing::debug!("dispatcher closed");
}

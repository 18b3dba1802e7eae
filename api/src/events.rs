use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::StreamExt;
use serde::Serialize;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::{App, error::AppError};

/// Emitted after a comment has been durably written. Publishing is
/// fire-and-forget: a request never waits on, or fails because of, delivery.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CommentEvent {
    Created { id: Uuid },
}

#[derive(Clone)]
pub struct EventBus {
    tx: tokio::sync::broadcast::Sender<CommentEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(256);
        Self { tx }
    }

    /// Log-and-continue: a send error only means nobody is listening right
    /// now, which is not this request's problem.
    pub fn publish(&self, event: CommentEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(?e, "No subscribers for comment event");
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CommentEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a subscriber alive for the lifetime of the process and logs every
/// event. Stands in for the downstream notification consumers the
/// deployment wires up.
pub fn spawn_event_logger(bus: &EventBus) {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::info!(?event, "Comment event published"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event logger lagged behind, skipped {skipped} events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

pub async fn comment_events(
    State(ctx): State<App>,
) -> Result<Sse<impl futures_util::Stream<Item = Result<Event, std::convert::Infallible>>>, AppError>
{
    let stream = BroadcastStream::new(ctx.events.subscribe())
        .filter_map(|event| async move { event.ok() })
        .map(|event| {
            let json = serde_json::to_string(&event).unwrap_or_default();
            Ok(Event::default().data(json))
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

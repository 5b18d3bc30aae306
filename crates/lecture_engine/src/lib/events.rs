use tokio::sync::mpsc;

use crate::types::StreamEvent;

/// Sending half of one run's event stream.
///
/// A disconnected consumer is not an error: in-flight generation tasks run to
/// completion so their results can still be cached, and every subsequent emit
/// becomes a no-op.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<StreamEvent>,
}

impl EventSink {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (EventSink { tx }, rx)
    }

    pub async fn emit(&self, event: StreamEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("event consumer disconnected; run continues for cache population");
        }
    }

    pub async fn status(&self, message: impl Into<String>) {
        self.emit(StreamEvent::Status {
            message: message.into(),
        })
        .await;
    }
}

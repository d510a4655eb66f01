// Telemetry source trait - Push-based snapshot subscription
use crate::domain::telemetry::TelemetrySnapshot;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Snapshot delivery for one subscriber. `None` means the watched path
/// currently holds no data. Dropping the subscription unsubscribes.
pub struct Subscription {
    receiver: mpsc::Receiver<Option<TelemetrySnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Subscription backed by a delivery task that is aborted on drop.
    pub fn new(receiver: mpsc::Receiver<Option<TelemetrySnapshot>>, task: JoinHandle<()>) -> Self {
        Self {
            receiver,
            task: Some(task),
        }
    }

    pub fn from_receiver(receiver: mpsc::Receiver<Option<TelemetrySnapshot>>) -> Self {
        Self {
            receiver,
            task: None,
        }
    }

    /// Next delivered value, or `None` once the source has stopped.
    pub async fn next(&mut self) -> Option<Option<TelemetrySnapshot>> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.receiver.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Subscribe to changes of the record at `path`.
    async fn subscribe(&self, path: &str) -> anyhow::Result<Subscription>;
}

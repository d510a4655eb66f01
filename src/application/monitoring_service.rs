// Monitoring service - Live evaluation of pushed telemetry snapshots
use crate::application::evaluator::evaluate;
use crate::application::telemetry_source::{Subscription, TelemetrySource};
use crate::domain::health::EvaluationResult;
use crate::domain::telemetry::{ReadingHistory, TelemetryReading, TelemetrySnapshot};
use crate::domain::vibration::{VibrationHistory, VibrationSample};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

const STREAM_BUFFER: usize = 100;

#[derive(Debug, Clone)]
pub struct MonitoringSettings {
    pub telemetry_path: String,
    pub vibration_capacity: usize,
    pub reading_capacity: usize,
    /// First delay before resubscribing; doubles up to `retry_max`.
    pub retry_initial: Duration,
    pub retry_max: Duration,
}

/// Everything a dashboard view renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// False while the telemetry subscription is down; the readings below
    /// are then the last ones received.
    pub connected: bool,
    pub latest: Option<TelemetryReading>,
    pub evaluation: Option<EvaluationResult>,
    pub readings: Vec<TelemetryReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessage {
    Evaluation {
        reading: TelemetryReading,
        evaluation: EvaluationResult,
    },
    /// The telemetry path is currently empty.
    NoData,
}

/// State of one monitoring session. Not shared: a single task owns it and
/// applies snapshots one at a time.
#[derive(Debug)]
pub struct MonitoringSession {
    vibration: VibrationHistory,
    readings: ReadingHistory,
    evaluation: Option<EvaluationResult>,
}

impl MonitoringSession {
    pub fn new(vibration_capacity: usize, reading_capacity: usize) -> Self {
        Self {
            vibration: VibrationHistory::new(vibration_capacity),
            readings: ReadingHistory::new(reading_capacity),
            evaluation: None,
        }
    }

    /// Apply one delivered value. Empty deliveries leave the session
    /// untouched. The snapshot's vibration sample is buffered before the
    /// rules run, so sustained-vibration counts include it.
    pub fn ingest(&mut self, snapshot: Option<TelemetrySnapshot>, time_ms: i64) -> Option<&EvaluationResult> {
        let snapshot = snapshot?;

        if let Some(magnitude) = snapshot.vibration_magnitude() {
            self.vibration.push(VibrationSample::new(magnitude, time_ms));
        }
        let evaluation = evaluate(&snapshot, &self.vibration);
        self.readings.push(TelemetryReading::new(time_ms, snapshot));
        self.evaluation = Some(evaluation);
        self.evaluation.as_ref()
    }

    pub fn vibration_history(&self) -> &VibrationHistory {
        &self.vibration
    }

    pub fn state(&self) -> DashboardState {
        DashboardState {
            connected: false,
            latest: self.readings.latest().cloned(),
            evaluation: self.evaluation.clone(),
            readings: self.readings.to_vec(),
        }
    }
}

/// Running session. Dropping the handle stops the session and releases its
/// subscription.
pub struct MonitorHandle {
    state: watch::Receiver<DashboardState>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Clone)]
pub struct MonitoringService {
    source: Arc<dyn TelemetrySource>,
    settings: MonitoringSettings,
}

impl MonitoringService {
    pub fn new(source: Arc<dyn TelemetrySource>, settings: MonitoringSettings) -> Self {
        Self { source, settings }
    }

    fn new_session(&self) -> MonitoringSession {
        MonitoringSession::new(self.settings.vibration_capacity, self.settings.reading_capacity)
    }

    async fn subscribe(&self) -> anyhow::Result<Subscription> {
        self.source.subscribe(&self.settings.telemetry_path).await
    }

    /// Start a dashboard session that publishes its state on every delivered
    /// snapshot. A lost subscription is re-established with backoff; the
    /// session's history survives the reconnect.
    pub fn start(&self) -> MonitorHandle {
        let (tx, rx) = watch::channel(DashboardState::default());
        let service = self.clone();
        let task = tokio::spawn(async move { service.run(tx).await });

        tracing::info!("Monitoring session started for {}", self.settings.telemetry_path);
        MonitorHandle { state: rx, task }
    }

    async fn run(self, tx: watch::Sender<DashboardState>) {
        let path = self.settings.telemetry_path.clone();
        let mut session = self.new_session();
        let mut delay = self.settings.retry_initial;

        loop {
            match self.subscribe().await {
                Ok(mut subscription) => {
                    delay = self.settings.retry_initial;
                    tx.send_modify(|state| state.connected = true);

                    while let Some(snapshot) = subscription.next().await {
                        let has_data = snapshot.is_some();
                        if let Some(evaluation) = session.ingest(snapshot, now_ms()) {
                            let critical = evaluation.critical_alerts().count();
                            if critical > 0 {
                                tracing::warn!("{} critical alert(s) on {}", critical, path);
                            }
                            tx.send_replace(DashboardState {
                                connected: true,
                                ..session.state()
                            });
                        }
                        tracing::debug!("Processed delivery from {} (data: {})", path, has_data);
                    }
                    subscription.unsubscribe();
                    tracing::warn!("Telemetry subscription for {} ended, resubscribing in {:?}", path, delay);
                }
                Err(e) => {
                    tracing::warn!("Failed to subscribe to {}: {:#}, retrying in {:?}", path, e, delay);
                }
            }

            tx.send_modify(|state| state.connected = false);
            if tx.is_closed() {
                break;
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(self.settings.retry_max);
        }
    }

    /// Start a private session for one client. It ends, together with its
    /// subscription and history, once the receiver is dropped.
    pub async fn stream_evaluations(&self) -> anyhow::Result<mpsc::Receiver<StreamMessage>> {
        let mut subscription = self.subscribe().await?;
        let mut session = self.new_session();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        tokio::spawn(async move {
            loop {
                let delivered = tokio::select! {
                    delivered = subscription.next() => delivered,
                    _ = tx.closed() => break,
                };
                let Some(snapshot) = delivered else {
                    break;
                };

                let time_ms = now_ms();
                let msg = match snapshot {
                    Some(snapshot) => {
                        let reading = TelemetryReading::new(time_ms, snapshot.clone());
                        match session.ingest(Some(snapshot), time_ms) {
                            Some(evaluation) => StreamMessage::Evaluation {
                                reading,
                                evaluation: evaluation.clone(),
                            },
                            None => continue,
                        }
                    }
                    None => StreamMessage::NoData,
                };

                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            subscription.unsubscribe();
            tracing::debug!("Evaluation stream closed");
        });

        Ok(rx)
    }
}

/// One dashboard session per signed-in user. Closing a user's session drops
/// its subscription and vibration history.
#[derive(Clone)]
pub struct SessionMonitors {
    service: MonitoringService,
    sessions: Arc<Mutex<HashMap<String, MonitorHandle>>>,
}

impl SessionMonitors {
    pub fn new(service: MonitoringService) -> Self {
        Self {
            service,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The user's running session, started on first use.
    pub async fn open(&self, user_id: &str) -> watch::Receiver<DashboardState> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Opening monitoring session for user {}", user_id);
                self.service.start()
            })
            .watch()
    }

    pub async fn state(&self, user_id: &str) -> DashboardState {
        self.open(user_id).await.borrow().clone()
    }

    /// Returns whether the user had a running session.
    pub async fn close(&self, user_id: &str) -> bool {
        let closed = self.sessions.lock().await.remove(user_id);
        match closed {
            Some(handle) => {
                handle.stop();
                tracing::info!("Monitoring session closed for user {}", user_id);
                true
            }
            None => false,
        }
    }

    pub async fn close_all(&self) {
        let mut sessions = self.sessions.lock().await;
        tracing::info!("Closing {} monitoring session(s)", sessions.len());
        sessions.clear();
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

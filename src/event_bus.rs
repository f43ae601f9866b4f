use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

/// Events emitted over one submit cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Submit pressed with a blank description
    SubmissionBlocked {
        reason: String,
    },
    SubmissionStarted {
        submission_id: String,
        description: String,
    },
    GameCreated {
        submission_id: String,
        game_params: serde_json::Value,
    },
    /// The server reported an error
    SubmissionRejected {
        submission_id: String,
        message: String,
    },
    /// The request or its decoding failed
    SubmissionFailed {
        submission_id: String,
        error: String,
    },
    /// Busy state released; always follows `SubmissionStarted`
    SubmissionSettled {
        submission_id: String,
    },
}

/// Event bus for component communication
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    metrics: Arc<RwLock<Metrics>>,
}

/// Accumulated metrics from events
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub submissions: usize,
    pub games_created: usize,
    pub rejected: usize,
    pub failed: usize,
    pub blocked: usize,
    pub settled: usize,
}

impl Metrics {
    /// Submissions that have started but not settled.
    pub fn in_flight(&self) -> usize {
        self.submissions.saturating_sub(self.settled)
    }
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            metrics: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub async fn emit(&self, event: Event) -> Result<()> {
        self.update_metrics(&event).await;

        // No receivers is fine.
        let _ = self.sender.send(event);
        Ok(())
    }

    /// Get current metrics
    pub async fn get_metrics(&self) -> Metrics {
        self.metrics.read().await.clone()
    }

    async fn update_metrics(&self, event: &Event) {
        let mut metrics = self.metrics.write().await;

        match event {
            Event::SubmissionBlocked { .. } => metrics.blocked += 1,
            Event::SubmissionStarted { .. } => metrics.submissions += 1,
            Event::GameCreated { .. } => metrics.games_created += 1,
            Event::SubmissionRejected { .. } => metrics.rejected += 1,
            Event::SubmissionFailed { .. } => metrics.failed += 1,
            Event::SubmissionSettled { .. } => metrics.settled += 1,
        }
    }
}

/// One log line per event.
pub fn describe(event: &Event) -> String {
    match event {
        Event::SubmissionBlocked { reason } => format!("submission blocked: {}", reason),
        Event::SubmissionStarted { submission_id, description } => {
            format!("[{}] started ({} chars)", submission_id, description.chars().count())
        }
        Event::GameCreated { submission_id, .. } => format!("[{}] game created", submission_id),
        Event::SubmissionRejected { submission_id, message } => {
            format!("[{}] rejected: {}", submission_id, message)
        }
        Event::SubmissionFailed { submission_id, error } => {
            format!("[{}] failed: {}", submission_id, error)
        }
        Event::SubmissionSettled { submission_id } => format!("[{}] settled", submission_id),
    }
}

/// Subscribe and log every event at debug level until the bus is dropped.
pub fn spawn_event_logger(bus: &EventBus) -> JoinHandle<()> {
    let mut receiver = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!("{}", describe(&event)),
                Err(RecvError::Lagged(skipped)) => warn!("Event logger skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

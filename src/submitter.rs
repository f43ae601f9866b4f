use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::error::SubmitError;
use crate::event_bus::{Event, EventBus};
use crate::response::GameResponse;
use crate::transport::GameTransport;
use crate::view::FormView;

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    /// The last cycle finished; `created` is false for any error panel.
    Settled { created: bool },
}

/// Inputs that move the cycle forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Submit,
    Succeeded,
    Failed,
}

impl SubmitState {
    /// Next state, or `None` if the trigger is not valid here.
    pub fn next(self, trigger: Trigger) -> Option<SubmitState> {
        match (self, trigger) {
            (SubmitState::Idle | SubmitState::Settled { .. }, Trigger::Submit) => {
                Some(SubmitState::Submitting)
            }
            (SubmitState::Submitting, Trigger::Succeeded) => {
                Some(SubmitState::Settled { created: true })
            }
            (SubmitState::Submitting, Trigger::Failed) => {
                Some(SubmitState::Settled { created: false })
            }
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn is_busy(self) -> bool {
        self == SubmitState::Submitting
    }
}

/// Holds the view in its busy state; releasing it (or dropping it) re-enables
/// the submit control exactly once.
///
/// A guard dropped without `release` (a panicking view, a cancelled request)
/// also settles the cycle as failed so the form never stays `Submitting`.
struct BusyGuard<'a, V: FormView> {
    view: &'a mut V,
    state: &'a mut SubmitState,
    released: bool,
}

impl<'a, V: FormView> BusyGuard<'a, V> {
    fn acquire(view: &'a mut V, state: &'a mut SubmitState) -> Self {
        view.set_busy(true);
        Self {
            view,
            state,
            released: false,
        }
    }

    fn release(mut self) {
        self.released = true;
        self.view.set_busy(false);
    }
}

impl<V: FormView> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        if !self.released {
            self.view.set_busy(false);
            if let Some(settled) = self.state.next(Trigger::Failed) {
                *self.state = settled;
            }
        }
    }
}

/// Strip the whitespace a browser's `trim` strips, byte order mark included.
fn trim_description(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Turns submit events into one server request each and mirrors the outcome
/// into the view.
pub struct FormSubmitter<T: GameTransport, V: FormView> {
    transport: T,
    view: V,
    state: SubmitState,
    event_bus: Option<Arc<EventBus>>,
}

impl<T: GameTransport, V: FormView> FormSubmitter<T, V> {
    pub fn new(transport: T, view: V) -> Self {
        Self {
            transport,
            view,
            state: SubmitState::Idle,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    #[allow(dead_code)]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Handle one submit of the form.
    ///
    /// Returns the created game's parameters, or the error now shown on the
    /// error panel.
    pub async fn submit(&mut self, raw_description: &str) -> Result<Value, SubmitError> {
        let description = trim_description(raw_description);
        if description.is_empty() {
            let err = SubmitError::Validation;
            info!("Submission blocked: empty description");
            self.view.show_error(&err.to_string());
            self.view.hide_result();
            self.state = SubmitState::Idle;
            self.emit(Event::SubmissionBlocked {
                reason: err.to_string(),
            })
            .await;
            return Err(err);
        }

        let submission_id = Uuid::new_v4().to_string();
        self.advance(Trigger::Submit);
        info!("Submitting game description ({})", submission_id);
        debug!("Description: {}", description);
        self.emit(Event::SubmissionStarted {
            submission_id: submission_id.clone(),
            description: description.to_string(),
        })
        .await;

        let outcome = {
            let mut guard = BusyGuard::acquire(&mut self.view, &mut self.state);
            guard.view.hide_result();
            guard.view.hide_error();

            let outcome = request_game(&self.transport, description).await;
            match &outcome {
                Ok((game_params, message)) => {
                    guard.view.show_result(game_params, message.as_deref());
                    guard.view.hide_error();
                }
                Err(err) => {
                    guard.view.show_error(&err.to_string());
                    guard.view.hide_result();
                }
            }
            guard.release();
            outcome
        };

        match &outcome {
            Ok((game_params, _)) => {
                self.advance(Trigger::Succeeded);
                info!("Game created ({})", submission_id);
                self.emit(Event::GameCreated {
                    submission_id: submission_id.clone(),
                    game_params: game_params.clone(),
                })
                .await;
            }
            Err(SubmitError::Application(message)) => {
                self.advance(Trigger::Failed);
                warn!("Server rejected description ({}): {}", submission_id, message);
                self.emit(Event::SubmissionRejected {
                    submission_id: submission_id.clone(),
                    message: message.clone(),
                })
                .await;
            }
            Err(err) => {
                self.advance(Trigger::Failed);
                warn!("Submission {} failed ({}): {}", submission_id, err.kind(), err);
                self.emit(Event::SubmissionFailed {
                    submission_id: submission_id.clone(),
                    error: err.to_string(),
                })
                .await;
            }
        }
        self.emit(Event::SubmissionSettled { submission_id }).await;

        outcome.map(|(game_params, _)| game_params)
    }

    fn advance(&mut self, trigger: Trigger) {
        match self.state.next(trigger) {
            Some(next) => self.state = next,
            None => debug!("Ignoring {:?} in state {:?}", trigger, self.state),
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(event).await;
        }
    }
}

async fn request_game<T: GameTransport>(
    transport: &T,
    description: &str,
) -> Result<(Value, Option<String>), SubmitError> {
    let body = transport.create_game(description).await?;
    match GameResponse::from_value(body)? {
        GameResponse::Created {
            game_params,
            message,
        } => Ok((game_params, message)),
        GameResponse::Rejected { message } => Err(SubmitError::Application(message)),
    }
}

//! The touch-state temporal state machine.
//!
//! Converts the per-evaluation "touching now" boolean into debounced,
//! time-qualified alert transitions. The machine is a pure value type:
//! callers supply monotonic time and the current threshold on every
//! update, so all temporal behavior is unit-testable with synthetic
//! timestamps and a threshold change mid-session never resets the
//! session start.

/// Externally observable machine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchState {
    Clear,
    TouchingBelowThreshold,
    Alerting,
}

/// One continuous touching interval.
///
/// Created when touching starts, destroyed when it ends; at most one
/// live at a time. `alert_armed` latches once the alarm has fired so it
/// fires at most once per session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSession {
    pub started_at: f64,
    pub alert_armed: bool,
}

/// Command for the alarm controller produced by a transition.
///
/// `Start` is emitted exactly once per session, on the evaluation where
/// the elapsed time first reaches the threshold. `Stop` is emitted on
/// any release; the controller's `stop` is idempotent, so commanding it
/// for a session that never alerted is harmless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmCommand {
    Start,
    Stop,
}

/// Summary of a session that ended on this evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndedSession {
    pub duration: f64,
    pub was_alerting: bool,
}

/// Result of one evaluation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchUpdate {
    pub state: TouchState,
    /// Elapsed time of the live session, clamped to >= 0 against clock
    /// regressions. `None` when clear.
    pub duration: Option<f64>,
    pub alarm: Option<AlarmCommand>,
    pub ended: Option<EndedSession>,
}

#[derive(Debug, Default)]
pub struct TouchStateMachine {
    session: Option<TouchSession>,
}

impl TouchStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TouchState {
        match self.session {
            None => TouchState::Clear,
            Some(TouchSession {
                alert_armed: false, ..
            }) => TouchState::TouchingBelowThreshold,
            Some(TouchSession {
                alert_armed: true, ..
            }) => TouchState::Alerting,
        }
    }

    pub fn session(&self) -> Option<&TouchSession> {
        self.session.as_ref()
    }

    /// Advance the machine by one evaluation.
    ///
    /// `threshold_secs` is read fresh on every call; changing it
    /// mid-session only moves where the next crossing happens, it never
    /// rewrites `started_at`.
    pub fn update(&mut self, touching_now: bool, now: f64, threshold_secs: f64) -> TouchUpdate {
        match (self.session, touching_now) {
            (None, false) => TouchUpdate {
                state: TouchState::Clear,
                duration: None,
                alarm: None,
                ended: None,
            },
            (None, true) => {
                self.session = Some(TouchSession {
                    started_at: now,
                    alert_armed: false,
                });
                TouchUpdate {
                    state: TouchState::TouchingBelowThreshold,
                    duration: Some(0.0),
                    alarm: None,
                    ended: None,
                }
            }
            (Some(session), true) => {
                // Clamp: a clock regression must not crash or show a
                // negative duration.
                let duration = (now - session.started_at).max(0.0);
                if session.alert_armed {
                    TouchUpdate {
                        state: TouchState::Alerting,
                        duration: Some(duration),
                        alarm: None,
                        ended: None,
                    }
                } else if duration >= threshold_secs {
                    self.session = Some(TouchSession {
                        alert_armed: true,
                        ..session
                    });
                    TouchUpdate {
                        state: TouchState::Alerting,
                        duration: Some(duration),
                        alarm: Some(AlarmCommand::Start),
                        ended: None,
                    }
                } else {
                    TouchUpdate {
                        state: TouchState::TouchingBelowThreshold,
                        duration: Some(duration),
                        alarm: None,
                        ended: None,
                    }
                }
            }
            (Some(session), false) => {
                self.session = None;
                TouchUpdate {
                    state: TouchState::Clear,
                    duration: None,
                    alarm: Some(AlarmCommand::Stop),
                    ended: Some(EndedSession {
                        duration: (now - session.started_at).max(0.0),
                        was_alerting: session.alert_armed,
                    }),
                }
            }
        }
    }

    /// Drop any live session without emitting commands; used on teardown
    /// when the caller silences the alarm itself.
    pub fn reset(&mut self) {
        self.session = None;
    }
}

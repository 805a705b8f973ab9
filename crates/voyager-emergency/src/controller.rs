//! Emergency session controller.
//!
//! Lock order: the shared safety state machine, then the session slot,
//! then the latest-fix cell. Every path that needs more than one of them
//! takes them in that order.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use voyager_contacts::TrustedContactStore;
use voyager_dispatch::{AlertDispatcher, DispatchSink};
use voyager_safety::SafetyStateMachine;
use voyager_types::{AlertChannel, AlertRequest, PositionFix, SessionId};

use crate::config::EmergencyConfig;
use crate::countdown::{Countdown, CountdownTick};
use crate::error::{EmergencyError, EmergencyResult};
use crate::events::{EmergencyEvent, HoldGesture, SessionSnapshot};
use crate::hold::{HoldGate, HoldTick};

/// Channel capacity for emergency events
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// The state machine, shared between the position pipeline and the
/// controller.
pub type SharedSafetyState = Arc<Mutex<SafetyStateMachine>>;

/// Owns the lifecycle of emergency sessions and their timers.
pub struct EmergencySessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: EmergencyConfig,
    safety: SharedSafetyState,
    session: Mutex<Option<ActiveSession>>,
    latest_fix: RwLock<Option<PositionFix>>,
    contacts: Arc<TrustedContactStore>,
    dispatcher: AlertDispatcher,
    sink: Arc<dyn DispatchSink>,
    runtime: Handle,
    event_tx: broadcast::Sender<EmergencyEvent>,
}

struct ActiveSession {
    id: SessionId,
    started_at: DateTime<Utc>,
    countdown: Countdown,
    hold: HoldGate,
    broadcast: Option<BroadcastState>,
    broadcast_generation: u64,
    broadcasts_sent: u64,
    countdown_task: Option<JoinHandle<()>>,
    hold_task: Option<JoinHandle<()>>,
}

struct BroadcastState {
    generation: u64,
    task: JoinHandle<()>,
}

impl ActiveSession {
    fn abort_tasks(&mut self) {
        if let Some(task) = self.countdown_task.take() {
            task.abort();
        }
        if let Some(task) = self.hold_task.take() {
            task.abort();
        }
        if let Some(broadcast) = self.broadcast.take() {
            broadcast.task.abort();
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            started_at: self.started_at,
            countdown_remaining: self.countdown.remaining(),
            auto_alert_due: self.countdown.is_expired(),
            hold_progress: self.hold.progress(),
            holding: self.hold.is_holding(),
            broadcast_active: self.broadcast.is_some(),
            broadcasts_sent: self.broadcasts_sent,
        }
    }
}

impl EmergencySessionController {
    /// Create a controller. Must be called from within a Tokio runtime;
    /// session timers are spawned onto it.
    pub fn new(
        config: EmergencyConfig,
        safety: SharedSafetyState,
        contacts: Arc<TrustedContactStore>,
        dispatcher: AlertDispatcher,
        sink: Arc<dyn DispatchSink>,
    ) -> EmergencyResult<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| EmergencyError::NoRuntime)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                safety,
                session: Mutex::new(None),
                latest_fix: RwLock::new(None),
                contacts,
                dispatcher,
                sink,
                runtime,
                event_tx,
            }),
        })
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<EmergencyEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn config(&self) -> &EmergencyConfig {
        &self.inner.config
    }

    /// Record the latest valid position for outgoing alerts.
    pub fn update_position(&self, fix: PositionFix) {
        *self.inner.latest_fix.write() = Some(fix);
    }

    pub fn latest_fix(&self) -> Option<PositionFix> {
        *self.inner.latest_fix.read()
    }

    pub fn is_active(&self) -> bool {
        self.inner.session.lock().is_some()
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.inner.session.lock().as_ref().map(ActiveSession::snapshot)
    }

    /// Declare an emergency: move to EMERGENCY and start a session.
    ///
    /// Returns `None` if an emergency is already active; the duplicate
    /// trigger is absorbed and the running session is untouched.
    #[instrument(skip(self))]
    pub fn declare_emergency(&self) -> Option<SessionId> {
        let inner = &self.inner;
        let mut safety = inner.safety.lock();
        let session_id = safety.declare_emergency()?;

        let mut slot = inner.session.lock();
        if let Some(mut stale) = slot.take() {
            warn!(session_id = %stale.id, "Replacing a session the state machine no longer owns");
            stale.abort_tasks();
        }

        let mut session = ActiveSession {
            id: session_id.clone(),
            started_at: Utc::now(),
            countdown: Countdown::new(inner.config.countdown_secs),
            hold: HoldGate::new(inner.config.hold_ticks_required()),
            broadcast: None,
            broadcast_generation: 0,
            broadcasts_sent: 0,
            countdown_task: None,
            hold_task: None,
        };
        session.countdown_task = Some(
            inner
                .runtime
                .spawn(run_countdown(Arc::downgrade(inner), session_id.clone())),
        );
        *slot = Some(session);

        info!(
            session_id = %session_id,
            countdown_secs = inner.config.countdown_secs,
            "Emergency session started"
        );
        inner.emit(EmergencyEvent::SessionStarted {
            session_id: session_id.clone(),
            countdown: inner.config.countdown_secs,
        });

        Some(session_id)
    }

    /// Single entry point for the cancel gesture.
    pub fn confirm_cancel_hold(&self, gesture: HoldGesture) -> EmergencyResult<()> {
        match gesture {
            HoldGesture::Start => self.hold_start(),
            HoldGesture::Stop => self.hold_release(),
        }
    }

    /// The cancel gesture went down. A second start while already holding
    /// is ignored.
    #[instrument(skip(self))]
    pub fn hold_start(&self) -> EmergencyResult<()> {
        let inner = &self.inner;
        let mut slot = inner.session.lock();
        let session = slot.as_mut().ok_or(EmergencyError::NoActiveSession)?;

        let Some(attempt) = session.hold.start() else {
            debug!(session_id = %session.id, "Hold already in progress");
            return Ok(());
        };

        if let Some(previous) = session.hold_task.take() {
            previous.abort();
        }
        session.hold_task = Some(inner.runtime.spawn(run_hold(
            Arc::downgrade(inner),
            session.id.clone(),
            attempt,
        )));

        debug!(session_id = %session.id, attempt, "Hold to cancel started");
        Ok(())
    }

    /// The cancel gesture was released. Progress resets to 0 immediately.
    #[instrument(skip(self))]
    pub fn hold_release(&self) -> EmergencyResult<()> {
        let inner = &self.inner;
        let mut slot = inner.session.lock();
        let session = slot.as_mut().ok_or(EmergencyError::NoActiveSession)?;

        if session.hold.release() {
            if let Some(task) = session.hold_task.take() {
                task.abort();
            }
            debug!(session_id = %session.id, "Hold released before completion");
            inner.emit(EmergencyEvent::HoldReset {
                session_id: session.id.clone(),
            });
        }
        Ok(())
    }

    /// Turn the recurring location broadcast on or off.
    ///
    /// Enabling messages the primary contact immediately, then every
    /// broadcast interval. With no contacts the toggle has no effect.
    /// Returns whether the broadcast is active after the call.
    #[instrument(skip(self))]
    pub fn set_broadcast(&self, enabled: bool) -> EmergencyResult<bool> {
        let inner = &self.inner;
        let mut slot = inner.session.lock();
        let session = slot.as_mut().ok_or(EmergencyError::NoActiveSession)?;

        if !enabled {
            if let Some(broadcast) = session.broadcast.take() {
                broadcast.task.abort();
                info!(session_id = %session.id, "Location broadcast disabled");
                inner.emit(EmergencyEvent::BroadcastDisabled {
                    session_id: session.id.clone(),
                });
            }
            return Ok(false);
        }

        if session.broadcast.is_some() {
            return Ok(true);
        }

        let Some(primary) = inner.contacts.primary() else {
            info!(session_id = %session.id, "No trusted contacts; broadcast toggle ignored");
            return Ok(false);
        };

        session.broadcast_generation += 1;
        let generation = session.broadcast_generation;

        let fix = *inner.latest_fix.read();
        let request = inner.dispatcher.build_request(
            &primary,
            AlertChannel::Message,
            fix.as_ref().map(|f| &f.position),
            Some(&session.id),
        );
        inner.hand_off(request);
        session.broadcasts_sent += 1;

        let task = inner.runtime.spawn(run_broadcast(
            Arc::downgrade(inner),
            session.id.clone(),
            generation,
        ));
        session.broadcast = Some(BroadcastState { generation, task });

        info!(
            session_id = %session.id,
            primary = %primary.id,
            interval_secs = inner.config.broadcast_interval_secs,
            "Location broadcast enabled"
        );
        inner.emit(EmergencyEvent::BroadcastEnabled {
            session_id: session.id.clone(),
            primary: primary.id,
        });
        Ok(true)
    }

    /// Dial the configured public emergency line. Works with or without an
    /// active session; the request is tagged with the session if there is
    /// one.
    #[instrument(skip(self))]
    pub fn dial_authorities(&self) -> Uuid {
        let inner = &self.inner;
        let slot = inner.session.lock();
        let request = inner
            .dispatcher
            .authorities_call(slot.as_ref().map(|s| &s.id));
        let request_id = request.id;
        warn!(request_id = %request_id, "Dialling authorities");
        inner.hand_off(request);
        request_id
    }

    /// Abort any live session's timers without a status transition. Used
    /// when the engine itself is shutting down.
    pub fn shutdown(&self) {
        if let Some(mut session) = self.inner.session.lock().take() {
            info!(session_id = %session.id, "Controller shutting down; session timers stopped");
            session.abort_tasks();
        }
    }
}

impl Drop for EmergencySessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ControllerInner {
    fn emit(&self, event: EmergencyEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Hand a request to the sink. Callers hold the session lock, so a
    /// torn-down session can never dispatch.
    fn hand_off(&self, request: AlertRequest) {
        let event = EmergencyEvent::AlertDispatched {
            session_id: request.session_id.clone(),
            request_id: request.id,
            channel: request.channel,
            target: request.target.clone(),
        };
        self.sink.dispatch(request);
        self.emit(event);
    }

    /// Message every contact in the store; used when the countdown expires
    /// with escalation enabled.
    fn escalate(&self, session: &mut ActiveSession) {
        let fix = *self.latest_fix.read();
        let contacts = self.contacts.snapshot();
        if contacts.is_empty() {
            warn!(session_id = %session.id, "Countdown escalation with no trusted contacts");
            return;
        }

        for contact in &contacts {
            let request = self.dispatcher.build_request(
                contact,
                AlertChannel::Message,
                fix.as_ref().map(|f| &f.position),
                Some(&session.id),
            );
            self.hand_off(request);
        }
        warn!(
            session_id = %session.id,
            contacts = contacts.len(),
            "Countdown expired; trusted circle alerted"
        );
    }
}

async fn run_countdown(inner: Weak<ControllerInner>, session_id: SessionId) {
    let Some(period) = inner.upgrade().map(|i| i.config.countdown_period()) else {
        return;
    };
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut slot = inner.session.lock();
        let Some(session) = slot.as_mut().filter(|s| s.id == session_id) else {
            debug!(session_id = %session_id, "Countdown tick for ended session dropped");
            return;
        };

        match session.countdown.tick() {
            CountdownTick::Remaining(remaining) => {
                debug!(session_id = %session_id, remaining, "Countdown tick");
                inner.emit(EmergencyEvent::CountdownTick {
                    session_id: session_id.clone(),
                    remaining,
                });
            }
            CountdownTick::Expired => {
                warn!(session_id = %session_id, "Auto-alert countdown reached zero");
                inner.emit(EmergencyEvent::CountdownTick {
                    session_id: session_id.clone(),
                    remaining: 0,
                });
                inner.emit(EmergencyEvent::AutoAlertDue {
                    session_id: session_id.clone(),
                });
                if inner.config.escalate_on_countdown {
                    inner.escalate(session);
                }
                session.countdown_task = None;
                return;
            }
            CountdownTick::Frozen => {
                session.countdown_task = None;
                return;
            }
        }
    }
}

async fn run_hold(inner: Weak<ControllerInner>, session_id: SessionId, attempt: u64) {
    let Some(period) = inner.upgrade().map(|i| i.config.hold_tick()) else {
        return;
    };
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        // Completion transitions the state machine, so take it first.
        let mut safety = inner.safety.lock();
        let mut slot = inner.session.lock();
        let Some(session) = slot.as_mut().filter(|s| s.id == session_id) else {
            return;
        };

        match session.hold.tick(attempt) {
            HoldTick::Stale => return,
            HoldTick::Progress(progress) => {
                inner.emit(EmergencyEvent::HoldProgress {
                    session_id: session_id.clone(),
                    progress,
                });
            }
            HoldTick::Completed => {
                inner.emit(EmergencyEvent::HoldProgress {
                    session_id: session_id.clone(),
                    progress: 100,
                });

                // This task is the hold task; drop its own handle instead of
                // aborting it, then tear down the rest.
                session.hold_task = None;
                if let Some(mut ended) = slot.take() {
                    ended.abort_tasks();
                }
                safety.confirm_cancel(&session_id);

                info!(session_id = %session_id, "Emergency session ended by confirmed hold");
                inner.emit(EmergencyEvent::SessionEnded {
                    session_id: session_id.clone(),
                });
                return;
            }
        }
    }
}

async fn run_broadcast(inner: Weak<ControllerInner>, session_id: SessionId, generation: u64) {
    let Some(period) = inner.upgrade().map(|i| i.config.broadcast_interval()) else {
        return;
    };
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut slot = inner.session.lock();
        let Some(session) = slot.as_mut().filter(|s| {
            s.id == session_id
                && s.broadcast
                    .as_ref()
                    .is_some_and(|b| b.generation == generation)
        }) else {
            debug!(session_id = %session_id, generation, "Stale broadcast timer dropped");
            return;
        };

        // Re-read the store each cycle so edits apply to the next firing.
        let Some(primary) = inner.contacts.primary() else {
            debug!(session_id = %session_id, "No trusted contacts at broadcast time; skipped");
            continue;
        };

        let fix = *inner.latest_fix.read();
        if fix.is_none() {
            debug!(session_id = %session_id, "No position fix; sending degraded heartbeat");
        }
        let request = inner.dispatcher.build_request(
            &primary,
            AlertChannel::Message,
            fix.as_ref().map(|f| &f.position),
            Some(&session_id),
        );
        inner.hand_off(request);
        session.broadcasts_sent += 1;
        debug!(
            session_id = %session_id,
            primary = %primary.id,
            sent = session.broadcasts_sent,
            "Location broadcast sent"
        );
    }
}

//! The session engine: a single task that owns the raffle session.
//!
//! Every command, animation tick and draw commit is processed sequentially by
//! one tokio task, so the session needs no locking. The rolling timers belong
//! to the engine, not to any caller: dropping a view or a request future does
//! not affect an in-flight draw. Only engine teardown ([`SessionHandle::shutdown`]
//! or dropping every handle) cancels them.

use std::future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use raffle_core::clock::Clock;
use raffle_core::error::RaffleError;
use raffle_core::feedback::{FeedbackCue, FeedbackEvent, FeedbackSink, SoundSettings};
use raffle_core::rng::DeterministicRng;
use raffle_core::store::KeyValueStore;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

use super::persistence;
use super::views::SessionView;
use crate::domain::aggregates::RaffleSession;
use crate::domain::draw::DrawTicket;

/// Capacity of the engine's command queue.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// Timing of the rolling animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTiming {
    /// Interval between cosmetic ticks.
    pub tick_period: Duration,
    /// Time from `draw` to commit.
    pub roll_duration: Duration,
}

impl Default for DrawTiming {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(100),
            roll_duration: Duration::from_millis(2000),
        }
    }
}

/// Collaborators injected into the engine.
pub struct EngineDeps {
    /// Persistence adapter.
    pub store: Arc<dyn KeyValueStore>,
    /// Randomness for outcomes and cosmetic ticks.
    pub rng: Box<dyn DeterministicRng>,
    /// Wall clock for draw timestamps.
    pub clock: Arc<dyn Clock>,
    /// Consumer of tick and reveal cues.
    pub feedback: Arc<dyn FeedbackSink>,
    /// Animation timing.
    pub timing: DrawTiming,
}

type Reply<T> = oneshot::Sender<Result<T, RaffleError>>;

enum SessionCommand {
    View(Reply<SessionView>),
    Add { name: String, reply: Reply<SessionView> },
    BeginEdit { index: usize, reply: Reply<String> },
    CancelEdit(Reply<SessionView>),
    Edit {
        index: usize,
        name: String,
        reply: Reply<SessionView>,
    },
    Remove { index: usize, reply: Reply<SessionView> },
    Draw(Reply<Option<DrawTicket>>),
    Restart(Reply<SessionView>),
    NewSession(Reply<SessionView>),
    UpdateSound {
        settings: SoundSettings,
        reply: Reply<SessionView>,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle used to talk to a running engine.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

/// Rehydrates the session from `deps.store` and spawns its engine task.
///
/// Must be called from within a tokio runtime.
pub async fn start(deps: EngineDeps) -> SessionHandle {
    let session = persistence::rehydrate(deps.store.as_ref()).await;
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let engine = SessionEngine {
        session,
        store: deps.store,
        rng: deps.rng,
        clock: deps.clock,
        feedback: deps.feedback,
        timing: deps.timing,
        commands: rx,
        commit_timer: None,
        ticker: None,
    };
    tokio::spawn(engine.run());
    SessionHandle { commands: tx }
}

impl SessionHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, RaffleError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| RaffleError::EngineStopped)?;
        response.await.map_err(|_| RaffleError::EngineStopped)?
    }

    /// Returns a snapshot of the session.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::EngineStopped` if the engine has shut down.
    pub async fn view(&self) -> Result<SessionView, RaffleError> {
        self.request(SessionCommand::View).await
    }

    /// Registers a participant.
    ///
    /// # Errors
    ///
    /// Returns the registry's validation or lock error, or
    /// `RaffleError::EngineStopped`.
    pub async fn add_participant(&self, name: impl Into<String>) -> Result<SessionView, RaffleError> {
        let name = name.into();
        self.request(|reply| SessionCommand::Add { name, reply }).await
    }

    /// Marks a pending entry as being edited and returns its current text.
    ///
    /// # Errors
    ///
    /// Returns a lock or index error, or `RaffleError::EngineStopped`.
    pub async fn begin_edit(&self, index: usize) -> Result<String, RaffleError> {
        self.request(|reply| SessionCommand::BeginEdit { index, reply })
            .await
    }

    /// Drops the edit marker.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::EngineStopped` if the engine has shut down.
    pub async fn cancel_edit(&self) -> Result<SessionView, RaffleError> {
        self.request(SessionCommand::CancelEdit).await
    }

    /// Replaces a pending entry.
    ///
    /// # Errors
    ///
    /// Returns a validation, lock or index error, or
    /// `RaffleError::EngineStopped`.
    pub async fn edit_participant(
        &self,
        index: usize,
        name: impl Into<String>,
    ) -> Result<SessionView, RaffleError> {
        let name = name.into();
        self.request(|reply| SessionCommand::Edit { index, name, reply })
            .await
    }

    /// Removes a pending entry.
    ///
    /// # Errors
    ///
    /// Returns a lock or index error, or `RaffleError::EngineStopped`.
    pub async fn remove_participant(&self, index: usize) -> Result<SessionView, RaffleError> {
        self.request(|reply| SessionCommand::Remove { index, reply })
            .await
    }

    /// Starts a draw. `Ok(None)` means the call was a no-op because a draw
    /// is already rolling or nobody is pending.
    ///
    /// Returns as soon as the outcome is fixed; the reveal follows after the
    /// configured roll duration.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::EngineStopped` if the engine has shut down.
    pub async fn draw(&self) -> Result<Option<DrawTicket>, RaffleError> {
        self.request(SessionCommand::Draw).await
    }

    /// Returns drawn names to the pending list and unlocks the session.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::DrawInProgress`, `RaffleError::NothingDrawn` or
    /// `RaffleError::EngineStopped`.
    pub async fn restart_keeping_participants(&self) -> Result<SessionView, RaffleError> {
        self.request(SessionCommand::Restart).await
    }

    /// Wipes the session and clears the store.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::DrawInProgress` or `RaffleError::EngineStopped`.
    pub async fn new_session(&self) -> Result<SessionView, RaffleError> {
        self.request(SessionCommand::NewSession).await
    }

    /// Replaces the sound preferences.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::EngineStopped` if the engine has shut down.
    pub async fn update_sound(&self, settings: SoundSettings) -> Result<SessionView, RaffleError> {
        self.request(|reply| SessionCommand::UpdateSound { settings, reply })
            .await
    }

    /// Stops the engine, cancelling any in-flight draw. Waits until the
    /// engine has acknowledged; returns immediately if it already stopped.
    pub async fn shutdown(&self) {
        let (done, acknowledged) = oneshot::channel();
        if self.commands.send(SessionCommand::Shutdown(done)).await.is_ok() {
            let _ = acknowledged.await;
        }
    }

    /// Returns `true` while the engine task is accepting commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

struct SessionEngine {
    session: RaffleSession,
    store: Arc<dyn KeyValueStore>,
    rng: Box<dyn DeterministicRng>,
    clock: Arc<dyn Clock>,
    feedback: Arc<dyn FeedbackSink>,
    timing: DrawTiming,
    commands: mpsc::Receiver<SessionCommand>,
    commit_timer: Option<Pin<Box<Sleep>>>,
    ticker: Option<Interval>,
}

async fn commit_due(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

impl SessionEngine {
    async fn run(mut self) {
        info!(
            pending = self.session.pending().len(),
            drawn = self.session.drawn().len(),
            "session engine started"
        );
        loop {
            // Commit is polled first: a tick due at the same instant as the
            // commit is dropped, never delivered after it.
            tokio::select! {
                biased;
                () = commit_due(&mut self.commit_timer) => self.commit().await,
                () = next_tick(&mut self.ticker) => self.tick(),
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown(done)) => {
                        let _ = done.send(());
                        break;
                    }
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }
        if self.session.is_rolling() {
            warn!("session engine stopped with a draw in flight; draw cancelled");
        }
        info!("session engine stopped");
    }

    fn view(&self) -> SessionView {
        SessionView::from(&self.session)
    }

    async fn persist(&self) {
        persistence::persist_session(self.store.as_ref(), &self.session).await;
    }

    /// Applies a registry mutation, persisting and replying with the new view.
    async fn mutate(
        &mut self,
        reply: Reply<SessionView>,
        op: impl FnOnce(&mut RaffleSession) -> Result<(), RaffleError>,
    ) {
        let result = op(&mut self.session);
        let response = match result {
            Ok(()) => {
                self.persist().await;
                Ok(self.view())
            }
            Err(err) => {
                debug!(error = %err, "session command rejected");
                Err(err)
            }
        };
        let _ = reply.send(response);
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::View(reply) => {
                let _ = reply.send(Ok(self.view()));
            }
            SessionCommand::Add { name, reply } => {
                self.mutate(reply, |session| {
                    let added = session.add_participant(&name)?;
                    info!(name = added, "participant added");
                    Ok(())
                })
                .await;
            }
            SessionCommand::BeginEdit { index, reply } => {
                let result = self.session.begin_edit(index).map(str::to_owned);
                let _ = reply.send(result);
            }
            SessionCommand::CancelEdit(reply) => {
                self.session.cancel_edit();
                let _ = reply.send(Ok(self.view()));
            }
            SessionCommand::Edit { index, name, reply } => {
                self.mutate(reply, |session| {
                    session.edit_participant(index, &name)?;
                    info!(index, "participant edited");
                    Ok(())
                })
                .await;
            }
            SessionCommand::Remove { index, reply } => {
                self.mutate(reply, |session| {
                    let removed = session.remove_participant(index)?;
                    info!(index, name = %removed, "participant removed");
                    Ok(())
                })
                .await;
            }
            SessionCommand::Draw(reply) => {
                let _ = reply.send(Ok(self.start_draw()));
            }
            SessionCommand::Restart(reply) => {
                self.mutate(reply, |session| {
                    session.restart_keeping_participants()?;
                    info!(pending = session.pending().len(), "draw restarted, participants kept");
                    Ok(())
                })
                .await;
            }
            SessionCommand::NewSession(reply) => {
                let response = match self.session.reset_for_new_session() {
                    Ok(()) => {
                        persistence::clear_store(self.store.as_ref()).await;
                        info!("new session started");
                        Ok(self.view())
                    }
                    Err(err) => Err(err),
                };
                let _ = reply.send(response);
            }
            SessionCommand::UpdateSound { settings, reply } => {
                self.session.update_sound(settings);
                persistence::persist_sound(self.store.as_ref(), self.session.sound()).await;
                let _ = reply.send(Ok(self.view()));
            }
            SessionCommand::Shutdown(done) => {
                let _ = done.send(());
            }
        }
    }

    fn start_draw(&mut self) -> Option<DrawTicket> {
        let ticket = self
            .session
            .begin_draw(self.rng.as_mut(), self.clock.as_ref())?;
        let now = Instant::now();
        self.commit_timer = Some(Box::pin(tokio::time::sleep_until(
            now + self.timing.roll_duration,
        )));
        let mut ticker =
            tokio::time::interval_at(now + self.timing.tick_period, self.timing.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        info!(
            draw_id = %ticket.draw_id,
            candidates = self.session.pending().len(),
            "draw started"
        );
        Some(ticket)
    }

    fn tick(&mut self) {
        if let Some(candidate) = self.session.roll_tick(self.rng.as_mut()) {
            debug!(candidate, "rolling");
            self.emit(FeedbackEvent::Tick);
        }
    }

    async fn commit(&mut self) {
        self.ticker = None;
        self.commit_timer = None;
        let draw_id = self.session.rolling().map(|draw| draw.draw_id);
        let Some(name) = self.session.commit_draw() else {
            return;
        };
        self.persist().await;
        info!(
            draw_id = ?draw_id,
            name = %name,
            remaining = self.session.pending().len(),
            "draw committed"
        );
        self.emit(FeedbackEvent::Reveal);
    }

    fn emit(&self, event: FeedbackEvent) {
        self.feedback
            .emit(FeedbackCue::new(event, &self.session.sound()));
    }
}

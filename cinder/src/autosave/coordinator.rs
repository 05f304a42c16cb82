//! Dual-cadence autosave for one open note
//!
//! A frequent draft timer writes the serialized note to the local draft store;
//! a slow remote timer saves it to the authoritative store. Losing focus
//! triggers an out-of-band remote save and closing flushes a final draft.
//!
//! Concurrency:
//! * `remote_flight` is held for a whole remote attempt, network call
//!   included, so saves reach the remote store in the order they started.
//! * `persist_gate` orders every draft write or delete against the start and
//!   the completion of remote attempts. It is not held across the network
//!   call, which lets [`AutosaveCoordinator::close`] run while a save is in
//!   flight; that save is superseded and its result ignored.
//! * `session` guards the document and its [`AutosaveState`] and is only held
//!   for short, I/O-free sections.

use super::event::{AutosaveEvent, DraftOutcome, FocusTarget, SaveOutcome};
use super::state::{AutosaveState, DraftAction, RemoteAction, RemoteOutcome, SaveTrigger};
use super::store::{DocumentId, Draft, DraftStore, RemoteStore, StoreError};
use crate::document_model::Document;
use crate::markdown_parser::parse;
use crate::markdown_serializer::serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};

/// Default period of the local draft timer
pub const DEFAULT_DRAFT_INTERVAL: Duration = Duration::from_secs(5);

/// Default period of the remote save timer
pub const DEFAULT_REMOTE_INTERVAL: Duration = Duration::from_secs(120);

const EVENT_CAPACITY: usize = 64;

/// Timer periods; `None` disables a timer so ticks are driven by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub draft: Option<Duration>,
    pub remote: Option<Duration>,
}

impl Cadence {
    /// No timers; only explicit ticks, blur and close persist anything
    pub fn manual() -> Self {
        Self {
            draft: None,
            remote: None,
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            draft: Some(DEFAULT_DRAFT_INTERVAL),
            remote: Some(DEFAULT_REMOTE_INTERVAL),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TimerKind {
    Draft,
    Remote,
}

struct Session {
    document: Document,
    state: AutosaveState,
}

struct Shared<R, D> {
    id: DocumentId,
    draft_key: String,
    remote: R,
    drafts: D,
    session: Mutex<Session>,
    persist_gate: Mutex<()>,
    remote_flight: Mutex<()>,
    events: broadcast::Sender<AutosaveEvent>,
}

impl<R: RemoteStore, D: DraftStore> Shared<R, D> {
    fn emit(&self, event: AutosaveEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn report_dirty(&self, state: &mut AutosaveState) {
        if let Some(dirty) = state.take_dirty_change() {
            self.emit(AutosaveEvent::DirtyChanged(dirty));
        }
    }

    async fn draft_tick(&self) -> DraftOutcome {
        let _gate = self.persist_gate.lock().await;

        let action = {
            let mut session = self.session.lock().await;
            let Session { document, state } = &mut *session;
            let action = state.draft_tick(|| serialize(document));
            self.report_dirty(state);
            action
        };

        let outcome = self.apply_draft_action(action).await;
        if outcome == DraftOutcome::Failed {
            self.session.lock().await.state.draft_write_failed();
        }
        outcome
    }

    async fn apply_draft_action(&self, action: DraftAction) -> DraftOutcome {
        match action {
            DraftAction::Idle => DraftOutcome::Idle,
            DraftAction::Discard => match self.drafts.delete_draft(&self.draft_key).await {
                Ok(()) => {
                    log::debug!("Discarded draft of {}", self.id);
                    self.emit(AutosaveEvent::DraftDiscarded);
                    DraftOutcome::Discarded
                }
                Err(e) => {
                    log::warn!("Failed to discard draft of {}: {}", self.id, e);
                    self.emit(AutosaveEvent::DraftFailed(e.to_string()));
                    DraftOutcome::Failed
                }
            },
            DraftAction::Write(text) => {
                let draft = Draft::now(text);
                match self.drafts.write_draft(&self.draft_key, &draft).await {
                    Ok(()) => {
                        log::debug!("Wrote draft of {} ({} bytes)", self.id, draft.content.len());
                        self.emit(AutosaveEvent::DraftWritten {
                            saved_at: draft.saved_at,
                        });
                        DraftOutcome::Written
                    }
                    Err(e) => {
                        log::warn!("Failed to write draft of {}: {}", self.id, e);
                        self.emit(AutosaveEvent::DraftFailed(e.to_string()));
                        DraftOutcome::Failed
                    }
                }
            }
        }
    }

    async fn save_remote(&self, trigger: SaveTrigger) -> SaveOutcome {
        let _flight = self.remote_flight.lock().await;

        let ticket = {
            let _gate = self.persist_gate.lock().await;
            let mut session = self.session.lock().await;
            let Session { document, state } = &mut *session;
            let action = state.begin_remote_save(trigger, || serialize(document));
            self.report_dirty(state);
            match action {
                RemoteAction::Idle => return SaveOutcome::Idle,
                RemoteAction::Unchanged => return SaveOutcome::Unchanged,
                RemoteAction::Save(ticket) => ticket,
            }
        };

        let attempt = ticket.attempt;
        log::debug!("Saving {} (attempt {}, {:?})", self.id, attempt, trigger);
        let failure = self
            .remote
            .save(&self.id, &ticket.text)
            .await
            .err()
            .map(|e| e.to_string());

        let _gate = self.persist_gate.lock().await;
        let outcome = {
            let mut session = self.session.lock().await;
            let outcome = session.state.finish_remote_save(ticket, failure.is_none());
            self.report_dirty(&mut session.state);
            outcome
        };

        match outcome {
            RemoteOutcome::Saved { draft_redundant } => {
                log::info!("Saved note {}", self.id);
                self.emit(AutosaveEvent::RemoteSaved);
                if draft_redundant {
                    if let Err(e) = self.drafts.delete_draft(&self.draft_key).await {
                        log::warn!("Failed to remove draft of {}: {}", self.id, e);
                    }
                }
                SaveOutcome::Saved
            }
            RemoteOutcome::Failed => {
                let message = failure.unwrap_or_default();
                log::warn!("Saving {} failed, keeping draft: {}", self.id, message);
                self.emit(AutosaveEvent::RemoteFailed(message));
                SaveOutcome::Failed
            }
            RemoteOutcome::Stale => {
                log::debug!("Ignoring superseded save attempt {} of {}", attempt, self.id);
                self.emit(AutosaveEvent::StaleSaveDiscarded { attempt });
                SaveOutcome::Stale
            }
        }
    }

    async fn close(&self) -> DraftOutcome {
        let _gate = self.persist_gate.lock().await;
        let action = {
            let mut session = self.session.lock().await;
            let Session { document, state } = &mut *session;
            state.close(|| serialize(document))
        };
        self.apply_draft_action(action).await
    }
}

fn spawn_timer<R, D>(
    shared: Arc<Shared<R, D>>,
    kind: TimerKind,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    R: RemoteStore + 'static,
    D: DraftStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            if *shutdown.borrow() {
                break;
            }
            match kind {
                TimerKind::Draft => {
                    shared.draft_tick().await;
                }
                TimerKind::Remote => {
                    shared.save_remote(SaveTrigger::Timer).await;
                }
            }
        }
        log::debug!("{:?} timer of {} stopped", kind, shared.id);
    });
}

/// Autosave coordinator owning one open note
///
/// All edits go through [`edit`](Self::edit) so every mutation marks the
/// note dirty. Timers run on the current tokio runtime until
/// [`close`](Self::close) is called or the coordinator is dropped.
pub struct AutosaveCoordinator<R: RemoteStore + 'static, D: DraftStore + 'static> {
    shared: Arc<Shared<R, D>>,
    shutdown: watch::Sender<bool>,
    restored_draft: bool,
}

impl<R: RemoteStore + 'static, D: DraftStore + 'static> AutosaveCoordinator<R, D> {
    /// Open a note
    ///
    /// Loads the saved text, then looks for a draft. A draft that differs from
    /// the saved text wins and leaves the note dirty; a draft equal to it is
    /// deleted. An unreadable draft is logged and ignored.
    ///
    /// # Returns
    /// * `Ok(AutosaveCoordinator)` - The note is open and its timers running
    /// * `Err(StoreError)` - The saved text could not be loaded
    pub async fn open(
        id: DocumentId,
        remote: R,
        drafts: D,
        cadence: Cadence,
    ) -> Result<Self, StoreError> {
        let saved = remote.load(&id).await?;
        let draft_key = id.draft_key();

        let draft = match drafts.read_draft(&draft_key).await {
            Ok(draft) => draft,
            Err(e) => {
                log::warn!("Ignoring unreadable draft of {}: {}", id, e);
                None
            }
        };

        let mut state = AutosaveState::new(id.clone(), saved.as_str());
        let mut restored_draft = false;
        let text = match draft {
            Some(draft) if draft.content != saved => {
                log::info!("Restoring unsaved draft of {} from {}", id, draft.saved_at);
                state.record_mutation();
                state.take_dirty_change();
                restored_draft = true;
                draft.content
            }
            Some(_) => {
                log::debug!("Draft of {} matches the saved note, removing it", id);
                if let Err(e) = drafts.delete_draft(&draft_key).await {
                    log::warn!("Failed to remove draft of {}: {}", id, e);
                }
                saved
            }
            None => saved,
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            id,
            draft_key,
            remote,
            drafts,
            session: Mutex::new(Session {
                document: parse(&text),
                state,
            }),
            persist_gate: Mutex::new(()),
            remote_flight: Mutex::new(()),
            events,
        });

        let (shutdown, _) = watch::channel(false);
        if let Some(period) = cadence.draft {
            spawn_timer(shared.clone(), TimerKind::Draft, period, shutdown.subscribe());
        }
        if let Some(period) = cadence.remote {
            spawn_timer(shared.clone(), TimerKind::Remote, period, shutdown.subscribe());
        }

        Ok(Self {
            shared,
            shutdown,
            restored_draft,
        })
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.shared.id
    }

    /// Whether the note was opened from a draft rather than the saved text
    pub fn restored_draft(&self) -> bool {
        self.restored_draft
    }

    /// Receive autosave notifications
    pub fn subscribe(&self) -> broadcast::Receiver<AutosaveEvent> {
        self.shared.events.subscribe()
    }

    /// Mutate the document and mark it dirty
    pub async fn edit<T>(&self, f: impl FnOnce(&mut Document) -> T) -> T {
        let mut session = self.shared.session.lock().await;
        let result = f(&mut session.document);
        session.state.record_mutation();
        self.shared.report_dirty(&mut session.state);
        result
    }

    /// Replace the whole document with parsed markdown
    pub async fn replace_markdown(&self, markdown: &str) {
        let parsed = parse(markdown);
        self.edit(|doc| *doc = parsed).await;
    }

    /// Read the document
    pub async fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        let session = self.shared.session.lock().await;
        f(&session.document)
    }

    /// Serialize the current document
    pub async fn markdown(&self) -> String {
        self.read(serialize).await
    }

    /// Unsaved changes relative to the remote store
    pub async fn is_dirty(&self) -> bool {
        self.shared.session.lock().await.state.is_dirty()
    }

    /// Run the local draft step now
    pub async fn draft_tick(&self) -> DraftOutcome {
        self.shared.draft_tick().await
    }

    /// Run the remote save step now
    pub async fn remote_tick(&self) -> SaveOutcome {
        self.shared.save_remote(SaveTrigger::Timer).await
    }

    /// The editor lost focus
    ///
    /// Saves immediately unless focus moved to the formatting toolbar.
    pub async fn on_blur(&self, focus: FocusTarget) -> SaveOutcome {
        if focus == FocusTarget::Toolbar {
            log::debug!("Focus moved to the toolbar, not saving {}", self.shared.id);
            return SaveOutcome::Skipped;
        }
        self.shared.save_remote(SaveTrigger::Blur).await
    }

    /// Close the note
    ///
    /// Stops both timers and flushes a final draft if there are unsaved
    /// edits. A remote save still in flight completes but its result is
    /// ignored. Edits made after closing are not persisted.
    pub async fn close(&self) -> DraftOutcome {
        let _ = self.shutdown.send(true);
        let outcome = self.shared.close().await;
        log::debug!("Closed {} ({:?})", self.shared.id, outcome);
        outcome
    }
}

impl<R: RemoteStore + 'static, D: DraftStore + 'static> Drop for AutosaveCoordinator<R, D> {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

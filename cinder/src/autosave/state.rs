//! Per-document autosave state and its transitions
//!
//! Every event the coordinator sees (mutation, draft tick, remote tick, blur,
//! close) maps to exactly one method here. The methods never do I/O; they
//! decide what should be persisted and update the dirty flags. The document
//! snapshot is passed in lazily so the serializer only runs when a path is
//! actually dirty.

use super::store::DocumentId;

/// What caused a remote save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// Periodic remote tick; skipped when nothing changed since the last save
    Timer,
    /// Editor lost focus; compares content even when no edit was observed
    Blur,
}

/// Decision for the local draft slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftAction {
    /// Nothing to do
    Idle,
    /// Content matches the authoritative text; delete the draft slot
    Discard,
    /// Write this content to the draft slot
    Write(String),
}

/// Decision for a remote save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
    /// Not dirty, or the document is closed
    Idle,
    /// Serialized content equals the authoritative text; flag cleared
    Unchanged,
    /// Send the ticket's text to the remote store
    Save(SaveTicket),
}

/// An in-flight remote save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    /// Monotonic attempt number
    pub attempt: u64,
    /// Text being saved
    pub text: String,
    /// Edit generation at the time the snapshot was taken
    generation: u64,
}

/// How a finished remote save was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The authoritative text was updated
    Saved {
        /// No edit happened while the save was in flight, so the local draft
        /// holds nothing the store lacks
        draft_redundant: bool,
    },
    /// The store rejected the save; flags and draft are left alone
    Failed,
    /// A newer attempt (or close) superseded this one; result ignored
    Stale,
}

/// Autosave bookkeeping for one open document
#[derive(Debug, Clone)]
pub struct AutosaveState {
    document_id: DocumentId,

    /// Text last confirmed persisted to (or loaded from) the remote store
    last_authoritative: String,

    dirty_remote: bool,
    dirty_draft: bool,

    /// Incremented on every mutation
    edit_generation: u64,

    /// Last attempt number handed out
    next_attempt: u64,

    /// Newest attempt that was applied or that superseded older ones;
    /// completions at or below it are stale
    newest_settled: u64,

    /// Dirty state last reported to subscribers
    reported_dirty: bool,

    closed: bool,
}

impl AutosaveState {
    /// Create clean state for a document whose stored text is `authoritative`
    pub fn new(document_id: DocumentId, authoritative: impl Into<String>) -> Self {
        Self {
            document_id,
            last_authoritative: authoritative.into(),
            dirty_remote: false,
            dirty_draft: false,
            edit_generation: 0,
            next_attempt: 0,
            newest_settled: 0,
            reported_dirty: false,
            closed: false,
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn last_authoritative_text(&self) -> &str {
        &self.last_authoritative
    }

    /// Unsaved changes relative to the remote store
    pub fn is_dirty(&self) -> bool {
        self.dirty_remote
    }

    pub fn is_remote_dirty(&self) -> bool {
        self.dirty_remote
    }

    pub fn is_draft_dirty(&self) -> bool {
        self.dirty_draft
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The tree changed
    pub fn record_mutation(&mut self) {
        self.dirty_remote = true;
        self.dirty_draft = true;
        self.edit_generation += 1;
    }

    /// Report a change of [`is_dirty`](Self::is_dirty) since the last call
    ///
    /// # Returns
    /// * `Some(dirty)` - The dirty state flipped to `dirty`
    /// * `None` - Unchanged since the last report
    pub fn take_dirty_change(&mut self) -> Option<bool> {
        let dirty = self.is_dirty();
        (dirty != self.reported_dirty).then(|| {
            self.reported_dirty = dirty;
            dirty
        })
    }

    /// Local draft tick
    ///
    /// Content equal to the authoritative text means the edits converged back
    /// to the saved state: the draft is discarded and both flags clear.
    pub fn draft_tick(&mut self, snapshot: impl FnOnce() -> String) -> DraftAction {
        if self.closed || !self.dirty_draft {
            return DraftAction::Idle;
        }

        let text = snapshot();
        self.dirty_draft = false;
        if text == self.last_authoritative {
            self.dirty_remote = false;
            DraftAction::Discard
        } else {
            DraftAction::Write(text)
        }
    }

    /// The draft write decided by [`draft_tick`](Self::draft_tick) failed;
    /// retry on the next tick
    pub fn draft_write_failed(&mut self) {
        self.dirty_draft = true;
    }

    /// Start a remote save attempt
    pub fn begin_remote_save(
        &mut self,
        trigger: SaveTrigger,
        snapshot: impl FnOnce() -> String,
    ) -> RemoteAction {
        if self.closed || (trigger == SaveTrigger::Timer && !self.dirty_remote) {
            return RemoteAction::Idle;
        }

        let text = snapshot();
        if text == self.last_authoritative {
            self.dirty_remote = false;
            return RemoteAction::Unchanged;
        }

        self.next_attempt += 1;
        RemoteAction::Save(SaveTicket {
            attempt: self.next_attempt,
            text,
            generation: self.edit_generation,
        })
    }

    /// Apply the result of a remote save attempt
    ///
    /// A success only clears the dirty flags when no edit landed while the
    /// save was in flight; otherwise the newer edits stay pending.
    pub fn finish_remote_save(&mut self, ticket: SaveTicket, succeeded: bool) -> RemoteOutcome {
        if ticket.attempt <= self.newest_settled {
            return RemoteOutcome::Stale;
        }
        if !succeeded {
            return RemoteOutcome::Failed;
        }

        self.last_authoritative = ticket.text;
        self.newest_settled = ticket.attempt;

        let draft_redundant = ticket.generation == self.edit_generation;
        if draft_redundant {
            self.dirty_remote = false;
            self.dirty_draft = false;
        }
        RemoteOutcome::Saved { draft_redundant }
    }

    /// Close the document
    ///
    /// Supersedes every attempt still in flight and decides the final draft
    /// flush. Returns [`DraftAction::Discard`] when pending edits converged
    /// back to the authoritative text, so no outdated draft survives.
    pub fn close(&mut self, snapshot: impl FnOnce() -> String) -> DraftAction {
        if self.closed {
            return DraftAction::Idle;
        }
        self.closed = true;
        self.next_attempt += 1;
        self.newest_settled = self.next_attempt;

        if !(self.dirty_remote || self.dirty_draft) {
            return DraftAction::Idle;
        }

        let text = snapshot();
        if text == self.last_authoritative {
            DraftAction::Discard
        } else {
            DraftAction::Write(text)
        }
    }
}

//! Notifications and results emitted by the autosave coordinator

/// Broadcast to every [`subscribe`](super::AutosaveCoordinator::subscribe)r
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    /// The note gained or lost unsaved changes relative to the remote store
    DirtyChanged(bool),
    /// A draft was written; timestamp in Unix milliseconds
    DraftWritten { saved_at: i64 },
    /// The draft slot was cleared because the content matches the saved note
    DraftDiscarded,
    /// Writing the draft failed; retried on the next draft tick
    DraftFailed(String),
    /// The remote store accepted a save
    RemoteSaved,
    /// The remote store rejected a save; the draft is kept
    RemoteFailed(String),
    /// A save finished after a newer attempt or close and was ignored
    StaleSaveDiscarded { attempt: u64 },
}

/// Where keyboard focus went when the editor lost it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// A formatting toolbar attached to the editor
    Toolbar,
    /// Anywhere else
    Elsewhere,
    /// Focus left the window
    Nothing,
}

/// Result of one draft tick or of the draft flush on close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    Idle,
    Written,
    Discarded,
    Failed,
}

/// Result of one remote save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed since the last save
    Idle,
    /// Edits converged back to the saved text; no request sent
    Unchanged,
    Saved,
    Failed,
    /// The store answered after the attempt was superseded
    Stale,
    /// Focus moved to the toolbar; no attempt made
    Skipped,
}

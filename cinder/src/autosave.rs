//! Autosave for open notes
//!
//! Keeps edits safe on two cadences: a frequent local draft for crash
//! recovery and a slower save to the authoritative note store.

mod coordinator;
mod event;
mod file_store;
mod state;
mod store;

pub use coordinator::{AutosaveCoordinator, Cadence, DEFAULT_DRAFT_INTERVAL, DEFAULT_REMOTE_INTERVAL};
pub use event::{AutosaveEvent, DraftOutcome, FocusTarget, SaveOutcome};
pub use file_store::{FileDraftStore, FileRemoteStore};
pub use state::{AutosaveState, DraftAction, RemoteAction, RemoteOutcome, SaveTicket, SaveTrigger};
pub use store::{
    DocumentId, Draft, DraftStore, MemoryDraftStore, MemoryRemoteStore, RemoteStore, StoreError,
    DRAFT_KEY_PREFIX,
};

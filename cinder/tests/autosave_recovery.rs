use cinder::autosave::{
    AutosaveCoordinator, AutosaveEvent, Cadence, DocumentId, DraftOutcome, DraftStore,
    FileDraftStore, FileRemoteStore, FocusTarget, MemoryDraftStore, MemoryRemoteStore,
    RemoteStore, SaveOutcome,
};
use cinder::config::CinderConfig;
use cinder::document_model::{Block, Inline, ListItem, ListKind};
use std::path::Path;
use std::time::Duration;

async fn open_files(
    root: &Path,
    id: &DocumentId,
) -> AutosaveCoordinator<FileRemoteStore, FileDraftStore> {
    AutosaveCoordinator::open(
        id.clone(),
        FileRemoteStore::new(root.join("notes")),
        FileDraftStore::new(root.join("drafts")),
        Cadence::manual(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_draft_survives_crash_and_is_recovered() {
    // Arrange: A saved note on disk
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new("journal");
    FileRemoteStore::new(dir.path().join("notes"))
        .save(&id, "# Journal")
        .await
        .unwrap();

    // Act: Edit and write a draft, then drop the note without closing it
    {
        let note = open_files(dir.path(), &id).await;
        note.edit(|doc| doc.push_block(Block::Paragraph(vec![Inline::plain("Dear diary")])))
            .await;
        assert_eq!(note.draft_tick().await, DraftOutcome::Written);
    }

    // Assert: Stored note untouched, draft on disk
    let notes = FileRemoteStore::new(dir.path().join("notes"));
    let drafts = FileDraftStore::new(dir.path().join("drafts"));
    assert_eq!(notes.load(&id).await.unwrap(), "# Journal");
    assert_eq!(drafts.list_keys().unwrap(), vec!["cinder_draft_journal"]);

    // Reopening restores the draft and a blur saves it
    let note = open_files(dir.path(), &id).await;
    assert!(note.restored_draft());
    assert_eq!(note.markdown().await, "# Journal\nDear diary");
    assert_eq!(note.on_blur(FocusTarget::Elsewhere).await, SaveOutcome::Saved);
    assert_eq!(note.close().await, DraftOutcome::Idle);

    assert_eq!(notes.load(&id).await.unwrap(), "# Journal\nDear diary");
    assert!(drafts.list_keys().unwrap().is_empty());
}

#[tokio::test]
async fn test_close_keeps_unsaved_edits_as_draft() {
    let dir = tempfile::tempdir().unwrap();
    let id = DocumentId::new("todo");

    let note = open_files(dir.path(), &id).await;
    note.edit(|doc| {
        let mut list = cinder::document_model::List::new(ListKind::Checklist);
        list.push_item(ListItem::checklist(false, vec![Inline::plain("milk")]))
            .unwrap();
        doc.replace_with(cinder::document_model::Document::from_blocks(vec![Block::List(list)]));
    })
    .await;
    assert_eq!(note.close().await, DraftOutcome::Written);

    let draft = FileDraftStore::new(dir.path().join("drafts"))
        .read_draft(&id.draft_key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.content, "- [ ] milk");
    assert!(draft.saved_at > 0);
}

#[tokio::test(start_paused = true)]
async fn test_configured_cadence_drives_saves() {
    // Arrange: Short intervals from a config file
    let config: CinderConfig =
        toml::from_str("[autosave]\ndraft_interval_ms = 1000\nremote_interval_ms = 10000\n")
            .unwrap();
    let id = DocumentId::new("n");
    let remote = MemoryRemoteStore::with_notes([("n", "start")]);
    let drafts = MemoryDraftStore::new();
    let note = AutosaveCoordinator::open(
        id.clone(),
        remote.clone(),
        drafts.clone(),
        config.autosave.cadence(),
    )
    .await
    .unwrap();
    let mut events = note.subscribe();

    // Act: One edit, then let both timers fire
    note.replace_markdown("start\nmore").await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let draft_written = drafts.get(&id.draft_key()).await.is_some();
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Assert: Draft first, then one remote save that clears it
    assert!(draft_written);
    assert_eq!(remote.save_count(), 1);
    assert_eq!(remote.text(&id).await.as_deref(), Some("start\nmore"));
    assert!(drafts.is_empty().await);

    let received: Vec<AutosaveEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert_eq!(received.first(), Some(&AutosaveEvent::DirtyChanged(true)));
    assert!(received.contains(&AutosaveEvent::RemoteSaved));
    assert!(received.contains(&AutosaveEvent::DirtyChanged(false)));

    note.close().await;
}

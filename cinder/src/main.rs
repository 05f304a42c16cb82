//! cinder - markdown notes with crash-safe autosave
//!
//! Command-line front end for the cinder note engine: canonicalise and
//! inspect markdown files, render previews, and save or recover notes
//! through the autosave coordinator.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]

mod cli;

use anyhow::{Context, Result};
use cinder::autosave::{
    AutosaveCoordinator, Cadence, DocumentId, DraftOutcome, DraftStore, FileDraftStore,
    FileRemoteStore, SaveOutcome,
};
use cinder::config::{CinderConfig, StorageSettings};
use cinder::document_model::{Block, ListItemContent};
use cinder::{markdown_parser, markdown_serializer};
use clap::Parser;
use cli::{Cli, Commands, DraftsAction};
use std::path::{Path, PathBuf};

/// Main entry point for the cinder CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    match cli.command {
        Commands::Normalize {
            file,
            output,
            check,
        } => handle_normalize_command(&file, output.as_deref(), check),

        Commands::Inspect { file } => handle_inspect_command(&file),

        Commands::Preview { file, output } => handle_preview_command(&file, output.as_deref()),

        Commands::Save { id, file } => {
            let storage = load_storage(&cli.config)?;
            block_on(handle_save_command(storage, DocumentId::new(id), &file))
        }

        Commands::Recover { id } => {
            let storage = load_storage(&cli.config)?;
            block_on(handle_recover_command(storage, DocumentId::new(id)))
        }

        Commands::Drafts { action } => {
            let storage = load_storage(&cli.config)?;
            block_on(handle_drafts_command(storage, action))
        }
    }
}

/// Load the storage settings, resolving directories next to the config file
fn load_storage(config_path: &Path) -> Result<StorageSettings> {
    let config = CinderConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok(config.storage.resolved(&base))
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(future)
}

fn read_markdown(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Successfully wrote: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Handle the normalize command
fn handle_normalize_command(file: &Path, output: Option<&Path>, check: bool) -> Result<()> {
    let text = read_markdown(file)?;
    let canonical = markdown_serializer::serialize(&markdown_parser::parse(&text));

    if check {
        if canonical != text {
            anyhow::bail!("{} is not in canonical form", file.display());
        }
        println!("✓ {} is canonical", file.display());
        return Ok(());
    }

    write_or_print(output, &canonical)
}

/// Handle the inspect command
fn handle_inspect_command(file: &Path) -> Result<()> {
    let text = read_markdown(file)?;
    let doc = markdown_parser::parse(&text);

    println!("{}", file.display());
    for (index, block) in doc.blocks().iter().enumerate() {
        println!("  {:>3}  {}", index + 1, describe_block(block));
    }
    println!();
    println!("Blocks: {}", doc.block_count());
    println!("Words:  {}", doc.word_count());

    match doc.validate() {
        Ok(()) => println!("✓ Structure is valid"),
        Err(e) => println!("✗ {}", e),
    }
    Ok(())
}

fn describe_block(block: &Block) -> String {
    match block {
        Block::Heading { level, .. } => format!("heading h{}: {}", level, preview_text(block)),
        Block::Paragraph(content) if content.is_empty() => "blank".to_string(),
        Block::Paragraph(_) => format!("paragraph: {}", preview_text(block)),
        Block::Quote(_) => format!("quote: {}", preview_text(block)),
        Block::CodeBlock { language, code } => format!(
            "code ({}): {} lines",
            language.as_deref().unwrap_or("plain"),
            code.lines().count()
        ),
        Block::List(list) => {
            let nested = list
                .items()
                .iter()
                .filter(|item| matches!(item.content(), ListItemContent::Nested(_)))
                .count();
            format!(
                "{:?} list: {} items, {} nested",
                list.kind(),
                list.len() - nested,
                nested
            )
        }
    }
}

fn preview_text(block: &Block) -> String {
    const LIMIT: usize = 48;
    let text = block.plain_text();
    if text.chars().count() <= LIMIT {
        return text;
    }
    let cut: String = text.chars().take(LIMIT).collect();
    format!("{}…", cut)
}

/// Handle the preview command
fn handle_preview_command(file: &Path, output: Option<&Path>) -> Result<()> {
    let text = read_markdown(file)?;
    let canonical = markdown_serializer::serialize(&markdown_parser::parse(&text));
    write_or_print(output, &render_html(&canonical))
}

fn render_html(markdown: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

async fn open_note(
    storage: &StorageSettings,
    id: DocumentId,
) -> Result<AutosaveCoordinator<FileRemoteStore, FileDraftStore>> {
    let remote = FileRemoteStore::new(&storage.notes_dir);
    let drafts = FileDraftStore::new(&storage.drafts_dir);
    AutosaveCoordinator::open(id.clone(), remote, drafts, Cadence::manual())
        .await
        .with_context(|| format!("Failed to open note {}", id))
}

/// Handle the save command
async fn handle_save_command(storage: StorageSettings, id: DocumentId, file: &Path) -> Result<()> {
    let text = read_markdown(file)?;
    let note = open_note(&storage, id.clone()).await?;
    note.replace_markdown(&text).await;

    let outcome = note.remote_tick().await;
    let flush = note.close().await;

    match outcome {
        SaveOutcome::Saved => println!("✓ Saved note {}", id),
        SaveOutcome::Unchanged | SaveOutcome::Idle => println!("Note {} already up to date", id),
        _ if flush == DraftOutcome::Written => {
            anyhow::bail!("Saving note {} failed; content kept as a local draft", id)
        }
        _ => anyhow::bail!("Saving note {} failed", id),
    }
    Ok(())
}

/// Handle the recover command
async fn handle_recover_command(storage: StorageSettings, id: DocumentId) -> Result<()> {
    let note = open_note(&storage, id.clone()).await?;
    if !note.restored_draft() {
        note.close().await;
        println!("No unsaved draft for note {}", id);
        return Ok(());
    }

    let outcome = note.remote_tick().await;
    note.close().await;
    if outcome != SaveOutcome::Saved {
        anyhow::bail!("Draft of note {} could not be saved; it was kept", id);
    }
    println!("✓ Recovered draft of note {}", id);
    Ok(())
}

/// Handle the drafts command
async fn handle_drafts_command(storage: StorageSettings, action: DraftsAction) -> Result<()> {
    let drafts = FileDraftStore::new(&storage.drafts_dir);

    match action {
        DraftsAction::List => {
            let keys = drafts
                .list_keys()
                .with_context(|| format!("Failed to list {}", storage.drafts_dir.display()))?;
            if keys.is_empty() {
                println!("No drafts");
            }
            for key in keys {
                let Some(id) = DocumentId::from_draft_key(&key) else {
                    continue;
                };
                match drafts.read_draft(&key).await {
                    Ok(Some(draft)) => {
                        let saved_at = draft
                            .saved_at_utc()
                            .map_or_else(|| "unknown time".to_string(), |t| t.to_rfc3339());
                        println!("  {}  {}  {} bytes", id, saved_at, draft.content.len());
                    }
                    Ok(None) => {}
                    Err(e) => println!("  {}  unreadable: {}", id, e),
                }
            }
        }

        DraftsAction::Show { id } => {
            let id = DocumentId::new(id);
            let draft = drafts
                .read_draft(&id.draft_key())
                .await
                .with_context(|| format!("Failed to read draft of note {}", id))?
                .with_context(|| format!("No draft for note {}", id))?;
            println!("{}", draft.content);
        }

        DraftsAction::Discard { id } => {
            let id = DocumentId::new(id);
            drafts
                .delete_draft(&id.draft_key())
                .await
                .with_context(|| format!("Failed to delete draft of note {}", id))?;
            println!("✓ Discarded draft of note {}", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_flag_defaults_to_config_file() {
        let cli = Cli::try_parse_from(["cinder", "inspect", "note.md"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(cinder::config::CONFIG_FILE));
        assert!(matches!(cli.command, Commands::Inspect { .. }));
    }

    #[test]
    fn test_render_html_task_list_and_strikethrough() {
        let html = render_html("- [x] done\n\n~~gone~~");
        assert!(html.contains("checkbox"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_describe_block() {
        let doc = markdown_parser::parse("# Title\n\n1. a\n  - b\n```rs\nfn x() {}\n```");
        let lines: Vec<String> = doc.blocks().iter().map(describe_block).collect();
        assert_eq!(
            lines,
            vec![
                "heading h1: Title",
                "blank",
                "Numbered list: 1 items, 1 nested",
                "code (rs): 1 lines",
            ]
        );
    }

    #[test]
    fn test_preview_text_truncates() {
        let block = Block::Paragraph(vec![cinder::document_model::Inline::plain("x".repeat(60))]);
        let text = preview_text(&block);
        assert_eq!(text.chars().count(), 49);
        assert!(text.ends_with('…'));
    }
}

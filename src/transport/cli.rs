//! CLI transport for direct terminal interaction
//!
//! One-shot runners for corpus management and prompts, plus the TUI chat
//! launcher. The one-shot prompt path drives the same conversation state
//! machine as the TUI, executed synchronously.

use crate::api::{HttpBackend, SearchBackend, UploadFile};
use crate::config::Config;
use crate::core::session::{self, SessionBootstrap, SessionId};
use crate::core::types::SearchMode;
use crate::core::{Conversation, ConversationError, CorpusError, Effect, SessionError};
use crate::tui::TuiApp;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Resolve config, session identity, and an HTTP backend
fn connect(
    url_override: Option<String>,
    session_override: Option<&str>,
) -> Result<(Arc<dyn SearchBackend>, &'static SessionBootstrap, Config)> {
    let working_dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let config = Config::load(&working_dir)?;

    let base_url = url_override.unwrap_or_else(|| config.backend.base_url.clone());
    let base = Url::parse(&base_url).map_err(|e| SessionError::InvalidUrl(e.to_string()))?;

    let bootstrap = session::establish(&base, session_override)?;
    if bootstrap.generated {
        tracing::info!(session = %bootstrap.id, "started a new session");
    }

    let backend = HttpBackend::new(base)?;
    Ok((Arc::new(backend), bootstrap, config))
}

/// Run TUI chat mode
pub async fn run_tui_chat(
    url: Option<String>,
    session: Option<&str>,
    mode: Option<&str>,
) -> Result<()> {
    let initial_mode = mode
        .map(SearchMode::from_str)
        .transpose()
        .context("invalid --mode")?;

    let (backend, bootstrap, config) = connect(url, session)?;
    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms);
    tracing::info!(resume = %bootstrap.resume_url, "resume this session with the printed URL");

    let mut app = TuiApp::new(backend, bootstrap, tick_rate);
    app.run(initial_mode).await?;

    println!("Resume this session: {}", bootstrap.resume_url);
    Ok(())
}

/// Print the established session identity and its resume URL
pub async fn run_session(url: Option<String>, session: Option<&str>) -> Result<()> {
    let (_backend, bootstrap, _config) = connect(url, session)?;
    println!("session: {}", bootstrap.id.to_string().cyan());
    println!("resume:  {}", bootstrap.resume_url);
    Ok(())
}

/// List the session's corpus
pub async fn run_files_list(url: Option<String>, session: Option<&str>) -> Result<()> {
    let (backend, bootstrap, _config) = connect(url, session)?;
    let files = backend
        .list_files(&bootstrap.id)
        .await
        .map_err(CorpusError::Api)?;

    if files.is_empty() {
        println!("{}", "no files in this session's corpus".dimmed());
        return Ok(());
    }
    for file in files {
        println!("{}", file);
    }
    Ok(())
}

/// Upload local files into the session's corpus
pub async fn run_files_add(
    url: Option<String>,
    session: Option<&str>,
    paths: Vec<PathBuf>,
) -> Result<()> {
    let files = paths
        .iter()
        .map(|path| read_upload(path))
        .collect::<Result<Vec<_>, CorpusError>>()?;
    let requested: Vec<String> = files.iter().map(|f| f.name.clone()).collect();

    let (backend, bootstrap, _config) = connect(url, session)?;
    let accepted = backend
        .upload_files(&bootstrap.id, files)
        .await
        .map_err(CorpusError::Api)?;

    // The backend is authoritative: report what it accepted, and call out
    // anything it rejected.
    for name in &accepted {
        println!("{} {}", "added".green(), name);
    }
    for name in requested.iter().filter(|n| !accepted.contains(n)) {
        println!("{} {}", "rejected".red(), name);
    }
    Ok(())
}

/// Remove one file from the session's corpus
pub async fn run_files_remove(
    url: Option<String>,
    session: Option<&str>,
    filename: &str,
) -> Result<()> {
    let (backend, bootstrap, _config) = connect(url, session)?;
    let deleted = backend
        .delete_file(&bootstrap.id, filename)
        .await
        .map_err(CorpusError::Api)?;

    match deleted {
        Some(name) => println!("{} {}", "removed".green(), name),
        None => println!("{} {} was not in the corpus", "unchanged".yellow(), filename),
    }
    Ok(())
}

/// One-shot prompt: load the mode's history, submit, print, persist
pub async fn run_ask(
    url: Option<String>,
    session: Option<&str>,
    mode: &str,
    prompt: &str,
) -> Result<()> {
    let mode = SearchMode::from_str(mode).context("invalid --mode")?;
    let (backend, bootstrap, _config) = connect(url, session)?;

    let mut conversation = Conversation::new();
    let effects = conversation.select_mode(mode);
    for effect in effects {
        apply_effect(&*backend, &bootstrap.id, &mut conversation, effect).await?;
    }

    let effect = conversation.submit(prompt)?;
    apply_effect(&*backend, &bootstrap.id, &mut conversation, effect).await?;

    let entry = conversation
        .entries()
        .last()
        .context("backend returned no completion")?;
    println!("{}", entry.completion.trim());

    if let Some(effect) = conversation.flush_effect() {
        apply_effect(&*backend, &bootstrap.id, &mut conversation, effect).await?;
    }
    Ok(())
}

/// Execute one effect against the backend and feed the result back
async fn apply_effect(
    backend: &dyn SearchBackend,
    session: &SessionId,
    conversation: &mut Conversation,
    effect: Effect,
) -> Result<(), ConversationError> {
    match effect {
        Effect::SaveHistory { mode, entries } => {
            backend.save_history(session, mode, &entries).await?;
        }
        Effect::LoadHistory { mode, generation } => {
            let entries = backend.load_history(session, mode).await?;
            conversation.load_finished(generation, entries);
        }
        Effect::SubmitPrompt {
            mode,
            prompt,
            generation,
        } => {
            let entry = backend.submit_prompt(session, mode, &prompt).await?;
            conversation.prompt_finished(generation, entry);
        }
    }
    Ok(())
}

fn read_upload(path: &PathBuf) -> Result<UploadFile, CorpusError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| CorpusError::NoFilename(path.display().to_string()))?;
    let bytes = std::fs::read(path).map_err(|source| CorpusError::UnreadableFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(UploadFile { name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_upload_reads_name_and_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.pdf");
        std::fs::write(&path, b"content").unwrap();

        let upload = read_upload(&path).unwrap();
        assert_eq!(upload.name, "report.pdf");
        assert_eq!(upload.bytes, b"content");
    }

    #[test]
    fn test_read_upload_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.txt");
        let err = read_upload(&path).unwrap_err();
        assert!(matches!(err, CorpusError::UnreadableFile { .. }));
    }
}

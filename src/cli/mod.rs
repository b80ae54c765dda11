//! Command-line interface for docmind.
//!
//! Provides commands for uploading documents, inspecting their
//! processing lifecycle, reading generated artifacts, and querying the
//! processed set conversationally.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::adapters::{HttpRetriever, MockRetriever, Retriever};
use crate::chat::{ChatEngine, SendOutcome};
use crate::config;
use crate::domain::{ChatMessage, ContentPayload, ContentType, ProcessingStatus, Role};
use crate::ingest::Uploader;
use crate::pipeline::PipelineSimulator;
use crate::poll::{PollConfig, PollHooks, PollState, StatusPoller};
use crate::store::{DocumentStore, JsonStore};

/// docmind - Document intelligence engine
#[derive(Parser, Debug)]
#[command(name = "docmind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Owner identity for all store operations
    #[arg(long, global = true, env = "DOCMIND_OWNER", default_value = "local")]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a PDF and start its processing lifecycle
    Upload {
        /// Path to the PDF file
        file: std::path::PathBuf,
    },

    /// List documents with their current status
    List,

    /// Show one document
    Status {
        /// Document ID (UUID)
        id: String,
    },

    /// Poll a document until it reaches a terminal status or times out
    Watch {
        /// Document ID to watch
        id: String,
    },

    /// Print generated artifacts for a completed document
    Content {
        /// Document ID
        id: String,

        /// Only print one artifact kind
        #[arg(short, long, value_enum)]
        kind: Option<ContentKind>,
    },

    /// Delete a document and its artifacts
    Delete {
        /// Document ID
        id: String,
    },

    /// Mark a document as failed
    Fail {
        /// Document ID
        id: String,
    },

    /// Ask a single question
    Ask {
        /// The question text
        question: String,

        /// Comma-separated document IDs to scope the query (all if omitted)
        #[arg(short, long)]
        docs: Option<String>,
    },

    /// Interactive question/answer session
    Chat {
        /// Comma-separated document IDs to scope queries (all if omitted)
        #[arg(short, long)]
        docs: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContentKind {
    Summary,
    Mindmap,
    Flashcards,
}

impl From<ContentKind> for ContentType {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Summary => ContentType::Summary,
            ContentKind::Mindmap => ContentType::Mindmap,
            ContentKind::Flashcards => ContentType::Flashcards,
        }
    }
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        let owner = self.owner.clone();

        match self.command {
            Commands::Upload { file } => upload(&owner, &file).await,
            Commands::List => list(&owner).await,
            Commands::Status { id } => status(&owner, &id).await,
            Commands::Watch { id } => watch(&owner, &id).await,
            Commands::Content { id, kind } => content(&owner, &id, kind).await,
            Commands::Delete { id } => delete(&owner, &id).await,
            Commands::Fail { id } => fail(&owner, &id).await,
            Commands::Ask { question, docs } => ask(&owner, &question, docs.as_deref()).await,
            Commands::Chat { docs } => chat(&owner, docs.as_deref()).await,
            Commands::Config => show_config(),
        }
    }
}

async fn open_store() -> Result<Arc<JsonStore>> {
    let dir = config::store_dir()?;
    let store = JsonStore::open(&dir)
        .await
        .with_context(|| format!("Failed to open store at {}", dir.display()))?;
    Ok(Arc::new(store))
}

fn simulator(store: Arc<JsonStore>) -> Arc<PipelineSimulator> {
    Arc::new(PipelineSimulator::new(store as Arc<dyn DocumentStore>))
}

/// Pick the configured HTTP backend, or the local mock
fn retriever(store: Arc<JsonStore>, owner: &str) -> Result<Arc<dyn Retriever>> {
    Ok(match &config::config()?.api_url {
        Some(url) => Arc::new(HttpRetriever::new(url.clone())),
        None => Arc::new(MockRetriever::new(store as Arc<dyn DocumentStore>, owner)),
    })
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid document id: {}", raw))
}

fn parse_doc_list(raw: Option<&str>) -> Result<Vec<Uuid>> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_id)
            .collect::<Result<Vec<_>>>()
    })
    .unwrap_or_else(|| Ok(Vec::new()))
}

async fn upload(owner: &str, file: &std::path::Path) -> Result<()> {
    let store = open_store().await?;
    let uploader = Uploader::new(
        simulator(store.clone()),
        config::uploads_dir()?,
        config::config()?.limits.max_upload_bytes,
    );

    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File path has no usable name")?;
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let receipt = uploader.upload(owner, filename, &bytes).await?;

    println!("Uploaded {} as {}", receipt.filename, receipt.document_id);
    println!("Status: {}", receipt.status);
    println!("Run `docmind watch {}` to follow processing.", receipt.document_id);

    // The pipeline runs on this process's timers; stay alive until the
    // document settles so the lifecycle actually completes.
    wait_for_terminal(&store, owner, receipt.document_id).await;

    Ok(())
}

/// Block until the document reaches a terminal status (bounded)
async fn wait_for_terminal(store: &Arc<JsonStore>, owner: &str, id: Uuid) {
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        match store.get_document(owner, id).await {
            Ok(doc) if doc.processing_status.is_terminal() => {
                println!("Status: {}", doc.processing_status);
                return;
            }
            Ok(_) => {}
            Err(_) => return,
        }
    }
}

async fn list(owner: &str) -> Result<()> {
    let store = open_store().await?;
    let docs = simulator(store).ensure_seeded(owner).await?;

    if docs.is_empty() {
        println!("No documents.");
        return Ok(());
    }

    for doc in docs {
        println!(
            "{}  {:<10}  {}  ({})",
            doc.id,
            doc.processing_status.to_string(),
            doc.original_filename,
            doc.uploaded_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}

async fn status(owner: &str, id: &str) -> Result<()> {
    let store = open_store().await?;
    let doc = store.get_document(owner, parse_id(id)?).await?;

    println!("Document:  {}", doc.id);
    println!("Filename:  {}", doc.original_filename);
    println!("Status:    {}", doc.processing_status);
    println!("Uploaded:  {}", doc.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC"));

    Ok(())
}

async fn watch(owner: &str, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let store = open_store().await?;
    let limits = &config::config()?.limits;

    let poll_config = PollConfig {
        enabled: true,
        interval: Duration::from_millis(limits.poll_interval_ms),
        max_duration: Duration::from_millis(limits.max_poll_duration_ms),
    };

    // Refreshes report back through a channel; the poller itself never
    // fetches.
    let (status_tx, mut status_rx) = mpsc::channel::<Option<ProcessingStatus>>(8);
    let (done_tx, mut done_rx) = mpsc::channel::<&'static str>(1);

    let refresh = {
        let store = store.clone();
        let owner = owner.to_string();
        let status_tx = status_tx.clone();
        move || {
            let store = store.clone();
            let owner = owner.clone();
            let status_tx = status_tx.clone();
            tokio::spawn(async move {
                let status = store
                    .get_document(&owner, id)
                    .await
                    .ok()
                    .map(|d| d.processing_status);
                let _ = status_tx.send(status).await;
            });
        }
    };

    let hooks = PollHooks::new()
        .on_complete({
            let tx = done_tx.clone();
            move || {
                let _ = tx.try_send("Processing completed.");
            }
        })
        .on_fail({
            let tx = done_tx.clone();
            move || {
                let _ = tx.try_send("Processing failed.");
            }
        })
        .on_timeout({
            let tx = done_tx.clone();
            move || {
                let _ = tx.try_send("Gave up waiting: polling timed out.");
            }
        });

    let mut poller = StatusPoller::new(poll_config, refresh, hooks);

    let initial = store.get_document(owner, id).await?.processing_status;
    println!("Watching {} (status: {})", id, initial);
    poller.observe(Some(initial));

    if poller.state() == PollState::Terminal {
        if let Some(outcome) = done_rx.recv().await {
            println!("{}", outcome);
        }
        return Ok(());
    }

    loop {
        tokio::select! {
            Some(outcome) = done_rx.recv() => {
                println!("{}", outcome);
                break;
            }
            Some(status) = status_rx.recv() => {
                if let Some(s) = status {
                    println!("Status: {}", s);
                }
                poller.observe(status);
            }
        }
    }

    poller.cancel();
    Ok(())
}

async fn content(owner: &str, id: &str, kind: Option<ContentKind>) -> Result<()> {
    let store = open_store().await?;
    let contents = store.generated_for(owner, parse_id(id)?).await?;

    if contents.is_empty() {
        println!("No generated content yet (document may still be processing).");
        return Ok(());
    }

    let wanted: Option<ContentType> = kind.map(Into::into);

    for content in contents {
        if wanted.is_some_and(|w| w != content.content_type()) {
            continue;
        }

        println!("=== {} ===", content.content_type());
        match &content.payload {
            ContentPayload::Summary { summary } => println!("{}\n", summary),
            ContentPayload::Mindmap(map) => {
                let levels = map.levels();
                for node in map.nodes() {
                    let depth = levels.get(&node.id).copied().unwrap_or(0);
                    println!("{}- {}", "  ".repeat(depth), node.label);
                }
                println!();
            }
            ContentPayload::Flashcards { flashcards } => {
                for (i, card) in flashcards.iter().enumerate() {
                    println!("{}. Q: {}", i + 1, card.question);
                    println!("   A: {}\n", card.answer);
                }
            }
        }
    }

    Ok(())
}

async fn delete(owner: &str, id: &str) -> Result<()> {
    let store = open_store().await?;
    let id = parse_id(id)?;
    store.delete_document(owner, id).await?;
    println!("Deleted {} and its artifacts.", id);
    Ok(())
}

async fn fail(owner: &str, id: &str) -> Result<()> {
    let store = open_store().await?;
    let id = parse_id(id)?;

    // Ownership check on the read path before the status write.
    store.get_document(owner, id).await?;
    let doc = simulator(store).fail_document(id).await?;

    println!("Document {} is now {}.", doc.id, doc.processing_status);
    Ok(())
}

fn print_reply(messages: &[ChatMessage]) {
    let Some(reply) = messages.iter().rev().find(|m| m.role == Role::Assistant) else {
        return;
    };

    println!("\n{}\n", reply.content);
    for source in &reply.sources {
        match source.score {
            Some(score) => println!(
                "  [source] {} p.{} (score {:.2})",
                source.document_id, source.page, score
            ),
            None => println!("  [source] {} p.{}", source.document_id, source.page),
        }
    }
}

async fn ask(owner: &str, question: &str, docs: Option<&str>) -> Result<()> {
    let store = open_store().await?;
    let engine = ChatEngine::new(retriever(store, owner)?);
    engine.select_all(parse_doc_list(docs)?);

    match engine.send(question).await {
        SendOutcome::Sent => print_reply(&engine.messages()),
        SendOutcome::EmptyQuery => println!("Nothing to ask."),
        SendOutcome::Busy => {}
    }

    Ok(())
}

async fn chat(owner: &str, docs: Option<&str>) -> Result<()> {
    let store = open_store().await?;
    let engine = ChatEngine::new(retriever(store, owner)?);
    engine.select_all(parse_doc_list(docs)?);

    println!("Interactive session. Type a question, or 'quit' to exit.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        match engine.send(line).await {
            SendOutcome::Sent => print_reply(&engine.messages()),
            SendOutcome::EmptyQuery => {}
            SendOutcome::Busy => println!("(still answering the previous question)"),
        }
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("home:                 {}", config.home.display());
    match &config.config_file {
        Some(path) => println!("config file:          {}", path.display()),
        None => println!("config file:          (none found)"),
    }
    println!("poll interval:        {} ms", config.limits.poll_interval_ms);
    println!("max poll duration:    {} ms", config.limits.max_poll_duration_ms);
    println!("max upload size:      {} bytes", config.limits.max_upload_bytes);
    match &config.api_url {
        Some(url) => println!("retrieval backend:    {}", url),
        None => println!("retrieval backend:    (local mock)"),
    }

    Ok(())
}

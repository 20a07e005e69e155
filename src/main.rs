use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsearch_cli::transport;

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(author, version, about = "Search uploaded documents with full-text, vector, and chat modes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides config; may carry ?session=...)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Session identifier to resume (overrides the URL parameter)
    #[arg(short, long, global = true)]
    session: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat against the session's corpus (TUI)
    Chat {
        /// Search mode to start in (list, vector, chat)
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// One-shot prompt against the session's corpus
    Ask {
        /// The prompt to submit
        prompt: String,

        /// Search mode to query (list, vector, chat)
        #[arg(short, long, default_value = "list")]
        mode: String,
    },

    /// Manage the session's corpus of uploaded files
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },

    /// Show the session identity and its resume URL
    Session,
}

#[derive(Subcommand)]
enum FilesCommands {
    /// List the files in the corpus
    List,

    /// Upload files into the corpus
    Add {
        /// Paths of the files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove one file from the corpus
    Remove {
        /// Filename to remove (as shown by `files list`)
        filename: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "docsearch_cli=debug"
    } else {
        "docsearch_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let session = cli.session.as_deref();
    match cli.command {
        Commands::Chat { mode } => {
            transport::cli::run_tui_chat(cli.url, session, mode.as_deref()).await?;
        }
        Commands::Ask { prompt, mode } => {
            transport::cli::run_ask(cli.url, session, &mode, &prompt).await?;
        }
        Commands::Files { command } => match command {
            FilesCommands::List => {
                transport::cli::run_files_list(cli.url, session).await?;
            }
            FilesCommands::Add { paths } => {
                transport::cli::run_files_add(cli.url, session, paths).await?;
            }
            FilesCommands::Remove { filename } => {
                transport::cli::run_files_remove(cli.url, session, &filename).await?;
            }
        },
        Commands::Session => {
            transport::cli::run_session(cli.url, session).await?;
        }
    }

    Ok(())
}

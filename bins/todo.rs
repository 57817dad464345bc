//! Command-line front end for the todo store.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use configs::{AppConfig, StorageBackend};
use service::errors::StoreError;
use service::runtime::StoreRuntime;
use service::todos::{CompletionOutcome, TodoId};

#[derive(Parser, Debug)]
#[clap(name = "todo", version = env!("CARGO_PKG_VERSION"), about = "Manage the todo list")]
struct Cli {
    /// Path to the TOML configuration (defaults to CONFIG_PATH or config.toml)
    #[clap(long, global = true)]
    config: Option<String>,
    /// Override the configured storage backend: postgres, file or memory
    #[clap(long, global = true)]
    backend: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every todo
    List,
    /// Add a todo and print its id
    Add { title: String },
    /// Mark a todo completed
    Complete { id: String },
    /// Delete one todo
    Remove { id: String },
    /// Delete every todo
    Reset,
}

fn parse_backend(s: &str) -> anyhow::Result<StorageBackend> {
    match s.to_ascii_lowercase().as_str() {
        "postgres" => Ok(StorageBackend::Postgres),
        "file" => Ok(StorageBackend::File),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(anyhow::anyhow!("unknown backend {other}; expected postgres, file or memory")),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let path = cli.config.clone().unwrap_or_else(configs::config_path);
    let mut cfg = if std::path::Path::new(&path).exists() {
        configs::load_from_file(&path)?
    } else {
        AppConfig::default()
    };
    if let Some(b) = &cli.backend {
        cfg.storage.backend = parse_backend(b)?;
    }
    cfg.normalize_and_validate()?;
    Ok(cfg)
}

async fn execute(rt: &StoreRuntime, command: Command) -> Result<(), StoreError> {
    let store = &rt.store;
    match command {
        Command::List => {
            for todo in store.list().await? {
                let done = if todo.completed { " [OK]" } else { "" };
                println!("{} * {}{}", todo.id, todo.title, done);
            }
        }
        Command::Add { title } => println!("{}", store.create(&title).await?),
        Command::Complete { id } => {
            let id = parse_id(&id)?;
            match store.mark_completed(id).await? {
                CompletionOutcome::Completed => println!("completed"),
                CompletionOutcome::AlreadyCompleted => println!("already completed"),
            }
        }
        Command::Remove { id } => {
            store.delete_one(parse_id(&id)?).await?;
            println!("removed");
        }
        Command::Reset => println!("deleted {}", store.delete_all().await?),
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<TodoId, StoreError> {
    raw.parse().map_err(|_| StoreError::not_found("todo", raw))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    common::utils::logging::init_cli_logging();
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let rt = match StoreRuntime::open(&cfg).await {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("cannot open store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = execute(&rt, cli.command).await;
    if let Err(e) = rt.shutdown().await {
        tracing::warn!(error = %e, "closing store failed");
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(StoreError::NotFound { .. }) => {
            eprintln!("not found");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

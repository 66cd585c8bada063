//! Command-line front-end for the todo API.
//!
//! Renders lists, submits the add/edit forms and toggles the theme. All API
//! access goes through `TodoService`; notifications are printed to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use todo_client::theme::{initial_theme, toggle_theme};
use todo_client::{
    ClientConfig, ClientError, CreateTodo, FileThemeStore, ListQuery, NotificationKind,
    NotificationSink, QueryPolicy, Todo, TodoClient, TodoId, TodoService, UpdateTodo,
    UreqTransport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo", about = "Manage todos on a remote todo API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show todos
    List {
        /// Only completed todos
        #[arg(long, conflicts_with = "pending")]
        completed: bool,
        /// Only open todos
        #[arg(long)]
        pending: bool,
    },
    /// Add a todo
    Add { title: String },
    /// Mark a todo as completed
    Done { id: String },
    /// Mark a todo as open again
    Undo { id: String },
    /// Change a todo's title
    Rename { id: String, title: String },
    /// Delete a todo
    Rm { id: String },
    /// Show or toggle the stored theme
    Theme {
        #[arg(long)]
        toggle: bool,
        /// System preference used when no theme is stored
        #[arg(long)]
        prefers_dark: bool,
    },
}

struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        eprintln!("[{kind}] {message}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // already shown through the notification sink
        Err(err) if err.is::<ClientError>() => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("invalid configuration")?;
    tracing::debug!(api_url = %config.api_url, locale = %config.locale, "configuration loaded");

    let service = TodoService::new(
        TodoClient::new(config.api_url),
        Arc::new(UreqTransport::new()),
        Arc::new(ConsoleSink),
        QueryPolicy::default(),
    );

    match cli.command {
        Command::List { completed, pending } => {
            let query = match (completed, pending) {
                (true, _) => ListQuery::completed(true),
                (_, true) => ListQuery::completed(false),
                _ => ListQuery::default(),
            };
            let list = service.list(&query).await?;
            if list.data.is_empty() {
                println!("No todos yet. Add one with `todo add <title>`.");
            }
            for todo in &list.data {
                println!("{}", render(todo));
            }
            println!("{} todos", list.total());
        }
        Command::Add { title } => {
            let title = validate_title(&title)?;
            let todo = service
                .create(&CreateTodo::new(title))
                .await
                .map_err(show_field_errors)?;
            println!("{}", render(&todo));
        }
        Command::Done { id } => update(&service, id, UpdateTodo::completed(true)).await?,
        Command::Undo { id } => update(&service, id, UpdateTodo::completed(false)).await?,
        Command::Rename { id, title } => {
            let title = validate_title(&title)?;
            update(&service, id, UpdateTodo::title(title)).await?;
        }
        Command::Rm { id } => {
            service.delete(&TodoId::new(id)).await?;
        }
        Command::Theme {
            toggle,
            prefers_dark,
        } => {
            let store = FileThemeStore::new(theme_path());
            let theme = if toggle {
                toggle_theme(&store, prefers_dark)?
            } else {
                initial_theme(&store, prefers_dark)?
            };
            println!("{theme}");
        }
    }
    Ok(())
}

async fn update(service: &TodoService, id: String, input: UpdateTodo) -> anyhow::Result<()> {
    let todo = service
        .update(&TodoId::new(id), &input)
        .await
        .map_err(show_field_errors)?;
    println!("{}", render(&todo));
    Ok(())
}

fn render(todo: &Todo) -> String {
    let mark = if todo.completed { 'x' } else { ' ' };
    format!("[{mark}] {}  {}", todo.id, todo.title)
}

/// Reject blank titles before anything is sent.
fn validate_title(title: &str) -> anyhow::Result<String> {
    let title = title.trim();
    anyhow::ensure!(!title.is_empty(), "title: Title is required");
    Ok(title.to_string())
}

/// Print server-side field messages next to their input names.
fn show_field_errors(err: ClientError) -> ClientError {
    if let Some(fields) = err.fields() {
        for (field, message) in fields {
            eprintln!("  {field}: {message}");
        }
    }
    err
}

fn theme_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todo")
        .join("theme")
}

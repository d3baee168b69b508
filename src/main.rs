mod api;
mod auth;
mod chat;
mod config;
mod error;
mod metrics;
mod session;
mod store;
mod ui;
mod utils;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ApiClient;
use crate::api::models::TaskPatch;
use crate::chat::ChatSession;
use crate::config::{Config, LookupFailurePolicy};
use crate::error::{AppError, AppResult};
use crate::session::Session;
use crate::store::TaskStore;
use crate::ui::task_list::Filter;

#[derive(Parser)]
#[command(name = "taskevo", version)]
#[command(about = "Manage your TaskEvo tasks and talk to the task assistant")]
struct Cli {
    /// API base URL (overrides config and TASKEVO_API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// What to do when the conversation lookup fails before a chat send
    #[arg(long, global = true, value_name = "abort|proceed")]
    on_lookup_failure: Option<LookupFailurePolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List and edit tasks
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Dashboard statistics
    Stats,
    /// Talk to the task assistant; without a subcommand, start an interactive chat
    Chat {
        #[command(subcommand)]
        command: Option<ChatCommand>,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List tasks
    List {
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        #[arg(long)]
        completed: bool,
    },
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit a task's title, description or completion
    Edit {
        /// Task id or a unique prefix of it
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task between pending and completed
    Toggle { id: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
enum ChatCommand {
    /// Show the active conversation
    History,
    /// Send one message
    Send {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            if let Some(hint) = e.hint() {
                eprintln!("{} {hint}", "hint:".yellow());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = Config::load();
    if let Some(url) = cli.api_url.as_deref() {
        config.api_base_url = utils::normalize_url(url);
    }
    if let Some(policy) = cli.on_lookup_failure {
        config.chat.on_lookup_failure = policy;
    }

    let session_path = Session::default_path()?;
    let client = ApiClient::new(&config.api_base_url, config.request_timeout())?;
    log::debug!("using API at {}", client.base_url());

    match cli.command {
        Commands::Register { email, name, password } => {
            match ui::login::register(&client, &session_path, &email, &name, &password).await? {
                Some(session) => println!("{}\n{}", "Account created.".green(), ui::login::welcome(&session)),
                None => println!("{} Log in with `taskevo login`.", "Account created.".green()),
            }
            Ok(())
        }
        Commands::Login { email, password } => {
            let session = ui::login::login(&client, &session_path, &email, &password).await?;
            println!("{}", ui::login::welcome(&session));
            Ok(())
        }
        Commands::Logout => {
            if ui::login::logout(&session_path)? {
                println!("Logged out.");
            } else {
                println!("{}", "No saved session.".dimmed());
            }
            Ok(())
        }
        Commands::Whoami => {
            let session = require_session(&session_path)?;
            println!("{}", ui::login::whoami(&session));
            Ok(())
        }
        Commands::Tasks(command) => {
            let session = require_session(&session_path)?;
            let client = client.with_token(&session.token);
            run_tasks(&client, &session, command).await
        }
        Commands::Stats => {
            let session = require_session(&session_path)?;
            let client = client.with_token(&session.token);
            let mut store = TaskStore::new(&session.user_id);
            store.refresh(&client).await?;
            print_stats(&session, &store);
            Ok(())
        }
        Commands::Chat { command } => {
            let session = require_session(&session_path)?;
            let client = client.with_token(&session.token);
            let mut chat = ChatSession::new(&session.user_id, config.chat.on_lookup_failure);
            match command {
                Some(ChatCommand::History) => {
                    let history = chat.load_history(&client).await;
                    println!("{}", ui::chat_view::transcript(history));
                    Ok(())
                }
                Some(ChatCommand::Send { message }) => {
                    let mut store = TaskStore::new(&session.user_id);
                    send_and_refresh(&client, &mut chat, &mut store, &message.join(" ")).await
                }
                None => interactive_chat(&client, &session, &mut chat).await,
            }
        }
    }
}

fn require_session(path: &Path) -> AppResult<Session> {
    Session::load_from(path)?.ok_or(AppError::Api(api::ApiError::NotLoggedIn))
}

async fn run_tasks(client: &ApiClient, session: &Session, command: TaskCommand) -> AppResult<()> {
    let mut store = TaskStore::new(&session.user_id);
    store.refresh(client).await?;
    match command {
        TaskCommand::List { pending, completed } => {
            let filter = match (pending, completed) {
                (true, _) => Filter::Pending,
                (_, true) => Filter::Completed,
                _ => Filter::All,
            };
            println!("{}", ui::task_list::render(store.tasks(), filter));
        }
        TaskCommand::Add { title, description } => {
            let task = store.create(client, &title, description.as_deref()).await?;
            println!("{} {}", "Created".green(), ui::task_list::task_line(&task));
        }
        TaskCommand::Edit { id, title, description, completed } => {
            let id = store.find(&id)?.id.clone();
            let patch = TaskPatch { title, description, completed };
            let task = store.update(client, &id, patch).await?;
            println!("{}\n{}", "Updated".green(), ui::task_list::task_detail(&task));
        }
        TaskCommand::Toggle { id } => {
            let id = store.find(&id)?.id.clone();
            let task = store.toggle(client, &id).await?;
            let state = if task.completed { "Completed".green() } else { "Reopened".yellow() };
            println!("{state} {}", ui::task_list::task_line(&task));
        }
        TaskCommand::Delete { id } => {
            let task = store.find(&id)?.clone();
            store.delete(client, &task.id).await?;
            println!("{} {}", "Deleted".red(), task.title);
        }
    }
    Ok(())
}

fn print_stats(session: &Session, store: &TaskStore) {
    let now = Local::now();
    let summary = metrics::summarize(store.tasks(), &now);
    let text = ui::dashboard::render(
        &ui::login::welcome(session),
        &summary,
        &metrics::weekly(store.tasks(), &now),
        &metrics::monthly(store.tasks(), &now),
        &metrics::distribution(&summary),
    );
    println!("{text}");
}

async fn send_and_refresh(
    client: &ApiClient,
    chat: &mut ChatSession,
    store: &mut TaskStore,
    text: &str,
) -> AppResult<()> {
    let reply = crate::chat::send_and_refresh(client, chat, store, text).await;
    if let Some(last) = chat.transcript().last() {
        println!("{}", ui::chat_view::message(last));
    }
    reply?;
    if !store.is_stale() {
        let tasks = store.tasks();
        let pending = tasks.iter().filter(|t| !t.completed).count();
        println!("{}", format!("{} tasks, {pending} pending", tasks.len()).dimmed());
    }
    Ok(())
}

async fn interactive_chat(client: &ApiClient, session: &Session, chat: &mut ChatSession) -> AppResult<()> {
    let mut store = TaskStore::new(&session.user_id);
    println!("{}\n", ui::chat_view::transcript(chat.load_history(client).await));
    println!("{}", "Type a message, or `exit` to leave.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", ui::chat_view::prompt());
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        // One failed message should not end the conversation.
        if let Err(e) = send_and_refresh(client, chat, &mut store, line).await {
            eprintln!("{} {e}", "error:".red().bold());
        }
    }
    Ok(())
}

//! Console client for the Tasklane backend.

mod client;
mod output;
mod session;

use anyhow::bail;
use clap::{Parser, Subcommand};
use client::ApiClient;
use serde_json::{json, Map, Value};
use std::io::{BufRead, Write};

#[derive(Debug, Parser)]
#[command(name = "tasklane", version, about = "Manage your todos from the terminal")]
struct Cli {
    /// Base URL of the Tasklane server.
    #[arg(long, env = "TASKLANE_SERVER", default_value = "http://127.0.0.1:8100")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the current session.
    Logout,
    /// Show the logged-in account.
    Whoami,
    /// Add a todo.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// low, medium, or high.
        #[arg(long)]
        priority: Option<String>,
        /// Due date, RFC 3339.
        #[arg(long)]
        due: Option<String>,
    },
    /// List todos.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Show one todo in full.
    Show { id: String },
    /// Update fields of a todo.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
    },
    /// Mark a todo as completed.
    Done { id: String },
    /// Delete a todo.
    Rm { id: String },
    /// Talk to the assistant. With a message, sends it and exits;
    /// without, starts an interactive session.
    Chat {
        message: Vec<String>,
        /// Pick up the most recent conversation instead of starting fresh.
        #[arg(long)]
        resume: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let token = session::load_token()?;
    let api = ApiClient::new(&cli.server, token)?;

    match cli.command {
        Command::Register { email, password } => {
            let user = api.register(&email, &password).await?;
            println!("registered {}", user.email.as_deref().unwrap_or(&user.id));
            println!("run `tasklane login` to start a session");
        }
        Command::Login { email, password } => {
            let session = api.login(&email, &password).await?;
            session::store_token(&session.token)?;
            println!("logged in, session valid until {}", session.expires_at);
        }
        Command::Logout => {
            if session::load_token()?.is_some() {
                api.logout().await?;
            }
            session::clear_token()?;
            println!("logged out");
        }
        Command::Whoami => {
            let verify = api.whoami().await?;
            println!(
                "{}",
                verify.user.email.as_deref().unwrap_or("<no email>")
            );
            if let Some(name) = verify.user.display_name {
                println!("display name: {name}");
            }
            println!("id: {}", verify.user.id);
            println!("session valid until {}", verify.session.expires_at);
        }
        Command::Add {
            title,
            description,
            priority,
            due,
        } => {
            let mut body = Map::new();
            body.insert("title".to_string(), json!(title));
            if let Some(description) = description {
                body.insert("description".to_string(), json!(description));
            }
            if let Some(priority) = priority {
                body.insert("priority".to_string(), json!(priority));
            }
            if let Some(due) = due {
                body.insert("due_date".to_string(), json!(due));
            }

            let todo = api.create_todo(Value::Object(body)).await?;
            println!("added {} ({})", todo.title, todo.id);
        }
        Command::List { status, priority } => {
            let todos = api.list_todos(status.as_deref(), priority.as_deref()).await?;
            if todos.is_empty() {
                println!("no todos");
            } else {
                print!("{}", output::todo_table(&todos));
            }
        }
        Command::Show { id } => {
            let todo = api.get_todo(&id).await?;
            print!("{}", output::todo_details(&todo));
        }
        Command::Update {
            id,
            title,
            description,
            clear_description,
            priority,
            status,
            due,
            clear_due,
        } => {
            let mut body = Map::new();
            if let Some(title) = title {
                body.insert("title".to_string(), json!(title));
            }
            if clear_description {
                body.insert("description".to_string(), Value::Null);
            } else if let Some(description) = description {
                body.insert("description".to_string(), json!(description));
            }
            if let Some(priority) = priority {
                body.insert("priority".to_string(), json!(priority));
            }
            if let Some(status) = status {
                body.insert("status".to_string(), json!(status));
            }
            if clear_due {
                body.insert("due_date".to_string(), Value::Null);
            } else if let Some(due) = due {
                body.insert("due_date".to_string(), json!(due));
            }

            if body.is_empty() {
                bail!("nothing to update; pass at least one field");
            }

            let todo = api.update_todo(&id, Value::Object(body)).await?;
            println!("updated {} ({})", todo.title, todo.id);
        }
        Command::Done { id } => {
            let todo = api.complete_todo(&id).await?;
            println!("completed {} ({})", todo.title, todo.id);
        }
        Command::Rm { id } => {
            api.delete_todo(&id).await?;
            println!("deleted {id}");
        }
        Command::Chat { message, resume } => {
            chat(&api, message, resume).await?;
        }
    }

    Ok(())
}

async fn chat(api: &ApiClient, message: Vec<String>, resume: bool) -> anyhow::Result<()> {
    let mut conversation_id = if resume {
        resume_conversation(api).await?
    } else {
        None
    };

    if !message.is_empty() {
        let reply = api
            .chat(conversation_id.as_deref(), &message.join(" "))
            .await?;
        println!("{}", reply.reply);
        return Ok(());
    }

    println!("chatting with the assistant; empty line or ctrl-d to quit");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let reply = api.chat(conversation_id.as_deref(), line).await?;
        conversation_id = Some(reply.conversation_id);
        println!("{}", reply.reply);
    }

    Ok(())
}

/// Find the most recently active conversation and replay it before
/// continuing, so `chat --resume` behaves like reopening a thread.
async fn resume_conversation(api: &ApiClient) -> anyhow::Result<Option<String>> {
    let conversations = api.conversations().await?;
    let Some(conversation) = conversations.into_iter().next() else {
        println!("no previous conversations, starting a new one");
        return Ok(None);
    };

    if let Some(title) = &conversation.title {
        println!("resuming \"{title}\"");
    }
    for message in api.messages(&conversation.id).await? {
        let prefix = if message.role == "user" { ">" } else { " " };
        println!("{prefix} {}", message.content);
    }

    Ok(Some(conversation.id))
}

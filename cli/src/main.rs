//! `chat-cli` — terminal front end for the chat session engine.
//!
//! SYSTEM CONTEXT
//! ==============
//! The home page is a username prompt; the chat page is a line-oriented
//! loop that feeds typed lines and socket events into a `ChatSession` and
//! renders whatever it reports. Chat output goes to stdout, logs to stderr.

mod chat;
mod input;
mod pager;
mod render;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client::config::{DEFAULT_IDENTITY_FILE, DEFAULT_WS_URL, resolve_ws_url};
use client::net::socket::WsConnector;
use client::state::identity::{FileIdentityStore, IdentityError, IdentityStore, choose_username};
use client::ChatSession;
use time::UtcOffset;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::pager::Pager;
use crate::render::Renderer;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("identity store failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("no username entered")]
    NoUsername,
}

#[derive(Parser, Debug)]
#[command(name = "chat-cli", about = "Single-room chat client")]
struct Cli {
    /// Relay websocket endpoint.
    #[arg(long, env = "CHAT_WS_URL", default_value = DEFAULT_WS_URL)]
    url: String,

    /// File holding the remembered username.
    #[arg(long, env = "CHAT_IDENTITY_FILE", default_value = DEFAULT_IDENTITY_FILE)]
    identity_file: PathBuf,

    /// Choose (and remember) a username instead of using the stored one.
    #[arg(long)]
    username: Option<String>,

    /// Height of the virtual message window, in messages.
    #[arg(long, default_value_t = 20)]
    page_lines: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forget the stored username.
    Forget,
}

type StdinLines = Lines<BufReader<Stdin>>;

fn main() -> Result<(), CliError> {
    // The local offset can only be read while the process is single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(offset))
}

async fn run(offset: UtcOffset) -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut identity = FileIdentityStore::new(&cli.identity_file);

    if let Some(Command::Forget) = cli.command {
        identity.clear()?;
        println!("forgot stored username");
        return Ok(());
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    match cli.username.as_deref() {
        Some(raw) => {
            choose_username(&mut identity, raw)?;
        }
        None if identity.get()?.is_none() => prompt_username(&mut identity, &mut stdin).await?,
        None => {}
    }

    run_chat(identity, &resolve_ws_url(cli.url), cli.page_lines, offset, &mut stdin).await
}

// =============================================================================
// HOME
// =============================================================================

/// Ask for a username until a non-blank one is entered.
async fn prompt_username(identity: &mut dyn IdentityStore, stdin: &mut StdinLines) -> Result<(), CliError> {
    loop {
        print!("Enter a username: ");
        io::stdout().flush()?;
        let Some(line) = stdin.next_line().await? else {
            return Err(CliError::NoUsername);
        };
        match choose_username(identity, &line) {
            Ok(username) => {
                tracing::info!(%username, "cli: username chosen");
                return Ok(());
            }
            Err(IdentityError::EmptyUsername) => println!("Please enter a username."),
            Err(e) => return Err(e.into()),
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(
    identity: FileIdentityStore,
    url: &str,
    page_lines: usize,
    offset: UtcOffset,
    stdin: &mut StdinLines,
) -> Result<(), CliError> {
    let (mut connector, mut events) = WsConnector::new();
    let Some(mut session) = ChatSession::start(Box::new(identity), &mut connector, url) else {
        return Err(CliError::NoUsername);
    };

    let mut pager = Pager::new(page_lines);
    let mut renderer = Renderer::new(io::stdout(), session.username(), offset);
    renderer.notice(&format!("chatting as {} on {url} (/help for commands)", session.username()))?;

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                // EOF ends the session but keeps the identity.
                let Some(line) = line? else { break };
                if !chat::handle_line(&mut session, &mut pager, &mut renderer, &line)? {
                    break;
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let updates = session.handle_socket_event(event);
                renderer.apply(&updates, session.messages(), &mut pager)?;
            }
        }
    }
    Ok(())
}

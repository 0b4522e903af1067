use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use messageboard_frontend::{FrontendConfig, TOP_LEVEL};

mod render;
mod repl;
mod telemetry;

#[derive(Parser)]
#[command(author, version, about = "Terminal client for the Magnificent Messageboard")]
struct Args {
    /// Path to a config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Board host, overriding the config file and environment
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the front page
    FrontPage {
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Print the replies to a post
    Replies { id: i64 },
    /// Submit a post, optionally as a reply
    Post {
        content: String,
        #[arg(long, default_value_t = TOP_LEVEL, allow_hyphen_values = true)]
        reply_to: i64,
    },
    /// Print this installation's tripcode
    Whoami,
    /// Browse and post interactively
    Repl,
}

// Extra time on top of the request timeout before the REPL stops waiting.
const WAIT_SLACK: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let mut config =
        FrontendConfig::discover(args.config.as_deref()).context("failed to load config")?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    let app = messageboard_frontend::bootstrap(&config)?;

    let mut stdout = io::stdout().lock();
    match args.command.unwrap_or(Command::Repl) {
        Command::FrontPage { offset } => {
            let posts = app.client().fetch_front_page(offset)?;
            render::render_posts(&posts, &mut stdout)?;
        }
        Command::Replies { id } => {
            let posts = app.client().fetch_replies(id)?;
            render::render_posts(&posts, &mut stdout)?;
        }
        Command::Post { content, reply_to } => {
            if content.trim().is_empty() {
                anyhow::bail!("post content cannot be empty");
            }
            let rowid = app.client().submit_post(&content, reply_to)?;
            tracing::info!(rowid, reply_to, "post created");
            writeln!(stdout, "Created post #{rowid}")?;
        }
        Command::Whoami => writeln!(stdout, "{}", app.identity().tripcode())?,
        Command::Repl => {
            drop(stdout);
            let wait = config.request_timeout() + WAIT_SLACK;
            repl::run_repl(app, wait)?;
        }
    }
    Ok(())
}

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use comment_checker_hooks::*;

#[derive(Parser)]
#[command(name = "comment-checker-hook", version, about = "Warns about new comments in file edits")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read hook events as JSON lines on stdin and answer each on stdout (default)
    Serve,
    /// Resolve the checker binary, downloading it if needed, and print its path
    Ensure,
    /// Print the installed checker path without touching the network
    Locate,
}

/// One host hook event per stdin line
#[derive(Debug, Deserialize)]
#[serde(tag = "event")]
enum HookEvent {
    #[serde(rename = "tool.execute.before")]
    Before {
        input: ToolExecuteInput,
        #[serde(default)]
        output: ToolBeforeOutput,
    },
    #[serde(rename = "tool.execute.after")]
    After {
        input: ToolExecuteInput,
        #[serde(default)]
        output: ToolAfterOutput,
    },
    #[serde(rename = "config")]
    Config {
        #[serde(default)]
        custom_prompt: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct HookReply {
    event: &'static str,
    output: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ErrorReply {
    event: &'static str,
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config();
    logging::init(config.debug);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Ensure => {
            let resolver = BinaryResolver::new(ReleaseLocator::from_config(&config));
            print_resolved(resolver.resolve().await)
        }
        Command::Locate => {
            let resolver = BinaryResolver::new(ReleaseLocator::from_config(&config));
            print_resolved(resolver.resolve_sync())
        }
    }
}

fn print_resolved(path: Option<std::path::PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            eprintln!("comment-checker binary is not available");
            std::process::exit(1);
        }
    }
}

async fn serve(config: &Config) -> Result<()> {
    let hooks = Arc::new(CommentCheckerHooks::from_config(config));
    hooks.start();
    tracing::debug!(prompt = hooks.custom_prompt().is_some(), "Hook bridge started");

    // Single writer so concurrent replies never interleave on stdout.
    let (replies, mut outbox) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = outbox.recv().await {
            stdout
                .write_all(reply.as_bytes())
                .await
                .context("Failed to write reply")?;
            stdout.write_all(b"\n").await.context("Failed to write reply")?;
            stdout.flush().await.context("Failed to flush stdout")?;
        }
        Ok::<(), anyhow::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_event(&line) {
            // Checks may wait on a download or the checker; never block the reader on them.
            Ok(HookEvent::After { input, mut output }) => {
                let hooks = Arc::clone(&hooks);
                let replies = replies.clone();
                tokio::spawn(async move {
                    hooks.after(&input, &mut output).await;
                    let _ = replies.send(render_reply("tool.execute.after", &output));
                });
            }
            // Before and config events only touch in-memory state and are answered in
            // arrival order, which keeps a call's record ahead of its after-event.
            Ok(HookEvent::Before { input, output }) => {
                hooks.before(&input, &output.args);
                if replies.send(render_reply("tool.execute.before", &output)).is_err() {
                    break;
                }
            }
            Ok(HookEvent::Config { custom_prompt }) => {
                hooks.set_custom_prompt(custom_prompt.filter(|p| !p.trim().is_empty()));
                if replies.send(render_reply("config", &serde_json::Value::Null)).is_err() {
                    break;
                }
            }
            Err(e) => {
                if replies.send(render_error(&e)).is_err() {
                    break;
                }
            }
        }
    }

    // In-flight checks hold their own senders; the writer drains until the last one finishes.
    drop(replies);
    writer.await.context("Reply writer panicked")?
}

fn parse_event(line: &str) -> Result<HookEvent> {
    serde_json::from_str(line).context("Failed to parse hook event")
}

fn render_reply(event: &'static str, output: &impl Serialize) -> String {
    let reply = serde_json::to_value(output)
        .map(|output| HookReply { event, output })
        .and_then(|reply| serde_json::to_string(&reply));
    match reply {
        Ok(reply) => reply,
        Err(e) => render_error(&anyhow::Error::new(e).context("Failed to serialize reply")),
    }
}

fn render_error(e: &anyhow::Error) -> String {
    tracing::warn!(error = %e, "Rejected hook event");
    let reply = ErrorReply {
        event: "error",
        message: format!("{:#}", e),
    };
    serde_json::to_string(&reply).unwrap_or_else(|_| r#"{"event":"error"}"#.to_string())
}

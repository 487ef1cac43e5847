//! Interactive console channel
//!
//! Reads one message per line from stdin and prints each reply to stdout,
//! going through the same orchestrator as the webhook.

use crate::config::Config;
use crate::gateway::build_orchestrator;
use crate::orchestrator::Orchestrator;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info};

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

pub async fn run_console(config: &Config, user: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    info!(user = %user, "Console chat started");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    chat_loop(&orchestrator, user, stdin, stdout).await
}

/// Drives the orchestrator from `input` until EOF or an exit command.
///
/// A failed message is reported on the output and the loop keeps going.
pub async fn chat_loop<R, W>(
    orchestrator: &Orchestrator,
    user: &str,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(b"> ").await.context("Failed to write prompt")?;
        output.flush().await.context("Failed to flush output")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        let reply = match orchestrator.handle_message(user, message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Failed to answer console message");
                format!("error: {}", e)
            }
        };
        output
            .write_all(format!("{}\n", reply).as_bytes())
            .await
            .context("Failed to write reply")?;
    }

    output.write_all(b"\n").await.context("Failed to write output")?;
    output.flush().await.context("Failed to flush output")?;
    info!("Console chat ended");
    Ok(())
}

//! Console Bot
//!
//! Runs Sigil against the terminal. Each stdin line is one event:
//!
//! - a JSON object is parsed as an `InboundEvent`, e.g.
//!   `{"type":"message","info":{"id":"3EB01","chat":"200@s.whatsapp.net","sender":"200@s.whatsapp.net"},"message":{"conversation":".ping"}}`
//! - anything else is sent as a direct text message from `--sender`
//!
//! Outgoing messages are printed. The offline sync is reported complete
//! before the first line is read.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --own 10000 --sender 20000
//! ```

mod plugins;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use sigil::core::{BoxedTransport, InboundEvent, Jid, MessageEvent, MessageInfo, MessagePayload};
use sigil::runtime::BotRuntime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::transport::ConsoleTransport;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file; sigil.toml and config.toml are searched otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The bot's own number
    #[arg(long, default_value = "10000")]
    own: String,

    /// Sender of plain text lines
    #[arg(long, default_value = "20000")]
    sender: String,
}

/// Turns one input line into an event.
fn parse_line(line: &str, sender: &Jid, seq: u64) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with('{') {
        return match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Ignoring malformed event: {e}");
                None
            }
        };
    }

    Some(InboundEvent::Message(MessageEvent {
        info: MessageInfo {
            id: format!("CONSOLE{seq:09}"),
            chat: sender.clone(),
            sender: sender.clone(),
            push_name: "console".into(),
            ..Default::default()
        },
        message: Some(MessagePayload::text(line)),
    }))
}

async fn read_stdin(events: mpsc::Sender<InboundEvent>, sender: Jid) {
    if events.send(InboundEvent::OfflineSyncCompleted).await.is_err() {
        return;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seq = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read stdin: {e}");
                break;
            }
        };

        seq += 1;
        if let Some(event) = parse_line(&line, &sender, seq) {
            if events.send(event).await.is_err() {
                return;
            }
        }
    }

    // keep the stream open so piped commands can finish; Ctrl+C stops the bot
    info!("Input closed, press Ctrl+C to exit");
    events.closed().await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let started = Instant::now();

    let transport: BoxedTransport = Arc::new(ConsoleTransport::new(Jid::user_jid(&args.own)));
    let mut builder = BotRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let mut runtime = builder.build(transport)?;

    let plugins = plugins::all(started);
    runtime.install_all(plugins.iter().map(|plugin| plugin.as_ref()))?;
    info!(commands = runtime.registry().len(), "Plugins installed");

    let (events, rx) = mpsc::channel(64);
    tokio::spawn(read_stdin(events, Jid::user_jid(&args.sender)));

    runtime.run_until_signal(rx).await?;
    Ok(())
}

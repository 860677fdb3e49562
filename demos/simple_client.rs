//! Simple IRC client example
//!
//! Connects to a server over TLS, joins a channel, and prints the event
//! stream until the server disconnects us. Wire traffic is logged at
//! debug level; run with `RUST_LOG=slirc_client=debug` to see it.
//!
//! Usage: simple_client [host] [nick] [channel]

use anyhow::Result;
use slirc_client::{Client, Event, ServerProfile};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "irc.libera.chat".to_string());
    let nick = args.next().unwrap_or_else(|| "slirc_example".to_string());
    let channel = args.next().unwrap_or_else(|| "#slirc-test".to_string());

    let mut profile = ServerProfile::new("example", host, nick);
    profile.channels = vec![channel];

    let (client, mut events) = Client::connect(profile).await?;
    println!("connected; waiting for events (Ctrl+C to exit)");

    while let Some(event) = events.recv().await {
        match event {
            Event::Status(text) => {
                if text == "001 welcome received" {
                    println!("* registered (server-time: {})", client.has_cap("server-time"));
                }
                println!("* {}", text);
            }
            Event::Message {
                nick,
                target,
                text,
                ts,
                ..
            } => {
                println!("[{}] {} <{}> {}", ts.format("%H:%M:%S"), target, nick, text);
            }
            Event::Joined { channel, nick } => println!("* {} joined {}", nick, channel),
            Event::Parted { channel, nick } => println!("* {} left {}", nick, channel),
            Event::Names { channel, nicks } => {
                println!("* {} users in {}: {}", nicks.len(), channel, nicks.join(" "));
            }
            other => println!("* {:?}", other),
        }
    }

    Ok(())
}

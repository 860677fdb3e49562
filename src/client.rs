//! Connected IRC client: a cloneable command surface plus the driver
//! task that owns the socket.
//!
//! [`Client::connect`] dials the server, spawns one driver task for the
//! connection and hands back the [`Client`] handle together with the
//! event stream. The driver is the only writer to the socket; commands
//! issued on the handle are queued onto it through a channel, so calls
//! never block on network I/O.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;
use crate::event::Event;
use crate::profile::ServerProfile;
use crate::state::{Action, ClientState};
use crate::transport::Transport;
use crate::Message;

/// A command queued for the driver task.
enum Outbound {
    /// Transmit one message.
    Line(Message),
    /// Best-effort QUIT, then shut the connection down.
    Quit,
}

/// Handle to one IRC connection.
///
/// All methods are non-blocking: they queue work for the driver task and
/// return immediately. After [`Client::close`] (or after the driver has
/// exited) commands are silently dropped.
///
/// # Example
///
/// ```no_run
/// use slirc_client::{Client, ServerProfile};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let profile = ServerProfile::new("libera", "irc.libera.chat", "rustbot");
///     let (client, mut events) = Client::connect(profile).await?;
///     client.join("#rust");
///     while let Some(event) = events.recv().await {
///         println!("{:?}", event);
///     }
///     Ok(())
/// }
/// ```
pub struct Client {
    commands: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,
    active_caps: Arc<Mutex<BTreeSet<String>>>,
    monitored: Mutex<BTreeSet<String>>,
}

impl Client {
    /// Connect to the server described by `profile` and start the driver.
    ///
    /// Returns the command handle and the receiver for [`Event`]s. The
    /// receiver yields a final `Status("disconnected")` when the driver
    /// exits, whatever the cause.
    pub async fn connect(
        profile: ServerProfile,
    ) -> Result<(Client, mpsc::UnboundedReceiver<Event>)> {
        let transport = Transport::connect(&profile).await?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let active_caps = Arc::new(Mutex::new(BTreeSet::new()));

        let state = ClientState::new(profile);
        tokio::spawn(drive(
            transport,
            state,
            command_rx,
            event_tx,
            Arc::clone(&active_caps),
        ));

        let client = Client {
            commands: Mutex::new(Some(command_tx)),
            active_caps,
            monitored: Mutex::new(BTreeSet::new()),
        };
        Ok((client, event_rx))
    }

    /// Join a channel. Whitespace is trimmed; an empty name is ignored.
    pub fn join(&self, channel: &str) {
        let channel = channel.trim();
        if channel.is_empty() {
            return;
        }
        self.send_line(Message::join(channel));
    }

    /// Part a channel, with an optional reason.
    pub fn part(&self, channel: &str, reason: Option<&str>) {
        let channel = channel.trim();
        if channel.is_empty() {
            return;
        }
        self.send_line(Message::part(channel, reason));
    }

    /// Set a channel topic.
    pub fn set_topic(&self, channel: &str, topic: &str) {
        let channel = channel.trim();
        if channel.is_empty() {
            return;
        }
        self.send_line(Message::topic(channel, topic));
    }

    /// Apply a free-form mode string to a channel (`"+ov alice bob"`).
    pub fn set_modes(&self, channel: &str, modes: &str) {
        let channel = channel.trim();
        if channel.is_empty() {
            return;
        }
        self.send_line(Message::mode(channel, modes));
    }

    /// Send a PRIVMSG to a channel or nick.
    pub fn send_privmsg(&self, target: &str, text: &str) {
        let target = target.trim();
        if target.is_empty() {
            return;
        }
        self.send_line(Message::privmsg(target, text));
    }

    /// Replace the server-side MONITOR list with `nicks`.
    ///
    /// Issues `MONITOR C` and then, when the cleaned set is non-empty,
    /// `MONITOR +` with the sorted, comma-joined nicks. Entries may be
    /// full `nick!user@host` masks; only the nick part is kept.
    pub fn monitor_set<I, S>(&self, nicks: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned = clean_nicks(nicks);
        let Ok(mut monitored) = self.monitored.lock() else {
            return;
        };
        self.send_line(Message::monitor("C", None));
        *monitored = cleaned;
        if !monitored.is_empty() {
            self.send_line(Message::monitor("+", Some(&joined(&monitored))));
        }
    }

    /// Add nicks to the MONITOR list, transmitting only ones not already
    /// tracked.
    pub fn monitor_add<I, S>(&self, nicks: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned = clean_nicks(nicks);
        let Ok(mut monitored) = self.monitored.lock() else {
            return;
        };
        let fresh: BTreeSet<String> = cleaned.difference(&monitored).cloned().collect();
        if fresh.is_empty() {
            return;
        }
        monitored.extend(fresh.iter().cloned());
        self.send_line(Message::monitor("+", Some(&joined(&fresh))));
    }

    /// Remove nicks from the MONITOR list, transmitting only ones
    /// currently tracked.
    pub fn monitor_remove<I, S>(&self, nicks: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned = clean_nicks(nicks);
        let Ok(mut monitored) = self.monitored.lock() else {
            return;
        };
        let stale: BTreeSet<String> = cleaned.intersection(&monitored).cloned().collect();
        if stale.is_empty() {
            return;
        }
        monitored.retain(|nick| !stale.contains(nick));
        self.send_line(Message::monitor("-", Some(&joined(&stale))));
    }

    /// Whether a capability ended up active after negotiation.
    pub fn has_cap(&self, name: &str) -> bool {
        self.active_caps
            .lock()
            .map(|caps| caps.contains(name))
            .unwrap_or(false)
    }

    /// Transmit a caller-built message verbatim.
    ///
    /// Escape hatch for commands the handle does not wrap.
    pub fn send_raw(&self, message: Message) {
        self.send_line(message);
    }

    /// Shut the connection down.
    ///
    /// The driver sends a best-effort `QUIT :bye` and exits. Safe to call
    /// more than once; QUIT is transmitted at most once. Dropping the
    /// handle without calling this has the same effect.
    pub fn close(&self) {
        let sender = match self.commands.lock() {
            Ok(mut commands) => commands.take(),
            Err(_) => None,
        };
        if let Some(tx) = sender {
            let _ = tx.send(Outbound::Quit);
        }
    }

    fn send_line(&self, message: Message) {
        if let Ok(commands) = self.commands.lock() {
            if let Some(tx) = commands.as_ref() {
                let _ = tx.send(Outbound::Line(message));
            }
        }
    }
}

/// Normalize a nick list: strip `!user@host` suffixes, trim, drop empties.
fn clean_nicks<I, S>(nicks: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    nicks
        .into_iter()
        .filter_map(|entry| {
            let nick = entry.as_ref().split('!').next().unwrap_or("").trim();
            (!nick.is_empty()).then(|| nick.to_string())
        })
        .collect()
}

fn joined(nicks: &BTreeSet<String>) -> String {
    nicks
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Driver task for one connection.
///
/// Owns the transport and the protocol state machine. Exits on EOF, on a
/// socket error, or when a QUIT has been requested, always emitting a
/// final `Status("disconnected")`.
async fn drive(
    mut transport: Transport,
    mut state: ClientState,
    mut commands: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<Event>,
    active_caps: Arc<Mutex<BTreeSet<String>>>,
) {
    let startup = state.start();
    if carry_out(startup, &mut transport, &events).await {
        loop {
            tokio::select! {
                incoming = transport.read_message() => match incoming {
                    Ok(Some(message)) => {
                        debug!("<< {}", message.to_string().trim_end());
                        let actions = state.feed(&message, Utc::now());
                        if !carry_out(actions, &mut transport, &events).await {
                            break;
                        }
                        refresh_caps(&active_caps, &state);
                    }
                    Ok(None) => {
                        let _ = events.send(Event::Status("server closed connection".to_string()));
                        break;
                    }
                    Err(e) => {
                        let _ = events.send(Event::Status(format!("reader error: {}", e)));
                        break;
                    }
                },
                queued = commands.recv() => match queued {
                    Some(Outbound::Line(message)) => {
                        if !transmit(&mut transport, message, &events).await {
                            break;
                        }
                    }
                    // A dropped handle shuts down like an explicit close.
                    Some(Outbound::Quit) | None => {
                        let _ = transmit(&mut transport, Message::quit("bye"), &events).await;
                        break;
                    }
                },
            }
        }
    }
    let _ = events.send(Event::Status("disconnected".to_string()));
}

/// Apply one batch of state-machine actions. Returns `false` when the
/// driver should stop.
async fn carry_out(
    actions: Vec<Action>,
    transport: &mut Transport,
    events: &mpsc::UnboundedSender<Event>,
) -> bool {
    for action in actions {
        match action {
            Action::Send(message) => {
                if !transmit(transport, *message, events).await {
                    return false;
                }
            }
            Action::Emit(event) => {
                if events.send(*event).is_err() {
                    return false;
                }
            }
        }
    }
    true
}

/// Write one message, logging the line with AUTHENTICATE payloads
/// redacted. Returns `false` when the write failed.
async fn transmit(
    transport: &mut Transport,
    message: Message,
    events: &mpsc::UnboundedSender<Event>,
) -> bool {
    let line = message.to_string();
    let line = line.trim_end();
    if line.starts_with("AUTHENTICATE ") {
        debug!(">> AUTHENTICATE <hidden>");
    } else {
        debug!(">> {}", line);
    }
    match transport.write_message(message).await {
        Ok(()) => true,
        Err(e) => {
            let _ = events.send(Event::Status(format!("write error: {}", e)));
            false
        }
    }
}

fn refresh_caps(shared: &Arc<Mutex<BTreeSet<String>>>, state: &ClientState) {
    if let Ok(mut caps) = shared.lock() {
        *caps = state.active_caps().clone();
    }
}

//! Integration tests for the tokio driver task.
//!
//! Each test binds a scripted server on a loopback port, connects a
//! [`Client`] to it over plain TCP, and checks both sides: the exact lines
//! the driver puts on the wire and the events it delivers back.

#![cfg(feature = "tokio")]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use slirc_client::{Client, Event, ServerProfile};

const WAIT: Duration = Duration::from_secs(5);

struct ScriptedServer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ScriptedServer {
    async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = timeout(WAIT, listener.accept())
            .await
            .expect("timed out waiting for connection")
            .expect("accept failed");
        let (read, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn expect_line(&mut self, want: &str) {
        let mut line = String::new();
        let n = timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {:?}", want))
            .expect("read failed");
        assert!(n > 0, "connection closed while waiting for {:?}", want);
        assert_eq!(line.trim_end(), want);
    }

    async fn expect_eof(&mut self) {
        let mut line = String::new();
        let n = timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for EOF")
            .expect("read failed");
        assert_eq!(n, 0, "expected EOF, got {:?}", line);
    }

    async fn send_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .expect("write failed");
    }
}

async fn listen() -> (TcpListener, ServerProfile) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let port = listener.local_addr().expect("local_addr failed").port();
    let mut profile = ServerProfile::new("test", "127.0.0.1", "ferris");
    profile.port = port;
    profile.tls = false;
    (listener, profile)
}

async fn next_event(events: &mut UnboundedReceiver<Event>) -> Event {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event stream ended early")
}

async fn expect_status(events: &mut UnboundedReceiver<Event>, text: &str) {
    assert_eq!(next_event(events).await, Event::Status(text.to_string()));
}

/// Read the registration burst and complete a minimal CAP handshake.
async fn register(server: &mut ScriptedServer, offered: &str, requested: &str) {
    server.expect_line("CAP LS 302").await;
    server.expect_line("NICK ferris").await;
    server.expect_line("USER slirc 0 * :slirc client").await;
    server.send_line(&format!(":srv CAP * LS :{}", offered)).await;
    server.expect_line(requested).await;
    server
        .send_line(&format!(":srv CAP * ACK :{}", offered))
        .await;
    server.expect_line("CAP END").await;
}

#[tokio::test]
async fn test_registration_and_traffic() {
    let (listener, profile) = listen().await;
    let (client, mut events) = Client::connect(profile).await.expect("connect failed");
    let mut server = ScriptedServer::accept(&listener).await;

    expect_status(&mut events, "starting CAP negotiation (LS 302)").await;
    expect_status(&mut events, "registering (NICK/USER sent)").await;

    register(&mut server, "server-time", "CAP REQ server-time").await;
    server.send_line(":srv 001 ferris :Welcome").await;
    expect_status(&mut events, "001 welcome received").await;
    assert!(client.has_cap("server-time"));
    assert!(!client.has_cap("sasl"));

    // PING is answered on the wire and never surfaces as an event.
    server.send_line("PING :tok123").await;
    server.expect_line("PONG tok123").await;

    // A line that is not IRC degrades to status text instead of killing
    // the connection.
    server.send_line("!!! not irc").await;
    expect_status(&mut events, "!!! not irc").await;

    server
        .send_line("@time=2024-01-15T10:00:00.000Z :alice!a@h PRIVMSG ferris :hello rust")
        .await;
    match next_event(&mut events).await {
        Event::Message {
            nick,
            target,
            text,
            ts,
            tags,
        } => {
            assert_eq!(nick, "alice");
            assert_eq!(target, "ferris");
            assert_eq!(text, "hello rust");
            assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
            assert_eq!(tags.len(), 1);
        }
        other => panic!("expected Message, got {:?}", other),
    }

    drop(server);
    expect_status(&mut events, "server closed connection").await;
    expect_status(&mut events, "disconnected").await;
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_commands_reach_the_wire_in_order() {
    let (listener, profile) = listen().await;
    let (client, mut events) = Client::connect(profile).await.expect("connect failed");
    let mut server = ScriptedServer::accept(&listener).await;

    register(&mut server, "batch", "CAP REQ batch").await;

    client.join("#rust");
    client.send_privmsg("#rust", "hello from tests");
    client.monitor_set(["bob", "alice"]);

    server.expect_line("JOIN #rust").await;
    server.expect_line("PRIVMSG #rust :hello from tests").await;
    server.expect_line("MONITOR C").await;
    server.expect_line("MONITOR + alice,bob").await;

    client.close();
    server.expect_line("QUIT bye").await;
    server.expect_eof().await;

    // Startup statuses, then the shutdown marker.
    expect_status(&mut events, "starting CAP negotiation (LS 302)").await;
    expect_status(&mut events, "registering (NICK/USER sent)").await;
    expect_status(&mut events, "disconnected").await;
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_dropped_handle_shuts_down_with_quit() {
    let (listener, profile) = listen().await;
    let (client, mut events) = Client::connect(profile).await.expect("connect failed");
    let mut server = ScriptedServer::accept(&listener).await;

    server.expect_line("CAP LS 302").await;
    server.expect_line("NICK ferris").await;
    server.expect_line("USER slirc 0 * :slirc client").await;

    drop(client);

    server.expect_line("QUIT bye").await;
    server.expect_eof().await;

    expect_status(&mut events, "starting CAP negotiation (LS 302)").await;
    expect_status(&mut events, "registering (NICK/USER sent)").await;
    expect_status(&mut events, "disconnected").await;
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_connect_refused_is_an_error() {
    let (listener, profile) = listen().await;
    // Closing the listener leaves the port with nothing accepting.
    drop(listener);

    let result = Client::connect(profile).await;
    assert!(result.is_err());
}

use std::time::Duration;

use kanal::AsyncSender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use yomi_config::stream::StreamConfig;
use yomi_types::{ConnectionState, StreamEvent};

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("No host configured")]
    MissingHost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(Duration),
}

/// Keeps a newline-delimited text stream connected, reconnecting after a
/// fixed delay whenever it drops.
pub struct ConnectionManager {
    config: StreamConfig,
    event_tx: AsyncSender<StreamEvent>,
    state_tx: watch::Sender<ConnectionState>,
    running: Option<Running>,
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ConnectionManager {
    pub fn new(config: StreamConfig, event_tx: AsyncSender<StreamEvent>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Self {
            config,
            event_tx,
            state_tx,
            running: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Spawn the reconnect loop for `host:port`
    pub fn start(&mut self, host: &str, port: u16) -> Result<(), StreamError> {
        if host.is_empty() {
            return Err(StreamError::MissingHost);
        }
        if self.is_running() {
            tracing::warn!("Connection loop already running, ignoring start");
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let emitter = Emitter {
            event_tx: self.event_tx.clone(),
            state_tx: self.state_tx.clone(),
            cancel: cancel.clone(),
        };
        let settings = LoopSettings {
            address: format!("{host}:{port}"),
            reconnect_delay: self.config.reconnect_delay(),
            connect_timeout: self.config.connect_timeout(),
        };

        tracing::info!("Starting connection loop for {}", settings.address);
        let handle = tokio::spawn(connection_loop(settings, cancel.clone(), emitter));
        self.running = Some(Running { cancel, handle });

        Ok(())
    }

    /// Signal the loop to stop and wait (bounded) for it to exit
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.cancel.cancel();

        let timeout = self.config.stop_timeout();
        match tokio::time::timeout(timeout, running.handle).await {
            Ok(Ok(())) => tracing::info!("Connection loop stopped"),
            Ok(Err(e)) => tracing::error!("Connection loop panicked: {e}"),
            Err(_) => tracing::warn!("Connection loop did not stop within {:?}", timeout),
        }

        self.state_tx.send_replace(ConnectionState::Idle);
    }
}

struct LoopSettings {
    address: String,
    reconnect_delay: Duration,
    connect_timeout: Duration,
}

#[derive(Clone)]
struct Emitter {
    event_tx: AsyncSender<StreamEvent>,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl Emitter {
    async fn state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
        self.send(StreamEvent::State(state)).await;
    }

    async fn line(&self, text: String) {
        self.send(StreamEvent::Line(text)).await;
    }

    /// Blocks on a full channel only until the loop is cancelled; after that
    /// events are delivered only if there is room
    async fn send(&self, event: StreamEvent) {
        let result = if self.cancel.is_cancelled() {
            self.event_tx.try_send(event)
        } else {
            tokio::select! {
                result = self.event_tx.send(event.clone()) => result.map(|()| true),
                _ = self.cancel.cancelled() => self.event_tx.try_send(event),
            }
        };

        match result {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Stream event dropped: channel full after stop"),
            Err(e) => tracing::debug!("Stream event dropped: {e}"),
        }
    }
}

enum ReadEnd {
    Eof,
    Stopped,
}

async fn connection_loop(settings: LoopSettings, cancel: CancellationToken, emitter: Emitter) {
    let address = settings.address.as_str();

    while !cancel.is_cancelled() {
        emitter.state(ConnectionState::Connecting).await;

        let connected = tokio::select! {
            result = connect(address, settings.connect_timeout) => result,
            _ = cancel.cancelled() => break,
        };

        match connected {
            Ok(stream) => {
                tracing::info!("Connected to {address}");
                emitter.state(ConnectionState::Connected).await;

                match read_lines(stream, &cancel, &emitter).await {
                    Ok(ReadEnd::Eof) => tracing::info!("Server closed connection"),
                    Ok(ReadEnd::Stopped) => tracing::debug!("Read loop stopped"),
                    Err(e) => tracing::warn!("Connection to {address} lost: {e}"),
                }
                emitter.state(ConnectionState::Disconnected).await;
            }
            Err(e) => {
                tracing::warn!("Connection to {address} failed: {e}");
                emitter.state(ConnectionState::Disconnected).await;
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        tracing::info!("Reconnecting in {:?}...", settings.reconnect_delay);
        tokio::select! {
            _ = tokio::time::sleep(settings.reconnect_delay) => {}
            _ = cancel.cancelled() => break,
        }
    }

    emitter.state(ConnectionState::Idle).await;
}

async fn connect(address: &str, timeout: Duration) -> Result<TcpStream, StreamError> {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(stream) => Ok(stream?),
        Err(_) => Err(StreamError::ConnectTimeout(timeout)),
    }
}

async fn read_lines(
    stream: TcpStream,
    cancel: &CancellationToken,
    emitter: &Emitter,
) -> Result<ReadEnd, StreamError> {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => read?,
            _ = cancel.cancelled() => return Ok(ReadEnd::Stopped),
        };

        if read == 0 {
            return Ok(ReadEnd::Eof);
        }

        let line = decode_line(&buf);
        tracing::debug!("Received line: {line}");
        emitter.line(line).await;
    }
}

/// Strip the `\n` / `\r\n` terminator and decode, replacing invalid UTF-8
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

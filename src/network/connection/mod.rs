//! Server - one configured IRC network and its connection lifecycle.
//!
//! A [`Server`] outlives its TCP sessions. Its task loops:
//!
//! ```text
//! Disconnected ─▶ Connecting ──(attempts exhausted)──▶ stopped
//!       ▲             │
//!       │             ▼
//!   teardown ◀── Connected (read loop + writer, one select!)
//!       │
//!       └──(reconnect enabled)──▶ Connecting
//! ```
//!
//! Outbound lines from any task go through an unbounded queue drained by
//! the session's writer; inbound lines are applied to the
//! [`ConnectionState`] strictly in arrival order.

mod event_loop;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use slirc_proto::{sanitize_line, Message};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::keepalive;
use crate::access::PrivilegeTable;
use crate::config::ServerConfig;
use crate::error::TransportError;
use crate::events::{Event, EventCallback, EventMask};
use crate::handlers::Registry;
use crate::state::ConnectionState;

/// Where the connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

struct Subscription {
    mask: EventMask,
    callback: Arc<dyn EventCallback>,
}

/// A configured IRC network.
pub struct Server {
    name: String,
    config: ServerConfig,
    state: RwLock<ConnectionState>,
    privileges: PrivilegeTable,
    handlers: Registry,
    status: Mutex<ConnectionStatus>,
    reconnect: AtomicBool,
    last_activity: Mutex<Instant>,
    /// Writer queue of the live session, if any.
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    /// Cancelled by `quit()`; ends the server task for good.
    stop: CancellationToken,
    /// Cancelled by `close()`; ends only the current session.
    session: Mutex<CancellationToken>,
    keepalive: Mutex<Option<CancellationToken>>,
    callbacks: RwLock<Vec<Subscription>>,
}

impl Server {
    pub fn new(name: impl Into<String>, config: ServerConfig) -> Arc<Self> {
        let stop = CancellationToken::new();
        Arc::new(Self {
            name: name.into(),
            privileges: PrivilegeTable::new(&config.privileges),
            reconnect: AtomicBool::new(config.reconnect),
            config,
            state: RwLock::new(ConnectionState::new()),
            handlers: Registry::new(),
            status: Mutex::new(ConnectionStatus::Disconnected),
            last_activity: Mutex::new(Instant::now()),
            outbound: Mutex::new(None),
            session: Mutex::new(stop.child_token()),
            stop,
            keepalive: Mutex::new(None),
            callbacks: RwLock::new(Vec::new()),
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Connection name from the config, e.g. `Libera`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Read access to the connection model. Do not hold across `.await`.
    pub fn state(&self) -> RwLockReadGuard<'_, ConnectionState> {
        self.state.read()
    }

    pub fn privileges(&self) -> &PrivilegeTable {
        &self.privileges
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.lock()
    }

    pub fn reconnect_enabled(&self) -> bool {
        self.reconnect.load(Ordering::SeqCst)
    }

    /// Time since the last inbound line.
    pub fn idle(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    fn set_status(&self, status: ConnectionStatus) {
        *self.status.lock() = status;
    }

    // ---------------------------------------------------------------------
    // Outbound
    // ---------------------------------------------------------------------

    /// Sanitize, truncate and queue one raw line.
    ///
    /// Returns false when there is no live session to write to.
    pub fn write(&self, line: &str) -> bool {
        let max_len = self.state.read().max_line_len();
        let line = sanitize_line(line, max_len);

        let outbound = self.outbound.lock();
        let Some(tx) = outbound.as_ref() else {
            warn!(line = %line, "Not connected, dropping line");
            return false;
        };
        info!(">> {}", line);
        tx.send(line).is_ok()
    }

    pub fn send(&self, msg: Message) -> bool {
        self.write(&msg.to_string())
    }

    pub fn privmsg(&self, target: &str, text: &str) -> bool {
        self.send(Message::privmsg(target, text))
    }

    pub fn notice(&self, target: &str, text: &str) -> bool {
        self.send(Message::notice(target, text))
    }

    pub fn join(&self, channel: &str) -> bool {
        self.send(Message::join(channel))
    }

    pub fn part(&self, channel: &str) -> bool {
        self.send(Message::part(channel))
    }

    pub fn nick(&self, nick: &str) -> bool {
        self.send(Message::nick(nick))
    }

    /// Say goodbye, close the transport and never reconnect.
    pub fn quit(&self) {
        self.reconnect.store(false, Ordering::SeqCst);
        self.send(Message::quit(self.config.quit_msg.as_str()));
        self.stop.cancel();
    }

    /// Drop the current session. The server reconnects if allowed.
    pub fn close(&self) {
        self.session.lock().cancel();
    }

    /// Route writes into a channel as if a session were live.
    #[cfg(test)]
    pub(crate) fn capture_outbound(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.outbound.lock() = Some(tx);
        rx
    }

    // ---------------------------------------------------------------------
    // Callbacks
    // ---------------------------------------------------------------------

    /// Subscribe `callback` to the events in `mask`.
    pub fn add_callback(&self, mask: EventMask, callback: Arc<dyn EventCallback>) {
        self.callbacks.write().push(Subscription { mask, callback });
    }

    fn emit(self: &Arc<Self>, event: &Event) {
        let kind = event.kind();
        let subscribers: Vec<_> = self
            .callbacks
            .read()
            .iter()
            .filter(|s| s.mask.contains(kind))
            .map(|s| Arc::clone(&s.callback))
            .collect();
        for callback in subscribers {
            callback.on_event(self, event);
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Connect and serve sessions until quit or until reconnecting is
    /// disabled.
    ///
    /// Returns an error only when every connection attempt of a cycle failed.
    pub async fn run(self: Arc<Self>) -> Result<(), TransportError> {
        loop {
            let stream = tokio::select! {
                _ = self.stop.cancelled() => return Ok(()),
                result = self.connect() => result?,
            };

            let session = self.stop.child_token();
            *self.session.lock() = session.clone();
            event_loop::run_session(&self, stream, session).await;
            self.teardown();

            if !self.reconnect_enabled() {
                info!("Connection closed, not reconnecting");
                return Ok(());
            }
            info!(server = %self.name, "Reconnecting");
        }
    }

    async fn connect(&self) -> Result<TcpStream, TransportError> {
        let host = self.config.server.as_str();
        let port = self.config.port;
        let attempts = self.config.max_reconnects.max(1);
        let timeout = self.config.connect_timeout();

        info!(server = %self.name, host = %host, port, "Connecting");
        self.set_status(ConnectionStatus::Connecting);

        for attempt in 1..=attempts {
            match time::timeout(timeout, TcpStream::connect((host, port))).await {
                Ok(Ok(stream)) => {
                    info!(attempt, "Connected");
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    let error = TransportError::Io(e);
                    warn!(attempt, error = %error, code = error.error_code(), "Connection attempt failed");
                }
                Err(_) => {
                    let error = TransportError::Timeout {
                        addr: format!("{host}:{port}"),
                        secs: timeout.as_secs_f64(),
                    };
                    warn!(attempt, error = %error, code = error.error_code(), "Connection attempt failed");
                }
            }
            if attempt < attempts {
                let backoff = self.config.reconnect_delay().saturating_mul(attempt);
                time::sleep(backoff).await;
            }
        }

        warn!("Maximum number of connection attempts exceeded, giving up");
        self.reconnect.store(false, Ordering::SeqCst);
        self.set_status(ConnectionStatus::Disconnected);
        Err(TransportError::Exhausted { attempts })
    }

    /// (Re)start the keepalive timer under the given session.
    fn arm_keepalive(self: &Arc<Self>, session: &CancellationToken) {
        let token = session.child_token();
        if let Some(previous) = self.keepalive.lock().replace(token.clone()) {
            previous.cancel();
        }
        keepalive::spawn(Arc::clone(self), token);
        debug!(interval_secs = self.config.keepalive_interval, "Keepalive armed");
    }

    fn teardown(&self) {
        if let Some(token) = self.keepalive.lock().take() {
            token.cancel();
        }
        self.outbound.lock().take();
        self.state.write().clear();
        self.set_status(ConnectionStatus::Disconnected);
        debug!("Connection state cleared");
    }
}

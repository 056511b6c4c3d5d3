//! Keepalive timer for a registered session.
//!
//! Every interval the server is either pinged or, after three silent
//! intervals, force-closed so the connection task can reconnect.

use std::sync::Arc;
use std::time::Duration;

use slirc_proto::Message;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use super::Server;

/// Silent intervals tolerated before the connection is considered dead.
pub const TIMEOUT_INTERVALS: u32 = 3;

/// What a keepalive tick should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ping,
    TimedOut,
}

/// Decide from the time since the last inbound line.
pub fn check(idle: Duration, interval: Duration) -> Verdict {
    if idle > interval * TIMEOUT_INTERVALS {
        Verdict::TimedOut
    } else {
        Verdict::Ping
    }
}

/// Run the timer until `token` is cancelled or the server times out.
pub fn spawn(server: Arc<Server>, token: CancellationToken) -> JoinHandle<()> {
    let interval = server.config().keepalive_interval();
    let span = tracing::info_span!("keepalive", server = %server.name());

    tokio::spawn(
        async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Keepalive cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let idle = server.idle();
                        match check(idle, interval) {
                            Verdict::TimedOut => {
                                warn!(
                                    idle_secs = idle.as_secs_f64(),
                                    "No response from server, closing connection"
                                );
                                server.close();
                                break;
                            }
                            Verdict::Ping => {
                                let host = server.state().server_host().map(str::to_owned);
                                if let Some(host) = host {
                                    server.send(Message::ping(host));
                                }
                            }
                        }
                    }
                }
            }
        }
        .instrument(span),
    )
}

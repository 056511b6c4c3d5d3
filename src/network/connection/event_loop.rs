//! Session event loop: one TCP stream, reader and writer in one select!.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use slirc_proto::{LineCodec, Message, ProtocolError};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::{ConnectionStatus, Server};
use crate::handlers::{Context, Effect};

/// Register, then serve the stream until it fails or `session` is cancelled.
pub(super) async fn run_session(server: &Arc<Server>, stream: TcpStream, session: CancellationToken) {
    let config = server.config();
    let codec = match LineCodec::new(&config.inencoding, &config.outencoding) {
        Ok(codec) => codec,
        Err(e) => {
            error!(error = %e, "Cannot build line codec");
            return;
        }
    };
    let mut framed = Framed::new(stream, codec);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    *server.outbound.lock() = Some(tx);
    server.touch();
    server.set_status(ConnectionStatus::Connected);

    let ident = config.ident();
    server.send(Message::nick(config.username.as_str()));
    server.send(Message::user(
        ident.user,
        ident.hostname,
        ident.servername,
        ident.realname,
    ));

    loop {
        tokio::select! {
            biased;

            _ = session.cancelled() => {
                // Flush what was queued before the close, QUIT included.
                while let Ok(line) = rx.try_recv() {
                    if framed.send(line).await.is_err() {
                        break;
                    }
                }
                debug!("Session closed locally");
                break;
            }

            Some(line) = rx.recv() => {
                if let Err(e) = framed.send(line).await {
                    warn!(error = %e, "Write failed, connection assumed lost");
                    break;
                }
            }

            frame = framed.next() => match frame {
                Some(Ok(line)) => {
                    let skipped = framed.codec_mut().take_discarded();
                    if skipped > 0 {
                        warn!(lines = skipped, limit = framed.codec().read_limit(), "Oversized lines skipped");
                    }
                    process_line(server, &session, &line);
                }
                Some(Err(ProtocolError::PartialLine(bytes))) => {
                    warn!(bytes, "Got partial read, connection assumed lost");
                    break;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Read failed, connection assumed lost");
                    break;
                }
                None => {
                    warn!("Server closed the connection");
                    break;
                }
            },
        }
    }

    server.outbound.lock().take();
    if let Err(e) = framed.close().await {
        debug!(error = %e, "Error closing transport");
    }
}

/// Apply one inbound line: state first, then effects outside the lock.
fn process_line(server: &Arc<Server>, session: &CancellationToken, line: &str) {
    debug!("<< {}", line);
    server.touch();

    if line.is_empty() {
        return;
    }
    let msg: Message = match line.parse() {
        Ok(msg) => msg,
        Err(e) => {
            warn!(line = %line, error = %e, "Malformed line skipped");
            return;
        }
    };

    let effects = {
        let mut state = server.state.write();
        let sender = msg.prefix.as_ref().map(|prefix| {
            let access = server.privileges.resolve(prefix.host.as_deref());
            state.observe_sender(prefix, access)
        });
        let mut ctx = Context::new(&server.name, &server.config, &mut state, sender);
        // Errors are logged by the registry; the line is done either way.
        let _ = server.handlers.dispatch(&mut ctx, &msg);
        ctx.into_effects()
    };

    for effect in effects {
        match effect {
            Effect::Send(msg) => {
                server.send(msg);
            }
            Effect::Event(event) => server.emit(&event),
            Effect::Welcomed => server.arm_keepalive(session),
        }
    }
}

//! PRIVMSG → command invocation.
//!
//! The dispatcher is a PRIVMSG callback. It runs on the read loop, so it
//! only resolves and gates; the handler itself runs in a spawned task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use super::registry::CommandRegistry;
use super::responder::{Invocation, Responder};
use crate::bot::Bot;
use crate::error::DispatchError;
use crate::events::{Event, EventCallback};
use crate::network::Server;
use crate::state::Sender;

/// Routes prefixed messages to the bot's current command snapshot.
pub struct Dispatcher {
    bot: Weak<Bot>,
}

impl Dispatcher {
    pub fn new(bot: Weak<Bot>) -> Self {
        Self { bot }
    }
}

impl EventCallback for Dispatcher {
    fn on_event(&self, server: &Arc<Server>, event: &Event) {
        let Event::Privmsg {
            sender,
            receiver,
            text,
        } = event
        else {
            return;
        };
        let Some(bot) = self.bot.upgrade() else {
            return;
        };
        invoke(
            &bot.registry(),
            Weak::clone(&self.bot),
            server,
            sender,
            receiver,
            text,
        );
    }
}

/// Resolve `text` and start the invocation.
///
/// Returns the invocation task, or `None` when the message is not a
/// command or no command matches.
pub fn invoke(
    registry: &Arc<CommandRegistry>,
    bot: Weak<Bot>,
    server: &Arc<Server>,
    sender: &Sender,
    receiver: &str,
    text: &str,
) -> Option<JoinHandle<()>> {
    let body = text.strip_prefix(server.config().prefix.as_str())?;
    let target = if server.state().is_channel(receiver) {
        receiver.to_string()
    } else {
        sender.nick.clone()
    };

    let tokens: Vec<String> = body.split(' ').map(String::from).collect();
    let resolution = match registry.resolve(&tokens) {
        Ok(resolution) => resolution,
        Err(e) => {
            debug!(error = %e, "Not a command");
            return None;
        }
    };

    let path = resolution.path.join(" ");
    let span = tracing::info_span!("command", path = %path, sender = %sender.nick);
    let responder = Responder::new(Invocation {
        server: Arc::clone(server),
        sender: sender.clone(),
        target,
        receiver: receiver.to_string(),
        line: resolution.args.join(" "),
        path: resolution.path,
        bot,
    });
    let entry = resolution.entry;
    let tokens = resolution.args;

    Some(tokio::spawn(
        async move {
            let outcome = run(&entry, responder.clone(), &tokens).await;
            if let Err(error) = outcome {
                report(&responder, &error);
            }
        }
        .instrument(span),
    ))
}

async fn run(
    entry: &super::CommandEntry,
    responder: Responder,
    tokens: &[String],
) -> Result<(), DispatchError> {
    let actual = responder.sender.access;
    let required = entry.required_access();
    if actual < required {
        return Err(DispatchError::PermissionDenied { required, actual });
    }

    let args = entry.signature().bind(tokens)?;
    let handler = entry.handler();
    match AssertUnwindSafe(handler.call(responder, args))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(DispatchError::from_handler(e)),
        Err(payload) => Err(DispatchError::panic(&panic_message(payload.as_ref()))),
    }
}

/// Log the failure and send its reply line to the target.
///
/// Binding failures are answered like a handler reply, addressed to the
/// caller. Denials and handler failures go out as bare lines.
fn report(responder: &Responder, error: &DispatchError) {
    match error {
        DispatchError::PermissionDenied { .. } | DispatchError::Binding(_) => {
            info!(error = %error, code = error.error_code(), "Command rejected");
        }
        _ => warn!(error = %error, code = error.error_code(), "Command failed"),
    }
    let Some(text) = error.reply_text() else {
        return;
    };
    match error {
        DispatchError::Binding(_) => responder.reply(&text),
        _ => responder.server.privmsg(&responder.target, &text),
    };
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessLevel;
    use crate::commands::{Arguments, CommandEntry, Namespace, Signature};
    use crate::error::{ACCESS_DENIED_REPLY, WRONG_ARGUMENTS_REPLY};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn server() -> (Arc<Server>, mpsc::UnboundedReceiver<String>) {
        let config = toml::from_str(
            r#"
server = "127.0.0.1"
port = 6667
prefix = "%"
"#,
        )
        .unwrap();
        let server = Server::new("test", config);
        let rx = server.capture_outbound();
        (server, rx)
    }

    fn sender(access: AccessLevel) -> Sender {
        Sender {
            nick: "alice".into(),
            ident: Some("al".into()),
            host: Some("example.org".into()),
            access,
        }
    }

    fn registry(calls: Arc<AtomicUsize>) -> Arc<CommandRegistry> {
        let mut root = Namespace::new();
        root.insert(CommandEntry::from_fn("echo", |r: Responder, _a: Arguments| async move {
            r.reply(&r.line);
            Ok(())
        }));
        let counter = Arc::clone(&calls);
        root.insert(
            CommandEntry::from_fn("shutdown", move |_r: Responder, _a: Arguments| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .access(AccessLevel::Admin),
        );
        root.insert(
            CommandEntry::from_fn("one", |_r: Responder, _a: Arguments| async { Ok(()) })
                .args(Signature::positional(&["x"])),
        );
        root.insert(CommandEntry::from_fn("fail", |_r: Responder, _a: Arguments| async {
            Err(anyhow::anyhow!("disk on fire"))
        }));
        root.insert(CommandEntry::from_fn("boom", |_r: Responder, _a: Arguments| async {
            panic!("kaboom")
        }));
        Arc::new(CommandRegistry::new(root))
    }

    async fn run_line(
        access: AccessLevel,
        receiver: &str,
        text: &str,
    ) -> (Vec<String>, usize) {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(Arc::clone(&calls));
        let (server, mut rx) = server();
        if let Some(task) = invoke(&registry, Weak::new(), &server, &sender(access), receiver, text)
        {
            task.await.unwrap();
        }
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        (lines, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_echo_in_channel() {
        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "%echo hello  world").await;
        assert_eq!(lines, vec!["PRIVMSG #chan :alice: hello  world"]);
    }

    #[tokio::test]
    async fn test_private_message_replies_to_sender() {
        let (lines, _) = run_line(AccessLevel::Standard, "slircbot", "%echo hi").await;
        assert_eq!(lines, vec!["PRIVMSG alice :hi"]);
    }

    #[tokio::test]
    async fn test_unprefixed_and_unknown_are_ignored() {
        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "echo hi").await;
        assert!(lines.is_empty());
        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "%nothing here").await;
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_access_denied_single_reply() {
        let (lines, calls) = run_line(AccessLevel::Standard, "#chan", "%shutdown").await;
        assert_eq!(calls, 0);
        assert_eq!(lines, vec![format!("PRIVMSG #chan :{ACCESS_DENIED_REPLY}")]);

        let (lines, calls) = run_line(AccessLevel::Admin, "#chan", "%shutdown").await;
        assert_eq!(calls, 1);
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_binding_failure_reply() {
        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "%one").await;
        assert_eq!(lines, vec![format!("PRIVMSG #chan :alice: {WRONG_ARGUMENTS_REPLY}")]);
        let (lines, _) = run_line(AccessLevel::Standard, "slircbot", "%one a b").await;
        assert_eq!(lines, vec![format!("PRIVMSG alice :{WRONG_ARGUMENTS_REPLY}")]);
        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "%one x").await;
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_and_panic_are_contained() {
        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "%fail").await;
        assert_eq!(lines, vec!["PRIVMSG #chan :Error: disk on fire"]);

        let (lines, _) = run_line(AccessLevel::Standard, "#chan", "%boom").await;
        assert_eq!(lines, vec!["PRIVMSG #chan :Panic: kaboom"]);
    }
}

//! Protocol handler registry and dispatch.

use std::collections::HashMap;

use slirc_proto::{Command, Message};
use tracing::{info, span, warn, Level};

use super::context::Context;
use crate::error::HandlerResult;
use crate::handlers::{
    channel::{JoinHandler, KickHandler, NamesHandler, PartHandler, TopicHandler},
    connection::{
        IsupportHandler, MotdHandler, PingHandler, PongHandler, ServerInfoHandler, WelcomeHandler,
    },
    messaging::{NoticeHandler, PrivmsgHandler},
    user::{NickHandler, QuitHandler},
};

/// Trait implemented by all protocol handlers.
///
/// Handlers run under the state write lock and must not block.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;
}

/// Registry of protocol handlers, keyed by wire command name.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection handlers
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("001", Box::new(WelcomeHandler));
        handlers.insert("005", Box::new(IsupportHandler));
        for code in [
            "002", "003", "004", "250", "251", "252", "253", "254", "255", "265", "266",
        ] {
            handlers.insert(code, Box::new(ServerInfoHandler));
        }
        for code in ["372", "375", "376"] {
            handlers.insert(code, Box::new(MotdHandler));
        }

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("332", Box::new(TopicHandler));
        handlers.insert("333", Box::new(TopicHandler));
        handlers.insert("353", Box::new(NamesHandler));
        handlers.insert("366", Box::new(NamesHandler));

        // User handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("NOTICE", Box::new(NoticeHandler));

        Self { handlers }
    }

    /// Number of registered command names.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// Lines without a prefix come from the server itself and are not
    /// routed: PING is answered, anything else is logged.
    pub fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let cmd_name = msg.command.name();

        if msg.prefix.is_none() {
            if let Command::PING(..) = msg.command {
                return PingHandler.handle(ctx, msg);
            }
            info!(line = %msg, "Server sent");
            return Ok(());
        }

        let Some(handler) = self.handlers.get(cmd_name.as_ref()) else {
            info!(command = %cmd_name, line = %msg, "Unsupported message");
            return Ok(());
        };

        let irc_span = span!(
            Level::DEBUG,
            "irc.event",
            command = %cmd_name,
            source_nick = msg.source_nickname(),
        );
        let _entered = irc_span.enter();

        let result = handler.handle(ctx, msg);
        if let Err(ref e) = result {
            warn!(command = %cmd_name, error = %e, code = e.error_code(), "Event not applied");
        }
        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::handlers::Effect;
    use crate::state::ConnectionState;

    fn config() -> ServerConfig {
        toml::from_str(
            r#"
server = "irc.example.org"
port = 6667
prefix = "%"
"#,
        )
        .unwrap()
    }

    fn run(state: &mut ConnectionState, line: &str) -> Vec<Effect> {
        let config = config();
        let registry = Registry::new();
        let msg: Message = line.parse().unwrap();
        let mut ctx = Context::new("test", &config, state, None);
        registry.dispatch(&mut ctx, &msg).unwrap();
        ctx.into_effects()
    }

    #[test]
    fn test_server_ping_is_answered() {
        let mut state = ConnectionState::new();
        let effects = run(&mut state, "PING :irc.example.org");
        assert_eq!(effects, vec![Effect::Send(Message::pong("irc.example.org"))]);
    }

    #[test]
    fn test_unprefixed_lines_are_not_routed() {
        let mut state = ConnectionState::new();
        let effects = run(&mut state, "NOTICE * :*** Looking up your hostname");
        assert!(effects.is_empty());
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let mut state = ConnectionState::new();
        let effects = run(&mut state, ":irc.example.org 396 bot host :is now your host");
        assert!(effects.is_empty());
        assert!(Registry::new().len() > 20);
    }
}

//! Nickname and quit handlers.

use slirc_proto::{Command, Message};
use tracing::info;

use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::events::Event;

/// NICK: rename in place.
pub struct NickHandler;

impl Handler for NickHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NICK(new_nick) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("NICK")?;

        info!(old = %sender.nick, new = %new_nick, "Nick changed");
        ctx.emit(Event::Nick {
            sender: sender.clone(),
            new_nick: new_nick.clone(),
        });
        ctx.state.rename(&sender.nick, new_nick)?;
        Ok(())
    }
}

/// QUIT: drop the user from every channel.
pub struct QuitHandler;

impl Handler for QuitHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::QUIT(reason) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("QUIT")?;

        info!(
            nick = %sender.nick,
            reason = reason.as_deref().unwrap_or(""),
            "User quit"
        );
        ctx.emit(Event::Quit {
            sender: sender.clone(),
            reason: reason.clone(),
        });
        ctx.state.quit(&sender.nick)?;
        Ok(())
    }
}

//! PRIVMSG and NOTICE: logged and handed to callbacks.

use slirc_proto::{Command, Message};
use tracing::info;

use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::events::Event;

pub struct PrivmsgHandler;

impl Handler for PrivmsgHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PRIVMSG(receiver, text) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("PRIVMSG")?;
        info!("<{} to {}> {}", sender.nick, receiver, text);
        ctx.emit(Event::Privmsg {
            sender,
            receiver: receiver.clone(),
            text: text.clone(),
        });
        Ok(())
    }
}

pub struct NoticeHandler;

impl Handler for NoticeHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NOTICE(receiver, text) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("NOTICE")?;
        info!("[NOTICE] <{} to {}> {}", sender.nick, receiver, text);
        ctx.emit(Event::Notice {
            sender,
            receiver: receiver.clone(),
            text: text.clone(),
        });
        Ok(())
    }
}

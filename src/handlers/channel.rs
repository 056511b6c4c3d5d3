//! Channel membership and topic handlers.

use slirc_proto::{Command, Message, Response};
use tracing::{debug, info};

use super::{numeric_args, Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::events::Event;

/// JOIN: link the sender to each listed channel.
pub struct JoinHandler;

impl Handler for JoinHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::JOIN(channels) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("JOIN")?;

        for channel in channels.split(',').filter(|c| !c.is_empty()) {
            info!(nick = %sender.nick, channel = %channel, "Joined channel");
            ctx.emit(Event::Join {
                sender: sender.clone(),
                channel: channel.to_string(),
            });
            ctx.state.join(&sender, channel)?;
        }
        Ok(())
    }
}

/// PART: unlink the sender, cascading when it is us.
pub struct PartHandler;

impl Handler for PartHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PART(channels, reason) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("PART")?;

        for channel in channels.split(',').filter(|c| !c.is_empty()) {
            info!(
                nick = %sender.nick,
                channel = %channel,
                reason = reason.as_deref().unwrap_or(""),
                "Parted channel"
            );
            ctx.emit(Event::Part {
                sender: sender.clone(),
                channel: channel.to_string(),
                reason: reason.clone(),
            });
            ctx.state.part(&sender.nick, channel)?;
        }
        Ok(())
    }
}

/// KICK: treated as a part of the kicked user.
pub struct KickHandler;

impl Handler for KickHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::KICK(channel, kicked, reason) = &msg.command else {
            return Ok(());
        };
        let sender = ctx.require_sender("KICK")?;

        info!(
            nick = %sender.nick,
            kicked = %kicked,
            channel = %channel,
            reason = reason.as_deref().unwrap_or(""),
            "Kicked from channel"
        );
        ctx.emit(Event::Kick {
            sender,
            channel: channel.clone(),
            kicked: kicked.clone(),
            reason: reason.clone(),
        });
        ctx.state.kick(channel, kicked)?;
        Ok(())
    }
}

/// TOPIC, 332 and 333.
pub struct TopicHandler;

impl Handler for TopicHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        match &msg.command {
            Command::TOPIC(channel, text) => {
                let sender = ctx.require_sender("TOPIC")?;
                let text = text.as_deref().unwrap_or("");
                info!(nick = %sender.nick, channel = %channel, topic = %text, "Topic changed");
                ctx.state.change_topic(channel, text, &sender)?;
            }
            Command::Response(Response::RPL_TOPIC, args) => {
                let [_, channel, text, ..] = args.as_slice() else {
                    return Err(malformed("332", msg));
                };
                info!(channel = %channel, topic = %text, "Topic");
                ctx.state.set_topic_text(channel, text)?;
            }
            Command::Response(Response::RPL_TOPICWHOTIME, args) => {
                let [_, channel, who, when, ..] = args.as_slice() else {
                    return Err(malformed("333", msg));
                };
                let timestamp: i64 = when.parse().map_err(|_| malformed("333", msg))?;
                info!(channel = %channel, set_by = %who, timestamp, "Topic set");
                ctx.state.set_topic_who_time(channel, who, timestamp)?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// 353 and 366.
pub struct NamesHandler;

impl Handler for NamesHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        match &msg.command {
            Command::Response(Response::RPL_NAMREPLY, _) => {
                // `<me> <symbol> <channel> :names`, some servers omit the symbol.
                let (channel, names) = match numeric_args(msg) {
                    [_, _, channel, names, ..] => (channel, names),
                    [_, channel, names] => (channel, names),
                    _ => return Err(malformed("353", msg)),
                };
                let applied = ctx.state.names(channel, names)?;
                info!(channel = %channel, count = applied, "Names received");
            }
            _ => debug!("End of NAMES"),
        }
        Ok(())
    }
}

fn malformed(cmd: &'static str, msg: &Message) -> HandlerError {
    HandlerError::Malformed {
        cmd,
        value: msg.to_string(),
    }
}

//! Registration, keepalive and server information handlers.

use slirc_proto::Message;
use tracing::{debug, info};

use super::{numeric_args, Context, Effect, Handler};
use crate::error::{HandlerError, HandlerResult};

/// PING: answer with PONG echoing the token.
pub struct PingHandler;

impl Handler for PingHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if let slirc_proto::Command::PING(token, _) = &msg.command {
            ctx.send(Message::pong(token.as_str()));
        }
        Ok(())
    }
}

pub struct PongHandler;

impl Handler for PongHandler {
    fn handle(&self, _ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        debug!(source = msg.source_nickname(), "Received PONG");
        Ok(())
    }
}

/// 001: record our identity and the server's name, then autojoin.
pub struct WelcomeHandler;

impl Handler for WelcomeHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let args = numeric_args(msg);
        let own_nick = args
            .first()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| HandlerError::Malformed {
                cmd: "001",
                value: msg.to_string(),
            })?;
        let host = msg.source_nickname().unwrap_or_default();

        ctx.state.welcome(own_nick, host);
        info!(nick = %own_nick, host = %host, "Registered");

        ctx.effects.push(Effect::Welcomed);
        for channel in &ctx.config.autojoin {
            ctx.effects.push(Effect::Send(Message::join(channel.as_str())));
        }
        Ok(())
    }
}

/// 005: accumulate ISUPPORT tokens.
pub struct IsupportHandler;

impl Handler for IsupportHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let args = numeric_args(msg);
        ctx.state.isupport.apply_response_args(args);
        debug!(tokens = ctx.state.isupport.len(), "ISUPPORT updated");
        Ok(())
    }
}

/// 002-004 and the LUSERS numerics: logged only.
pub struct ServerInfoHandler;

impl Handler for ServerInfoHandler {
    fn handle(&self, _ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let args = numeric_args(msg);
        let text = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
        info!(code = %msg.command.name(), text = %text, "Server info");
        Ok(())
    }
}

/// 372/375/376: logged only.
pub struct MotdHandler;

impl Handler for MotdHandler {
    fn handle(&self, _ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let text = numeric_args(msg).last().cloned().unwrap_or_default();
        info!(code = %msg.command.name(), "MOTD: {}", text);
        Ok(())
    }
}

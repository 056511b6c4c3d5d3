//! `essentials`: echo and connection control.

use anyhow::Context as _;

use crate::access::AccessLevel;
use crate::commands::{Arguments, CommandEntry, Namespace, Responder, Signature};
use crate::module::Module;

pub struct Essentials;

impl Module for Essentials {
    fn name(&self) -> &'static str {
        "essentials"
    }

    fn register(&self, root: &mut Namespace) {
        root.insert(CommandEntry::from_fn("echo", echo).doc("Echoes back the written line"));
        root.insert(
            CommandEntry::from_fn("join", join)
                .access(AccessLevel::Admin)
                .doc("Joins a channel")
                .args(Signature::none().optional("channel", "")),
        );
        root.insert(
            CommandEntry::from_fn("part", part)
                .access(AccessLevel::Admin)
                .doc("Parts a channel, the current one by default")
                .args(Signature::none().optional("channel", "")),
        );
        root.insert(
            CommandEntry::from_fn("quit", quit)
                .access(AccessLevel::Admin)
                .doc("Disconnects from every server and stops the bot")
                .args(Signature::none()),
        );
        root.insert(
            CommandEntry::from_fn("disconnect", disconnect)
                .access(AccessLevel::Admin)
                .doc("Disconnects from this server")
                .args(Signature::none()),
        );
        root.insert(
            CommandEntry::from_fn("nick", nick)
                .access(AccessLevel::Admin)
                .doc("Changes the bot's nickname on this server")
                .args(Signature::positional(&["nick"])),
        );
    }
}

async fn echo(r: Responder, _args: Arguments) -> anyhow::Result<()> {
    r.reply(&r.line);
    Ok(())
}

async fn join(r: Responder, args: Arguments) -> anyhow::Result<()> {
    let channel = args.str("channel")?;
    if channel.is_empty() {
        r.reply("You need to supply a channel to join");
        return Ok(());
    }

    let channel = {
        let state = r.server.state();
        if state.is_channel(channel) {
            channel.to_string()
        } else {
            let sigil = state.isupport.chantypes().chars().next().unwrap_or('#');
            format!("{sigil}{channel}")
        }
    };
    r.reply(&format!("Joining {channel}"));
    r.server.join(&channel);
    Ok(())
}

async fn part(r: Responder, args: Arguments) -> anyhow::Result<()> {
    let channel = args.str("channel")?;
    if channel.is_empty() {
        r.reply("Parting...");
        r.server.part(&r.target);
    } else {
        r.reply(&format!("Parting {channel}..."));
        r.server.part(channel);
    }
    Ok(())
}

async fn quit(r: Responder, _args: Arguments) -> anyhow::Result<()> {
    let bot = r.bot().context("bot is shutting down")?;
    r.reply("Quitting...");
    bot.quit();
    Ok(())
}

async fn disconnect(r: Responder, _args: Arguments) -> anyhow::Result<()> {
    r.reply(&format!("Disconnecting from {}...", r.server.name()));
    r.server.quit();
    Ok(())
}

async fn nick(r: Responder, args: Arguments) -> anyhow::Result<()> {
    let nick = args.str("nick")?;
    r.reply(&format!("Changing nick to {nick}"));
    r.server.nick(nick);
    Ok(())
}

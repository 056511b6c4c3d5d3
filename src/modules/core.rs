//! `core`: introspection and administration.

use anyhow::Context as _;

use crate::access::AccessLevel;
use crate::commands::{Arguments, CommandEntry, CommandNode, Namespace, Responder, Signature};
use crate::module::Module;

pub struct Core;

impl Module for Core {
    fn name(&self) -> &'static str {
        "core"
    }

    fn register(&self, root: &mut Namespace) {
        root.insert(
            CommandEntry::from_fn("help", help)
                .doc("Displays help for the specified command")
                .args(Signature::none().variadic("command")),
        );
        root.insert(
            CommandEntry::from_fn("commands", commands)
                .doc("Displays all available commands")
                .args(Signature::none()),
        );
        root.insert(
            CommandEntry::from_fn("whoami", whoami)
                .doc("Displays your information such as username, hostname and access level")
                .args(Signature::none()),
        );
        root.insert(
            CommandEntry::from_fn("access", access)
                .access(AccessLevel::Admin)
                .doc("Sets the access level of a hostname")
                .args(Signature::positional(&["host", "level"])),
        );
        root.insert(
            CommandEntry::from_fn("reload", reload)
                .access(AccessLevel::Admin)
                .doc("Reloads all modules")
                .args(Signature::none()),
        );
    }
}

async fn help(r: Responder, args: Arguments) -> anyhow::Result<()> {
    let bot = r.bot().context("bot is shutting down")?;
    let registry = bot.registry();

    // Bare `help` describes itself.
    let path = if args.rest().is_empty() {
        r.path.clone()
    } else {
        args.rest().to_vec()
    };
    let entry = match registry.lookup_exact(&path) {
        Some(CommandNode::Handler(entry)) => Some(entry),
        Some(CommandNode::Namespace(ns)) => ns.default_entry(),
        None => None,
    };

    match entry {
        Some(entry) => {
            let usage = entry.signature().render();
            let path = path.join(" ");
            if usage.is_empty() {
                r.reply(&format!("{path}: {}", entry.help()));
            } else {
                r.reply(&format!("{path} {usage}: {}", entry.help()));
            }
        }
        None => {
            r.reply(&format!("No such command: '{}'", r.line));
        }
    }
    Ok(())
}

async fn commands(r: Responder, _args: Arguments) -> anyhow::Result<()> {
    let bot = r.bot().context("bot is shutting down")?;
    let visible: Vec<String> = bot
        .registry()
        .flatten()
        .into_iter()
        .filter(|(_, entry)| entry.required_access() <= r.sender.access)
        .map(|(path, _)| path)
        .collect();
    r.reply(&format!("Available commands: {}", visible.join(", ")));
    Ok(())
}

async fn whoami(r: Responder, _args: Arguments) -> anyhow::Result<()> {
    r.reply(&format!(
        "You are {}, and you have access {}",
        r.sender.hostmask(),
        r.sender.access
    ));
    Ok(())
}

async fn access(r: Responder, args: Arguments) -> anyhow::Result<()> {
    let host = args.str("host")?;
    let Ok(level) = args.str("level")?.parse::<AccessLevel>() else {
        r.reply("Invalid access type");
        return Ok(());
    };
    let previous = r.server.privileges().set(host, level);
    tracing::info!(host, %level, previous = ?previous, "Privilege changed");
    r.reply(&format!("User {host} is now {level}"));
    Ok(())
}

async fn reload(r: Responder, _args: Arguments) -> anyhow::Result<()> {
    let bot = r.bot().context("bot is shutting down")?;
    bot.reload();
    r.reply("Modules reloaded successfully");
    Ok(())
}

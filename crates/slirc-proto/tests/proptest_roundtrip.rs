//! Property-based tests for IRC message parsing.
//!
//! Generates random IRC components and checks that serialized messages
//! parse back to the same value and that outbound sanitation never lets a
//! line terminator through.

use proptest::prelude::*;
use slirc_proto::{sanitize_line, Command, Message, Prefix};

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Message text that doesn't contain CR/LF (which would break IRC protocol)
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,400}").expect("valid regex")
}

/// Edge cases for colon and space handling in the trailing parameter.
fn dangerous_message_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("".to_string()),
        Just(" ".to_string()),
        Just(":".to_string()),
        Just("::".to_string()),
        Just(": trailing".to_string()),
        Just(":leading".to_string()),
        Just("multiple   spaces   here".to_string()),
        Just("mixed :colon and space".to_string()),
        Just("x".repeat(400)),
    ]
}

fn prefix_strategy() -> impl Strategy<Value = Prefix> {
    prop_oneof![
        prop::string::string_regex("[a-z]+\\.[a-z]+\\.[a-z]+")
            .expect("valid regex")
            .prop_map(|server| Prefix {
                nick: server,
                ident: None,
                host: None,
            }),
        (
            nickname_strategy(),
            username_strategy(),
            hostname_strategy()
        )
            .prop_map(|(nick, user, host)| Prefix::new(nick, user, host)),
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![message_text_strategy(), dangerous_message_text_strategy()]
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (channel_strategy(), text_strategy())
            .prop_map(|(target, text)| Command::PRIVMSG(target, text)),
        (nickname_strategy(), text_strategy())
            .prop_map(|(target, text)| Command::NOTICE(target, text)),
        nickname_strategy().prop_map(Command::NICK),
        channel_strategy().prop_map(Command::JOIN),
        (channel_strategy(), prop::option::of(text_strategy()))
            .prop_map(|(chan, msg)| Command::PART(chan, msg)),
        (
            channel_strategy(),
            nickname_strategy(),
            prop::option::of(text_strategy())
        )
            .prop_map(|(chan, nick, reason)| Command::KICK(chan, nick, reason)),
        prop::option::of(text_strategy()).prop_map(Command::QUIT),
        (channel_strategy(), prop::option::of(text_strategy()))
            .prop_map(|(chan, topic)| Command::TOPIC(chan, topic)),
        hostname_strategy().prop_map(|server| Command::PING(server, None)),
        hostname_strategy().prop_map(|server| Command::PONG(server, None)),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (prop::option::of(prefix_strategy()), command_strategy())
        .prop_map(|(prefix, command)| Message { prefix, command })
}

proptest! {
    /// parse → serialize → parse = identity
    #[test]
    fn message_roundtrip(msg in message_strategy()) {
        let serialized = msg.to_string();
        let parsed: Message = serialized.parse()
            .expect("Serialized message should be parseable");
        prop_assert_eq!(&msg, &parsed,
            "Roundtrip failed for serialized: {}", serialized);
    }

    #[test]
    fn prefix_roundtrip(prefix in prefix_strategy()) {
        let serialized = prefix.to_string();
        prop_assert_eq!(&prefix, &Prefix::parse(&serialized));
    }

    /// Parsing arbitrary input never panics.
    #[test]
    fn parse_never_panics(raw in "\\PC{0,600}") {
        let _ = raw.parse::<Message>();
    }

    /// Sanitized output has no control characters and respects the limit.
    #[test]
    fn sanitized_line_is_bounded(raw in "(?s).{0,800}", limit in 1usize..500) {
        let out = sanitize_line(&raw, limit);
        prop_assert!(out.chars().all(|c| (c as u32) >= 0x20));
        prop_assert!(out.chars().count() <= limit + " <...>".len());
    }
}

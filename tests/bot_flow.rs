//! Integration tests for registration, state tracking and command dispatch
//! against a scripted IRC server.

mod common;

use common::{ADMIN_HOST, MockIrcd, bot_for, config_for};
use slircbot::network::ConnectionStatus;

#[tokio::test]
async fn test_registration_and_autojoin() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(
        config_for(ircd.port(), r##"autojoin = ["#one", "#two"]"##),
        &dir,
    );
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut peer = ircd.accept().await.unwrap();
    assert_eq!(peer.recv().await.unwrap().as_deref(), Some("NICK :slircbot"));
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("USER slircbot - - :slircbot")
    );
    peer.send_raw(":irc.test 001 slircbot :Welcome").await.unwrap();
    assert_eq!(peer.recv().await.unwrap().as_deref(), Some("JOIN #one"));
    assert_eq!(peer.recv().await.unwrap().as_deref(), Some("JOIN #two"));

    peer.send_raw("PING :abc123").await.unwrap();
    assert_eq!(peer.recv().await.unwrap().as_deref(), Some("PONG abc123"));

    let server = bot.server("mock").unwrap();
    assert_eq!(server.status(), ConnectionStatus::Connected);
    assert_eq!(server.state().server_host(), Some("irc.test"));

    bot.quit();
    assert_eq!(peer.expect("QUIT").await.unwrap(), "QUIT :bye");
    peer.closed().await.unwrap();
    runner.await.unwrap().unwrap();
    assert!(bot.server("mock").is_none());
}

#[tokio::test]
async fn test_state_follows_channel_events() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(config_for(ircd.port(), ""), &dir);
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut peer = ircd.accept().await.unwrap();
    peer.register("slircbot").await.unwrap();
    for line in [
        ":irc.test 005 slircbot CHANTYPES=# PREFIX=(ov)@+ TOPICLEN=390 :are supported",
        ":slircbot!bot@bot.host JOIN #rust",
        ":irc.test 353 slircbot = #rust :slircbot @alice +bob",
        ":irc.test 366 slircbot #rust :End of /NAMES list.",
        ":irc.test 332 slircbot #rust :Welcome to #rust",
        ":alice!al@alice.host NICK alicia",
        ":bob!b@bob.host PART #rust :later",
    ] {
        peer.send_raw(line).await.unwrap();
    }
    peer.sync("s1").await.unwrap();

    let server = bot.server("mock").unwrap();
    {
        let state = server.state();
        let channel = state.channel("#RUST").unwrap();
        assert_eq!(channel.topic_text(), Some("Welcome to #rust"));
        assert_eq!(channel.users.len(), 2);
        assert!(state.user("alice").is_none());
        assert!(state.user("Alicia").unwrap().channels.contains(&channel.key()));
        assert!(state.user("bob").is_none());
        assert!(state.check_membership().is_ok());
    }

    peer.send_raw(":slircbot!bot@bot.host PART #rust").await.unwrap();
    peer.sync("s2").await.unwrap();
    {
        let state = server.state();
        assert!(state.channel("#rust").is_none());
        assert!(state.user("alicia").is_none());
        assert!(state.own_user().is_some());
    }

    bot.quit();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_commands_over_the_wire() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(config_for(ircd.port(), ""), &dir);
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut peer = ircd.accept().await.unwrap();
    peer.register("slircbot").await.unwrap();

    peer.send_raw(":alice!al@alice.host PRIVMSG #chan :%echo hi  there")
        .await
        .unwrap();
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("PRIVMSG #chan :alice: hi  there")
    );

    peer.send_raw(":alice!al@alice.host PRIVMSG slircbot :%whoami")
        .await
        .unwrap();
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("PRIVMSG alice :You are alice!al@alice.host, and you have access STANDARD")
    );

    // Not a command, and no such command: both silent.
    peer.send_raw(":alice!al@alice.host PRIVMSG #chan :hello %echo")
        .await
        .unwrap();
    peer.send_raw(":alice!al@alice.host PRIVMSG #chan :%frobnicate")
        .await
        .unwrap();
    peer.sync("quiet").await.unwrap();

    peer.send_raw(":alice!al@alice.host PRIVMSG #chan :%quit")
        .await
        .unwrap();
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("PRIVMSG #chan :You do not have access to this command")
    );

    peer.send_raw(&format!(":root!r@{ADMIN_HOST} PRIVMSG #chan :%join"))
        .await
        .unwrap();
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("PRIVMSG #chan :root: You need to supply a channel to join")
    );

    peer.send_raw(&format!(":root!r@{ADMIN_HOST} PRIVMSG #chan :%quit"))
        .await
        .unwrap();
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("PRIVMSG #chan :root: Quitting...")
    );
    assert_eq!(peer.recv().await.unwrap().as_deref(), Some("QUIT :bye"));
    peer.closed().await.unwrap();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_oversized_line_is_skipped_and_session_survives() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(config_for(ircd.port(), ""), &dir);
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut peer = ircd.accept().await.unwrap();
    peer.register("slircbot").await.unwrap();

    let flood = format!(":alice!al@alice.host PRIVMSG #chan :%echo {}", "x".repeat(20_000));
    peer.send_raw(&flood).await.unwrap();
    peer.send_raw(":alice!al@alice.host PRIVMSG #chan :%echo after")
        .await
        .unwrap();
    assert_eq!(
        peer.recv().await.unwrap().as_deref(),
        Some("PRIVMSG #chan :alice: after")
    );
    assert_eq!(
        bot.server("mock").unwrap().status(),
        ConnectionStatus::Connected
    );

    bot.quit();
    runner.await.unwrap().unwrap();
}

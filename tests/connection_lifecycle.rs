//! Integration tests for the connection lifecycle: keepalive, reconnect and
//! giving up.

mod common;

use std::time::Duration;

use common::{MockIrcd, bot_for, config_for};
use slircbot::network::ConnectionStatus;
use tokio::time::timeout;

#[tokio::test]
async fn test_keepalive_pings_then_reconnects_after_silence() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(
        config_for(
            ircd.port(),
            "keepalive_interval = 0.2\nreconnect_delay = 0.05\nautojoin = [\"#keep\"]",
        ),
        &dir,
    );
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut first = ircd.accept().await.unwrap();
    first.register("slircbot").await.unwrap();
    first.expect("JOIN #keep").await.unwrap();

    // Stay silent: the bot pings, then gives up on the session.
    assert_eq!(first.expect("PING").await.unwrap(), "PING :irc.test");
    first.closed().await.unwrap();

    let mut second = ircd.accept().await.unwrap();
    second.register("slircbot").await.unwrap();
    second.expect("JOIN #keep").await.unwrap();
    second.sync("back").await.unwrap();
    assert_eq!(
        bot.server("mock").unwrap().status(),
        ConnectionStatus::Connected
    );

    bot.quit();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_close_triggers_reconnect_with_fresh_state() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(config_for(ircd.port(), "reconnect_delay = 0.05"), &dir);
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut first = ircd.accept().await.unwrap();
    first.register("slircbot").await.unwrap();
    first.send_raw(":slircbot!b@h JOIN #gone").await.unwrap();
    first.sync("joined").await.unwrap();
    assert!(bot.server("mock").unwrap().state().channel("#gone").is_some());
    drop(first);

    let mut second = ircd.accept().await.unwrap();
    second.expect("NICK :slircbot").await.unwrap();
    assert!(bot.server("mock").unwrap().state().channel("#gone").is_none());

    bot.quit();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_disabled_reconnect_removes_server() {
    let ircd = MockIrcd::bind().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(config_for(ircd.port(), "reconnect = false"), &dir);
    let runner = tokio::spawn({
        let bot = bot.clone();
        async move { bot.run().await }
    });

    let mut peer = ircd.accept().await.unwrap();
    peer.register("slircbot").await.unwrap();
    drop(peer);

    // The only server ended normally, so the bot stops on its own.
    timeout(Duration::from_secs(5), runner)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(bot.server("mock").is_none());
}

#[tokio::test]
async fn test_unreachable_server_exhausts_attempts() {
    // Bind and release a port so nothing is listening on it.
    let port = {
        let ircd = MockIrcd::bind().await.unwrap();
        ircd.port()
    };
    let dir = tempfile::tempdir().unwrap();
    let bot = bot_for(
        config_for(port, "max_reconnects = 2\nreconnect_delay = 0.01\nconnect_timeout = 1.0"),
        &dir,
    );

    let result = timeout(Duration::from_secs(10), bot.run()).await.unwrap();
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "every server connection failed permanently");
    assert!(bot.server("mock").is_none());
}

//! Scripted IRC server.
//!
//! Listens on an ephemeral port; each accepted bot connection becomes a
//! [`Peer`] the test reads from and writes to line by line.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Server name used as the prefix of numerics.
pub const SERVER_NAME: &str = "irc.test";

pub struct MockIrcd {
    listener: TcpListener,
}

impl MockIrcd {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<Peer> {
        let (stream, _) = timeout(RECV_TIMEOUT, self.listener.accept()).await??;
        Ok(Peer::new(stream))
    }
}

/// The server side of one bot connection.
pub struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl Peer {
    fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        }
    }

    /// Send one raw line; CRLF is appended.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line from the bot without its terminator, or `None` on EOF.
    pub async fn recv(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Read lines until one starts with `prefix`, returning it.
    pub async fn expect(&mut self, prefix: &str) -> anyhow::Result<String> {
        loop {
            match self.recv().await? {
                Some(line) if line.starts_with(prefix) => return Ok(line),
                Some(_) => continue,
                None => anyhow::bail!("connection closed while waiting for {prefix:?}"),
            }
        }
    }

    /// Read the NICK/USER pair and answer with a welcome.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<()> {
        self.expect("NICK ").await?;
        self.expect("USER ").await?;
        self.send_raw(&format!(":{SERVER_NAME} 001 {nick} :Welcome to the test network"))
            .await
    }

    /// Ping the bot and wait for the matching PONG, so that everything
    /// sent before has been applied.
    pub async fn sync(&mut self, token: &str) -> anyhow::Result<()> {
        self.send_raw(&format!("PING :{token}")).await?;
        self.expect(&format!("PONG {token}")).await?;
        Ok(())
    }

    /// Wait until the bot closes the connection.
    pub async fn closed(&mut self) -> anyhow::Result<()> {
        while self.recv().await?.is_some() {}
        Ok(())
    }
}

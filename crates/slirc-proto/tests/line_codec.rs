//! Integration tests for the line codec.

use bytes::BytesMut;
use slirc_proto::error::ProtocolError;
use slirc_proto::{Command, LineCodec, Message};
use tokio_util::codec::{Decoder, Encoder};

fn decode_all(codec: &mut LineCodec, raw: &[u8]) -> Vec<String> {
    let mut buf = BytesMut::from(raw);
    let mut lines = Vec::new();
    while let Some(line) = codec.decode(&mut buf).expect("decode") {
        lines.push(line);
    }
    lines
}

#[test]
fn test_burst_of_lines_decodes_in_order() {
    let mut codec = LineCodec::default();
    let lines = decode_all(
        &mut codec,
        b":srv 001 bot :Welcome\r\n:srv 005 bot TOPICLEN=390 :are supported\r\nPING :srv\r\n",
    );
    assert_eq!(lines.len(), 3);

    let parsed: Vec<Message> = lines.iter().map(|l| l.parse().unwrap()).collect();
    assert_eq!(parsed[2].command, Command::PING("srv".into(), None));
}

#[test]
fn test_bare_newline_terminator_is_accepted() {
    let mut codec = LineCodec::default();
    assert_eq!(decode_all(&mut codec, b"PING :a\nPING :b\n"), ["PING :a", "PING :b"]);
}

#[test]
fn test_mixed_encodings_per_line() {
    let mut codec = LineCodec::default();
    let lines = decode_all(&mut codec, "PRIVMSG #c :ünï\r\n".as_bytes());
    assert_eq!(lines, ["PRIVMSG #c :ünï"]);

    let lines = decode_all(&mut codec, b"PRIVMSG #c :\xfc\r\n");
    assert_eq!(lines, ["PRIVMSG #c :ü"]);
}

#[test]
fn test_fixed_encoding_replaces_invalid_bytes() {
    let mut codec = LineCodec::new("utf-8", "utf-8").unwrap();
    let lines = decode_all(&mut codec, b"x\xff\r\n");
    assert_eq!(lines, ["x\u{fffd}"]);
}

#[test]
fn test_partial_line_at_eof() {
    let mut codec = LineCodec::default();
    let mut buf = BytesMut::from(&b"PING :a\r\nPING :"[..]);
    assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("PING :a".into()));
    assert!(matches!(
        codec.decode_eof(&mut buf),
        Err(ProtocolError::PartialLine(6))
    ));
}

#[test]
fn test_encode_serialized_message() {
    let mut codec = LineCodec::default();
    let mut buf = BytesMut::new();
    codec
        .encode(Message::nick("slircbot").to_string(), &mut buf)
        .unwrap();
    codec
        .encode(Message::user("bot", "-", "-", "Sl IRC Bot").to_string(), &mut buf)
        .unwrap();
    assert_eq!(&buf[..], b"NICK :slircbot\r\nUSER bot - - :Sl IRC Bot\r\n");
}

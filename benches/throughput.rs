use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use slirc_proto::{Message, sanitize_line};
use slircbot::commands::{Arguments, CommandEntry, CommandRegistry, Namespace, Responder, Signature};

// Hot paths of the read loop and the dispatcher: parsing every inbound
// line, sanitizing every outbound one, resolving every prefixed PRIVMSG.

fn parsing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    let raw = ":sender!user@host.example.org PRIVMSG #channel :%sssb addfilter --limit 5 cheap gpus";
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("parse_privmsg", |b| {
        b.iter(|| raw.parse::<Message>().unwrap())
    });

    let names = ":irc.test 353 slircbot = #rust :slircbot @alice +bob carol dave @erin frank +grace";
    group.bench_function("parse_names", |b| b.iter(|| names.parse::<Message>().unwrap()));

    group.finish();
}

fn sanitize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("outbound");
    let line = "PRIVMSG #channel :tab\there and a long tail ".repeat(12);
    group.throughput(Throughput::Bytes(line.len() as u64));

    group.bench_function("sanitize_truncate", |b| b.iter(|| sanitize_line(&line, 300)));

    group.finish();
}

fn noop(name: &str) -> CommandEntry {
    CommandEntry::from_fn(name, |_r: Responder, _a: Arguments| async { Ok(()) })
}

fn resolve_benchmark(c: &mut Criterion) {
    let mut root = Namespace::new();
    for name in ["help", "commands", "whoami", "access", "reload", "echo", "join", "part"] {
        root.insert(noop(name));
    }
    let sssb = root.namespace("sssb");
    sssb.insert(noop("addfilter").args(Signature::positional(&["query"]).variadic("terms")));
    sssb.insert(noop("delfilter"));
    sssb.set_default(noop("sssb"));
    let registry = CommandRegistry::new(root);

    let mut group = c.benchmark_group("dispatch");
    let tokens: Vec<String> = "sssb addfilter cheap gpus now"
        .split(' ')
        .map(String::from)
        .collect();
    group.bench_function("resolve_nested", |b| {
        b.iter(|| registry.resolve(&tokens).unwrap())
    });

    let fallback: Vec<String> = "sssb list all".split(' ').map(String::from).collect();
    group.bench_function("resolve_default", |b| {
        b.iter(|| registry.resolve(&fallback).unwrap())
    });

    let resolution = registry.resolve(&tokens).unwrap();
    group.bench_function("bind_positional", |b| {
        b.iter(|| resolution.entry.signature().bind(&resolution.args).unwrap())
    });

    group.finish();
}

criterion_group!(benches, parsing_benchmark, sanitize_benchmark, resolve_benchmark);
criterion_main!(benches);

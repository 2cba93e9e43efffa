// tests/property_tee.rs

mod common;

use std::ffi::OsString;

use proptest::prelude::*;
use teexec::Stream;
use teexec::exec::{Invocation, Tee, split_command_line};

use crate::common::SharedSink;

fn stream_strategy() -> impl Strategy<Value = Stream> {
    prop_oneof![
        Just(Stream::Stdout),
        Just(Stream::Stderr),
        Just(Stream::Combined)
    ]
}

proptest! {
    /// Whatever chunks arrive, the sink and the buffer end up identical.
    #[test]
    fn sink_mirrors_buffer(
        stream in stream_strategy(),
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..256), 0..64),
        flush in any::<bool>(),
    ) {
        let sink = SharedSink::new();
        let mut tee = Tee::new(stream, sink.boxed(), flush);

        let mut expected = Vec::new();
        for chunk in &chunks {
            tee.write_chunk(chunk);
            expected.extend_from_slice(chunk);
        }

        prop_assert_eq!(tee.stream(), stream);
        prop_assert_eq!(tee.buffer(), expected.as_slice());

        let (captured, sink_error) = tee.into_parts();
        prop_assert!(sink_error.is_none());
        prop_assert_eq!(&captured, &expected);
        prop_assert_eq!(sink.contents(), captured);
    }

    /// A sink that breaks never costs captured bytes, and only ever sees a
    /// prefix of them.
    #[test]
    fn broken_sink_sees_a_prefix(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..64), 1..32),
        limit in 0usize..512,
    ) {
        let sink = SharedSink::failing_after(limit);
        let mut tee = Tee::new(Stream::Stdout, sink.boxed(), false);

        for chunk in &chunks {
            tee.write_chunk(chunk);
        }

        let total: usize = chunks.iter().map(Vec::len).sum();
        let (captured, sink_error) = tee.into_parts();

        prop_assert_eq!(captured.len(), total);
        prop_assert!(captured.starts_with(&sink.contents()));
        prop_assert_eq!(sink_error.is_some(), total > limit);
    }

    /// The program is everything before the first space, the argument is
    /// everything after it, untouched.
    #[test]
    fn split_command_line_cuts_at_first_space(line in "[a-z \\-]{0,40}") {
        let (program, rest) = split_command_line(&line);

        prop_assert!(!program.contains(' '));
        if line.contains(' ') {
            prop_assert_eq!(format!("{program} {rest}"), line.clone());
        } else {
            prop_assert_eq!(program, line.as_str());
            prop_assert_eq!(rest, "");
        }
    }
}

#[test]
fn rest_of_line_is_kept_verbatim() {
    assert_eq!(split_command_line("echo  a "), ("echo", " a "));
    assert_eq!(split_command_line("printf [%s] a b"), ("printf", "[%s] a b"));
    assert_eq!(split_command_line("echo"), ("echo", ""));
    assert_eq!(split_command_line(""), ("", ""));
}

#[test]
fn invocation_from_command_line() {
    let inv = Invocation::from_command_line("git log --oneline");

    assert_eq!(inv.program(), "git");
    assert_eq!(inv.args().to_vec(), vec![OsString::from("log --oneline")]);
    assert_eq!(inv.program_name(), "git");
    assert_eq!(inv.to_string(), "git log --oneline");
}

#[test]
fn failing_final_flush_is_a_sink_error() {
    let sink = SharedSink::failing_flush();
    let mut tee = Tee::new(Stream::Combined, sink.boxed(), false);

    tee.write_chunk(b"foo\n");
    tee.write_chunk(b"bar\n");
    assert!(tee.sink_error().is_none());

    let (captured, sink_error) = tee.into_parts();
    assert_eq!(captured, b"foo\nbar\n");
    assert_eq!(sink.contents(), b"foo\nbar\n");

    let (stream, e) = sink_error.expect("final flush failure is reported");
    assert_eq!(stream, Stream::Combined);
    assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe);
}

#[test]
fn first_sink_error_wins_over_final_flush() {
    // Writes fail after 3 bytes; the sink is detached before the final flush.
    let sink = SharedSink::failing_after(3);
    let mut tee = Tee::new(Stream::Stderr, sink.boxed(), true);

    tee.write_chunk(b"abcdef");
    tee.write_chunk(b"gh");

    let (captured, sink_error) = tee.into_parts();
    assert_eq!(captured, b"abcdefgh");
    let (stream, _) = sink_error.expect("write failure is reported");
    assert_eq!(stream, Stream::Stderr);
}

#[test]
fn capture_only_never_reports_a_sink_error() {
    let mut tee = Tee::capture_only(Stream::Stdout);
    tee.write_chunk(b"x");

    let (captured, sink_error) = tee.into_parts();
    assert_eq!(captured, b"x");
    assert!(sink_error.is_none());
}

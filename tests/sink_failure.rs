// tests/sink_failure.rs
#![cfg(unix)]

mod common;
use crate::common::{SH, ScriptDir, SharedSink, TestResult, init_tracing};

use std::error::Error as _;

use teexec::config::RunnerConfig;
use teexec::{ExecError, Runner, Stream};

#[test]
fn failing_sink_is_reported_but_capture_continues() -> TestResult {
    init_tracing();
    let dir = ScriptDir::new()?;
    let script = dir.script(
        "lines.sh",
        "#!/bin/sh\ni=0\nwhile [ $i -lt 50 ]; do echo \"line $i\"; i=$((i+1)); done\n",
    )?;

    let sink = SharedSink::failing_after(16);
    let failure = teexec::run_tee(sink.clone(), SH, [&script]).unwrap_err();

    match &failure.error {
        ExecError::Sink { stream, source, .. } => {
            assert_eq!(*stream, Stream::Combined);
            assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
        }
        other => panic!("expected Sink error, got {other:?}"),
    }

    let text = String::from_utf8(failure.output.clone())?;
    assert_eq!(text.lines().count(), 50);
    assert!(text.ends_with("line 49\n"));

    // The sink got a prefix of the output and nothing after the failure.
    let seen = sink.contents();
    assert!(seen.len() <= 16);
    assert!(failure.output.starts_with(&seen));

    assert!(failure.source().is_some());

    Ok(())
}

#[test]
fn exit_failure_takes_precedence_over_sink_failure() -> TestResult {
    init_tracing();
    let dir = ScriptDir::new()?;
    let script = dir.script(
        "fail.sh",
        "#!/bin/sh\necho 'much more than four bytes' >&2\nexit 1\n",
    )?;

    let failure = teexec::run_split_tee(
        teexec::discard(),
        SharedSink::failing_after(4),
        SH,
        [&script],
    )
    .unwrap_err();

    assert!(matches!(failure.error, ExecError::Exit { .. }));
    assert_eq!(failure.output.stderr, b"much more than four bytes\n");

    Ok(())
}

#[test]
fn split_sink_failure_names_the_channel() -> TestResult {
    init_tracing();

    let failure = teexec::run_split_tee(
        teexec::discard(),
        SharedSink::failing_after(0),
        SH,
        ["-c", "echo fine; echo broken >&2"],
    )
    .unwrap_err();

    match failure.error {
        ExecError::Sink { stream, .. } => assert_eq!(stream, Stream::Stderr),
        ref other => panic!("expected Sink error, got {other:?}"),
    }
    assert_eq!(failure.output.stdout, b"fine\n");
    assert_eq!(failure.output.stderr, b"broken\n");

    Ok(())
}

#[test]
fn failing_final_flush_is_reported() -> TestResult {
    init_tracing();
    let runner = Runner::new(RunnerConfig {
        flush_sinks: false,
        ..RunnerConfig::default()
    })?;

    let sink = SharedSink::failing_flush();
    let failure = runner
        .run_tee(sink.clone(), SH, ["-c", "echo out; echo err >&2"])
        .unwrap_err();

    match &failure.error {
        ExecError::Sink { stream, source, .. } => {
            assert_eq!(*stream, Stream::Combined);
            assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
        }
        other => panic!("expected Sink error, got {other:?}"),
    }
    assert_eq!(failure.output, b"out\nerr\n");
    // Every write went through before the flush failed.
    assert_eq!(sink.contents(), failure.output);

    Ok(())
}

#[test]
fn failing_flush_per_chunk_is_reported_for_split_channels() -> TestResult {
    init_tracing();

    let failure = teexec::run_split_tee(
        SharedSink::failing_flush(),
        teexec::discard(),
        SH,
        ["-c", "echo out; echo err >&2"],
    )
    .unwrap_err();

    match failure.error {
        ExecError::Sink { stream, .. } => assert_eq!(stream, Stream::Stdout),
        ref other => panic!("expected Sink error, got {other:?}"),
    }
    assert_eq!(failure.output.stdout, b"out\n");
    assert_eq!(failure.output.stderr, b"err\n");

    Ok(())
}

#![allow(dead_code)]

pub use teexec_test_utils::scripts;
pub use teexec_test_utils::{ScriptDir, SharedSink, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Shell used to run fixture scripts. Going through `sh` instead of executing
/// the freshly written file directly avoids ETXTBSY races between tests.
pub const SH: &str = "sh";

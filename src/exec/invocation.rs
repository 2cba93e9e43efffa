// src/exec/invocation.rs

//! What to run: a program name plus its ordered arguments.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Command;

/// Immutable (program, args) pair, built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self {
            program: program.as_ref().to_os_string(),
            args: args.into_iter().map(|a| a.as_ref().to_os_string()).collect(),
        }
    }

    /// Build an invocation from a single command line, see
    /// [`split_command_line`].
    pub fn from_command_line(line: &str) -> Self {
        let (program, rest) = split_command_line(line);
        Self::new(program, [rest])
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Program name as used in error messages and logs.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Split a command line at its first space: the part before is the program,
/// the rest is passed verbatim as its single argument.
///
/// This is deliberately naive. There is no quoting or escaping, and the rest
/// is never split further, so `"printf [%s] a b"` runs `printf` with the one
/// argument `"[%s] a b"`. A line without a space still gets one (empty)
/// argument.
pub fn split_command_line(line: &str) -> (&str, &str) {
    line.split_once(' ').unwrap_or((line, ""))
}

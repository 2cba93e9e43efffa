use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Writes "stdout: foo" to stdout and "stderr: bar" to stderr.
pub const FOO_BAR: &str = "#!/bin/sh\necho \"stdout: foo\"\necho \"stderr: bar\" >&2\n";

/// Same as [`FOO_BAR`] with a pause before each line.
pub const SLOW_FOO_BAR: &str =
    "#!/bin/sh\nsleep 1\necho \"stdout: foo\"\nsleep 1\necho \"stderr: bar\" >&2\n";

/// Writes to both channels, then exits with status 3.
pub const FAILING: &str = "#!/bin/sh\necho \"partial out\"\necho \"partial err\" >&2\nexit 3\n";

/// A temporary directory of executable shell scripts.
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("creating script dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `body` to `name` and mark it executable.
    pub fn script(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, body).with_context(|| format!("writing script {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("chmod {:?}", path))?;
        }

        Ok(path)
    }

    /// A script writing `bytes` bytes of `x` to stdout and the same amount of
    /// `y` to stderr, well past any pipe buffer for large values.
    pub fn big_output(&self, name: &str, bytes: usize) -> Result<PathBuf> {
        let body = format!(
            "#!/bin/sh\nhead -c {bytes} /dev/zero | tr '\\0' 'x'\nhead -c {bytes} /dev/zero | tr '\\0' 'y' >&2\n"
        );
        self.script(name, &body)
    }
}

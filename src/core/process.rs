//! Helper process ownership
//!
//! Spawns w3mimgdisplay with piped standard input/output and exposes the
//! blocking line transport a session drives.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{debug, info};

use super::{DisplayError, Result};

/// Blocking line transport to the helper process.
///
/// `write` flushes immediately; there is no buffering across calls.
/// `read_line` blocks until one full line is available, with no timeout or
/// cancellation: a helper that never answers hangs the caller. That is the
/// helper protocol's own contract and is not mitigated here.
pub trait Transport {
    /// Write raw bytes and flush.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read one line, stripped of its trailing newline.
    fn read_line(&mut self) -> Result<String>;

    /// Close the helper's input and wait for it to exit.
    fn shutdown(&mut self) -> Result<()>;
}

/// A spawned w3mimgdisplay process with piped standard input/output.
///
/// Standard error and the environment are inherited from the caller. The
/// process is killed and reaped on drop if it was never shut down cleanly.
pub struct HelperProcess {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
    reaped: bool,
}

impl HelperProcess {
    /// Spawn the helper executable at `path`.
    pub fn spawn(path: &Path) -> Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(DisplayError::Spawn)?;

        info!("Spawned display helper: {} (pid {})", path.display(), child.id());

        let stdin = child.stdin.take().map(BufWriter::new).ok_or_else(|| {
            DisplayError::Spawn(io::Error::new(
                io::ErrorKind::Other,
                "helper stdin not piped",
            ))
        })?;
        let stdout = child.stdout.take().map(BufReader::new).ok_or_else(|| {
            DisplayError::Spawn(io::Error::new(
                io::ErrorKind::Other,
                "helper stdout not piped",
            ))
        })?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout,
            reaped: false,
        })
    }
}

impl Transport for HelperProcess {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            DisplayError::Write(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "helper stdin closed",
            ))
        })?;
        stdin.write_all(bytes).map_err(DisplayError::Write)?;
        stdin.flush().map_err(DisplayError::Write)
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .map_err(DisplayError::Read)?;
        if n == 0 {
            return Err(DisplayError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "helper closed its output",
            )));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        debug!("Helper response: {:?}", line);
        Ok(line)
    }

    fn shutdown(&mut self) -> Result<()> {
        // Closing stdin gives the helper EOF in case it ignored TERMINATE.
        self.stdin.take();
        let status = self.child.wait().map_err(DisplayError::Read)?;
        self.reaped = true;
        info!("Display helper exited: {}", status);
        Ok(())
    }
}

impl Drop for HelperProcess {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

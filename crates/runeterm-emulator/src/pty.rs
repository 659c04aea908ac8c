//! PTY (pseudo-terminal) handling with portable-pty.

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use tracing::{debug, error, info, warn};

use runeterm_core::{Dimensions, Error, Result};

/// A shell attached to a pseudo-terminal.
///
/// Owns the master side of the pty pair and the child process. This core is
/// single-threaded: the session is polled from the frame loop and never shared,
/// so the handles are plain fields. All of them are `Option`s taken on close,
/// which makes [`PtySession::close`] idempotent.
pub struct PtySession {
    /// The master PTY end
    master: Option<Box<dyn MasterPty + Send>>,
    /// The child shell process
    child: Option<Box<dyn Child + Send + Sync>>,
    /// PTY writer
    writer: Option<Box<dyn Write + Send>>,
    /// PTY reader, non-blocking on Unix
    reader: Option<Box<dyn Read + Send>>,
}

impl std::fmt::Debug for PtySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtySession")
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl PtySession {
    /// Spawn a shell attached to a new pseudo-terminal.
    ///
    /// Opens the native pty pair sized to `dimensions`, execs `shell` on the
    /// slave side, and puts the master fd into non-blocking mode so
    /// [`PtySession::receive`] can be polled from the frame loop. Every
    /// failure here is fatal to the caller: there is nothing to emulate
    /// without a shell.
    pub fn launch(shell: &str, dimensions: Dimensions) -> Result<Self> {
        info!(
            "Launching shell: '{}', dimensions={}x{}",
            shell, dimensions.rows, dimensions.cols
        );

        let pty_system = native_pty_system();

        let pty_size = PtySize {
            rows: dimensions.rows,
            cols: dimensions.cols,
            pixel_width: 0,
            pixel_height: 0,
        };

        debug!("Opening PTY with native system");
        let pair = pty_system.openpty(pty_size).map_err(|e| {
            error!("Failed to open PTY: {}", e);
            Error::Pty(format!("Failed to open PTY: {e}"))
        })?;

        let cmd = CommandBuilder::new(shell);
        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            error!("Failed to spawn shell '{}': {}", shell, e);
            Error::Pty(format!("Failed to spawn shell: {e}"))
        })?;

        let writer = pair.master.take_writer().map_err(|e| {
            error!("Failed to take PTY writer: {}", e);
            Error::Pty(format!("Failed to take writer: {e}"))
        })?;

        let reader = pair.master.try_clone_reader().map_err(|e| {
            error!("Failed to clone PTY reader: {}", e);
            Error::Pty(format!("Failed to clone reader: {e}"))
        })?;

        // The frame loop must never block on the shell; reads have to fail
        // fast with WouldBlock when nothing is pending.
        #[cfg(unix)]
        {
            if let Some(master_fd) = pair.master.as_raw_fd() {
                unsafe {
                    let flags = libc::fcntl(master_fd, libc::F_GETFL, 0);
                    if flags != -1 {
                        let result =
                            libc::fcntl(master_fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
                        if result == -1 {
                            error!("Failed to set master PTY to non-blocking mode");
                        } else {
                            debug!("Set master PTY FD {} to non-blocking mode", master_fd);
                        }
                    }
                }
            }
        }

        info!("Shell launched successfully: '{}'", shell);

        Ok(Self {
            master: Some(pair.master),
            child: Some(child),
            writer: Some(writer),
            reader: Some(reader),
        })
    }

    /// Write raw bytes to the shell.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Pty("PTY already closed".to_string()))?;

        debug!("Writing {} bytes to PTY", bytes.len());
        writer.write_all(bytes).map_err(Error::Io)?;
        writer.flush().map_err(Error::Io)?;
        Ok(())
    }

    /// Write a completed line to the shell: the bytes of `line` followed by a
    /// single newline terminator.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Pty("PTY already closed".to_string()))?;

        debug!("Writing line of {} bytes to PTY", line.len());
        writer.write_all(line.as_bytes()).map_err(Error::Io)?;
        writer.write_all(b"\n").map_err(Error::Io)?;
        writer.flush().map_err(Error::Io)?;
        Ok(())
    }

    /// Non-blocking read of available shell output into `buf`.
    ///
    /// Returns the number of bytes read. `Ok(0)` means "nothing available this
    /// tick", never end-of-stream; a would-block condition also reads as 0.
    /// Any other I/O failure is returned for the caller to log and skip the
    /// tick - read errors are not fatal. After close, there is no data.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Ok(0),
        };

        match reader.read(buf) {
            Ok(n) => {
                if n > 0 {
                    debug!("Read {} bytes from PTY", n);
                }
                Ok(n)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Check whether the session still holds a live pty.
    pub fn is_open(&self) -> bool {
        self.master.is_some()
    }

    /// Terminate the shell and release the pty.
    ///
    /// Signals the child, blocks until it is reaped, then drops the master
    /// descriptor. Safe to call more than once; later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            info!("Closing PTY session");
            if let Err(e) = child.kill() {
                warn!("Failed to signal shell for termination: {}", e);
            }
            child
                .wait()
                .map(|_| ())
                .map_err(|e| Error::Pty(format!("Wait failed: {e}")))?;
        }
        self.writer.take();
        self.reader.take();
        self.master.take();
        Ok(())
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}

//! Terminal session: the owner of the PTY, decoder, and grid.

use tracing::{debug, info, warn};

use runeterm_core::{Config, Dimensions, Error, Position, Result};
use runeterm_emulator::{Decoder, Grid, PtySession};

/// Status of a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Shell attached, pump active
    Running,
    /// Session has been closed
    Closed,
}

/// A running terminal session.
///
/// Owns the pty, the decoder state, and the grid, and is polled once per
/// render frame from a single thread - the pty descriptor is the only
/// concurrency boundary, so there is no locking anywhere in this type. The
/// renderer reads the grid (and cursor) between pumps.
#[derive(Debug)]
pub struct TerminalSession {
    /// The shell's pty
    pty: PtySession,
    /// Decoder state, persistent across pumps
    decoder: Decoder,
    /// The visible frame
    grid: Grid,
    /// Reusable per-tick read buffer
    read_buf: Vec<u8>,
    /// Current status
    status: SessionStatus,
}

impl TerminalSession {
    /// Launch a shell and wrap it in a session with a grid of `dimensions`.
    ///
    /// Failure to create the pty or exec the shell is fatal: the error
    /// propagates and the process has nothing to emulate.
    pub fn launch(shell: &str, dimensions: Dimensions, read_buffer_size: usize) -> Result<Self> {
        info!(
            "Creating session: shell='{}', dimensions={}x{}",
            shell, dimensions.rows, dimensions.cols
        );
        if dimensions.cell_count() == 0 {
            return Err(Error::InvalidDimensions {
                rows: dimensions.rows,
                cols: dimensions.cols,
            });
        }

        let pty = PtySession::launch(shell, dimensions)?;

        Ok(Self {
            pty,
            decoder: Decoder::new(),
            grid: Grid::new(dimensions),
            read_buf: vec![0u8; read_buffer_size.max(1)],
            status: SessionStatus::Running,
        })
    }

    /// Launch a session from a validated [`Config`].
    ///
    /// `dimensions` come from the caller because sizing needs the glyph
    /// cache's cell extent, which lives with the renderer's font.
    pub fn from_config(config: &Config, dimensions: Dimensions) -> Result<Self> {
        Self::launch(&config.shell.path, dimensions, config.shell.read_buffer_size)
    }

    /// One cooperative tick: read whatever the shell produced and decode it
    /// into the grid.
    ///
    /// Never blocks. Returns the number of bytes consumed; 0 means "idle this
    /// tick" (including after close). A read error is logged and returned so
    /// the caller can skip the tick - it is not fatal, and rendering proceeds
    /// on the grid's current state either way.
    pub fn pump(&mut self) -> Result<usize> {
        if self.status == SessionStatus::Closed {
            return Ok(0);
        }

        let n = match self.pty.receive(&mut self.read_buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("PTY read failed, skipping tick: {}", e);
                return Err(e);
            }
        };

        if n > 0 {
            debug!("Pumping {} bytes through the decoder", n);
            self.decoder.process(&mut self.grid, &self.read_buf[..n]);
        }
        Ok(n)
    }

    /// Write raw bytes toward the shell.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if self.status == SessionStatus::Closed {
            return Err(Error::SessionClosed);
        }
        self.pty.send(bytes)
    }

    /// Write a completed line toward the shell (newline appended).
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        if self.status == SessionStatus::Closed {
            return Err(Error::SessionClosed);
        }
        self.pty.send_line(line)
    }

    /// The grid, for the renderer's per-frame snapshot.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The cursor position as last reported by the decoder.
    pub fn cursor(&self) -> Position {
        self.grid.cursor()
    }

    /// Current session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Shut the session down: terminate the shell and release the pty.
    ///
    /// Blocks until the child is reaped. Idempotent; called once at shutdown.
    pub fn close(&mut self) -> Result<()> {
        if self.status == SessionStatus::Closed {
            return Ok(());
        }
        info!("Closing session");
        self.status = SessionStatus::Closed;
        self.pty.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shell() -> &'static str {
        if cfg!(windows) {
            "cmd.exe"
        } else {
            "/bin/sh"
        }
    }

    fn launch() -> TerminalSession {
        TerminalSession::launch(shell(), Dimensions::new(24, 80), 4096).unwrap()
    }

    #[test]
    fn test_launch_and_status() {
        let session = launch();
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.grid().dimensions(), Dimensions::new(24, 80));
    }

    #[test]
    fn test_launch_bad_shell_is_fatal() {
        let result = TerminalSession::launch("/nonexistent/shell", Dimensions::new(24, 80), 4096);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config::default();
        let session = TerminalSession::from_config(&config, Dimensions::new(10, 40));
        assert!(session.is_ok());
    }

    #[test]
    fn test_echo_reaches_grid() {
        let mut session = launch();
        session.send_line("echo rune_term_marker").unwrap();

        // Cooperative polling: pump until the output shows up.
        let mut found = false;
        for _ in 0..100 {
            std::thread::sleep(Duration::from_millis(20));
            let _ = session.pump();
            if session.grid().to_plain_text().contains("rune_term_marker") {
                found = true;
                break;
            }
        }
        assert!(found, "echoed text never reached the grid");

        session.close().unwrap();
    }

    #[test]
    fn test_pump_when_idle_is_zero() {
        let mut session = launch();
        // Drain startup output.
        for _ in 0..20 {
            std::thread::sleep(Duration::from_millis(10));
            if session.pump().unwrap_or(1) == 0 {
                return;
            }
        }
        panic!("session never went idle");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = launch();
        session.close().unwrap();
        assert_eq!(session.status(), SessionStatus::Closed);
        session.close().unwrap();

        // After close: pump idles, sends fail.
        assert_eq!(session.pump().unwrap(), 0);
        assert!(matches!(
            session.send_line("echo nope"),
            Err(Error::SessionClosed)
        ));
    }
}

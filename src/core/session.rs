//! Display session
//!
//! Owns one w3mimgdisplay process and translates typed calls into its wire
//! protocol.

use std::path::Path;

use tracing::debug;

use super::process::{HelperProcess, Transport};
use super::protocol::{self, Opcode, Placement};
use super::Result;

/// Default helper executable name.
///
/// Distributions usually install the real binary outside `$PATH`; on Linux
/// the conventional location is `/usr/lib/w3m/w3mimgdisplay`.
pub const DEFAULT_HELPER: &str = "w3mimgdisplay";

/// A session with one w3mimgdisplay process.
///
/// Commands go out synchronously, one line each, flushed immediately.
/// [`nop`](Self::nop) and [`get_size`](Self::get_size) block until the
/// helper answers; the helper gives no response-time guarantee, so a silent
/// helper hangs the caller. A session is single-threaded; callers needing
/// concurrency serialize access externally.
///
/// The session lifecycle is Running until [`close`](Self::close) consumes
/// it (or it is dropped), which sends the terminate command and waits for
/// the helper to exit. There is no way back to Running.
pub struct ImageDisplay {
    transport: Box<dyn Transport>,
    auto_sync: bool,
    terminated: bool,
}

impl ImageDisplay {
    /// Spawn the helper at `helper` and open a session over it.
    ///
    /// With `auto_sync` set, every draw and redraw is immediately followed
    /// on the wire by a drawing sync.
    pub fn spawn(helper: impl AsRef<Path>, auto_sync: bool) -> Result<Self> {
        let process = HelperProcess::spawn(helper.as_ref())?;
        Ok(Self::with_transport(Box::new(process), auto_sync))
    }

    /// Spawn the helper named by the configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Self::spawn(config.helper_path(), config.auto_sync)
    }

    /// Open a session over an existing transport.
    pub fn with_transport(transport: Box<dyn Transport>, auto_sync: bool) -> Self {
        Self {
            transport,
            auto_sync,
            terminated: false,
        }
    }

    /// Write raw bytes to the helper and flush.
    ///
    /// All other operations funnel through this.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport.write(bytes)
    }

    fn draw_op(&mut self, op: Opcode, path: &Path, index: u32, placement: Placement) -> Result<()> {
        debug!(
            "{:?} image {} at {},{}",
            op, index, placement.x, placement.y
        );
        let line = protocol::encode_draw(op, index, placement, path);
        self.write(&line)?;
        if self.auto_sync {
            self.sync()?;
        }
        Ok(())
    }

    /// Draw an image.
    ///
    /// `index` names the image slot so the helper can track several images
    /// at once.
    pub fn draw(&mut self, path: impl AsRef<Path>, index: u32, placement: Placement) -> Result<()> {
        self.draw_op(Opcode::Draw, path.as_ref(), index, placement)
    }

    /// Draw an image at a position, extents left to the helper.
    pub fn draw_at(&mut self, path: impl AsRef<Path>, index: u32, x: i32, y: i32) -> Result<()> {
        self.draw_op(Opcode::Draw, path.as_ref(), index, Placement::at(x, y))
    }

    /// Redraw a previously drawn image.
    pub fn redraw(
        &mut self,
        path: impl AsRef<Path>,
        index: u32,
        placement: Placement,
    ) -> Result<()> {
        self.draw_op(Opcode::Redraw, path.as_ref(), index, placement)
    }

    /// Flush the helper's pending rendering operations.
    pub fn sync(&mut self) -> Result<()> {
        self.write(&protocol::encode_bare(Opcode::SyncDrawing))
    }

    /// Sync communication: the helper acknowledges receipt of all prior
    /// commands with one response line, which is discarded.
    ///
    /// Blocks until the helper answers.
    pub fn nop(&mut self) -> Result<()> {
        self.write(&protocol::encode_bare(Opcode::SyncCommunication))?;
        self.transport.read_line()?;
        Ok(())
    }

    /// Query the pixel size of an image file.
    ///
    /// Blocks until the helper answers.
    pub fn get_size(&mut self, path: impl AsRef<Path>) -> Result<(u32, u32)> {
        self.write(&protocol::encode_get_size(path.as_ref()))?;
        let response = self.transport.read_line()?;
        protocol::parse_size(&response)
    }

    /// Clear a pixel region.
    pub fn clear(&mut self, x: i32, y: i32, w: u32, h: u32) -> Result<()> {
        self.write(&protocol::encode_clear(x, y, w, h))
    }

    /// Send the terminate command without waiting for the helper to exit.
    pub fn terminate(&mut self) -> Result<()> {
        self.write(&protocol::encode_bare(Opcode::Terminate))?;
        self.terminated = true;
        Ok(())
    }

    /// Terminate the helper and wait for it to exit.
    pub fn close(mut self) -> Result<()> {
        self.terminate()?;
        self.transport.shutdown()
    }
}

impl Drop for ImageDisplay {
    fn drop(&mut self) {
        // close() already ran the teardown; terminate must go out once.
        if self.terminated {
            return;
        }
        let _ = self.terminate();
        let _ = self.transport.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::core::DisplayError;

    /// Scripted transport capturing writes and serving canned lines.
    struct Script {
        written: Rc<RefCell<Vec<u8>>>,
        responses: VecDeque<String>,
        shutdowns: Rc<RefCell<usize>>,
    }

    impl Transport for Script {
        fn write(&mut self, bytes: &[u8]) -> Result<()> {
            self.written.borrow_mut().extend_from_slice(bytes);
            Ok(())
        }

        fn read_line(&mut self) -> Result<String> {
            self.responses.pop_front().ok_or_else(|| {
                DisplayError::Read(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "no scripted response",
                ))
            })
        }

        fn shutdown(&mut self) -> Result<()> {
            *self.shutdowns.borrow_mut() += 1;
            Ok(())
        }
    }

    fn session(
        responses: &[&str],
        auto_sync: bool,
    ) -> (ImageDisplay, Rc<RefCell<Vec<u8>>>, Rc<RefCell<usize>>) {
        let written = Rc::new(RefCell::new(Vec::new()));
        let shutdowns = Rc::new(RefCell::new(0));
        let script = Script {
            written: written.clone(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
            shutdowns: shutdowns.clone(),
        };
        (
            ImageDisplay::with_transport(Box::new(script), auto_sync),
            written,
            shutdowns,
        )
    }

    #[test]
    fn test_draw_single_write() {
        let (mut display, written, _) = session(&[], false);

        let p = Placement {
            w: 64,
            h: 64,
            ..Placement::at(0, 0)
        };
        display.draw("/tmp/a.png", 1, p).unwrap();

        assert_eq!(&*written.borrow(), b"0;1;0;0;64;64;0;0;0;0;/tmp/a.png\n");
    }

    #[test]
    fn test_auto_sync_follows_draw() {
        let (mut display, written, _) = session(&[], true);

        display.draw_at("/tmp/a.png", 1, 0, 0).unwrap();
        display.redraw("/tmp/a.png", 1, Placement::at(0, 0)).unwrap();

        assert_eq!(
            &*written.borrow(),
            b"0;1;0;0;0;0;0;0;0;0;/tmp/a.png\n3;\n1;1;0;0;0;0;0;0;0;0;/tmp/a.png\n3;\n"
        );
    }

    #[test]
    fn test_no_sync_without_auto_sync() {
        let (mut display, written, _) = session(&[], false);

        display.draw_at("/tmp/a.png", 1, 0, 0).unwrap();

        assert_eq!(&*written.borrow(), b"0;1;0;0;0;0;0;0;0;0;/tmp/a.png\n");
    }

    #[test]
    fn test_get_size() {
        let (mut display, written, _) = session(&["100 200"], false);

        assert_eq!(display.get_size("/tmp/a.png").unwrap(), (100, 200));
        assert_eq!(&*written.borrow(), b"5;/tmp/a.png\n");
    }

    #[test]
    fn test_get_size_malformed() {
        let (mut display, _, _) = session(&["abc"], false);

        assert!(matches!(
            display.get_size("/tmp/a.png"),
            Err(DisplayError::Protocol { .. })
        ));
    }

    #[test]
    fn test_nop_discards_one_line() {
        let (mut display, written, _) = session(&["ok"], false);

        display.nop().unwrap();

        assert_eq!(&*written.borrow(), b"4;\n");
        // A second nop has no scripted line left and surfaces the read error.
        assert!(matches!(display.nop(), Err(DisplayError::Read(_))));
    }

    #[test]
    fn test_clear() {
        let (mut display, written, _) = session(&[], false);

        display.clear(5, 10, 20, 30).unwrap();

        assert_eq!(&*written.borrow(), b"6;5;10;20;30\n");
    }

    #[test]
    fn test_close_terminates_once() {
        let (display, written, shutdowns) = session(&[], false);

        display.close().unwrap();

        assert_eq!(&*written.borrow(), b"2;\n");
        assert_eq!(*shutdowns.borrow(), 1);
    }

    #[test]
    fn test_drop_terminates_once() {
        let (display, written, shutdowns) = session(&[], false);

        drop(display);

        assert_eq!(&*written.borrow(), b"2;\n");
        assert_eq!(*shutdowns.borrow(), 1);
    }

    #[test]
    fn test_explicit_terminate_not_repeated_on_drop() {
        let (mut display, written, _) = session(&[], false);

        display.terminate().unwrap();
        drop(display);

        assert_eq!(&*written.borrow(), b"2;\n");
    }
}

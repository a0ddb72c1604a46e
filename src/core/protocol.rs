//! Wire protocol for w3mimgdisplay
//!
//! Builds the newline-terminated, semicolon-delimited ASCII command lines
//! the helper reads on its standard input, and parses the response lines it
//! writes on its standard output.

use std::path::Path;

use super::{DisplayError, Result};

/// Command opcodes understood by w3mimgdisplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Draw an image.
    Draw = 0,

    /// Redraw a previously drawn image.
    Redraw = 1,

    /// Terminate the helper.
    Terminate = 2,

    /// Flush pending rendering operations.
    SyncDrawing = 3,

    /// Acknowledge receipt of prior commands with one response line.
    SyncCommunication = 4,

    /// Query the pixel size of an image file.
    GetSize = 5,

    /// Clear a rectangular region.
    ClearImage = 6,
}

impl Opcode {
    /// Wire digit for this opcode.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Placement of an image on the terminal, in pixels.
///
/// `w`/`h` scale the drawn image; `sx`/`sy`/`sw`/`sh` select a source region
/// inside the image file. Zero leaves the choice to the helper. Placements
/// are transient call parameters, never stored by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    /// X position of the top left corner.
    pub x: i32,
    /// Y position of the top left corner.
    pub y: i32,
    /// Width of the drawn image.
    pub w: u32,
    /// Height of the drawn image.
    pub h: u32,
    /// X offset into the source image.
    pub sx: u32,
    /// Y offset into the source image.
    pub sy: u32,
    /// Source width.
    pub sw: u32,
    /// Source height.
    pub sh: u32,
}

impl Placement {
    /// Placement at a position with all extents left to the helper.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// Encode a draw or redraw command.
///
/// Wire format: `op;n;x;y;w;h;sx;sy;sw;sh;path\n`. The path goes out as raw
/// bytes with no escaping; a path containing `;` or a newline is the
/// caller's responsibility.
pub fn encode_draw(op: Opcode, index: u32, p: Placement, path: &Path) -> Vec<u8> {
    let mut line = format!(
        "{};{};{};{};{};{};{};{};{};{};",
        op.code(),
        index,
        p.x,
        p.y,
        p.w,
        p.h,
        p.sx,
        p.sy,
        p.sw,
        p.sh
    )
    .into_bytes();
    line.extend_from_slice(&path_bytes(path));
    line.push(b'\n');
    line
}

/// Encode a command that takes no arguments (terminate and the two syncs).
pub fn encode_bare(op: Opcode) -> Vec<u8> {
    format!("{};\n", op.code()).into_bytes()
}

/// Encode a size query for an image file.
pub fn encode_get_size(path: &Path) -> Vec<u8> {
    let mut line = format!("{};", Opcode::GetSize.code()).into_bytes();
    line.extend_from_slice(&path_bytes(path));
    line.push(b'\n');
    line
}

/// Encode a clear command for a pixel region.
pub fn encode_clear(x: i32, y: i32, w: u32, h: u32) -> Vec<u8> {
    format!("{};{};{};{};{}\n", Opcode::ClearImage.code(), x, y, w, h).into_bytes()
}

/// Parse a size-query response line as `width height`.
///
/// Tokens past the first two are ignored.
pub fn parse_size(line: &str) -> Result<(u32, u32)> {
    let mut parts = line.split_whitespace();
    let (w, h) = match (parts.next(), parts.next()) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(DisplayError::Protocol {
                line: line.to_string(),
            })
        }
    };

    match (w.parse(), h.parse()) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(DisplayError::Protocol {
            line: line.to_string(),
        }),
    }
}

/// Path bytes as they are sent to the helper.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_framing() {
        let p = Placement {
            w: 64,
            h: 64,
            ..Placement::at(0, 0)
        };
        let line = encode_draw(Opcode::Draw, 1, p, Path::new("/tmp/a.png"));
        assert_eq!(line, b"0;1;0;0;64;64;0;0;0;0;/tmp/a.png\n");
    }

    #[test]
    fn test_redraw_framing() {
        let p = Placement {
            x: 10,
            y: 20,
            w: 100,
            h: 50,
            sx: 1,
            sy: 2,
            sw: 3,
            sh: 4,
        };
        let line = encode_draw(Opcode::Redraw, 7, p, Path::new("/tmp/b.jpg"));
        assert_eq!(line, b"1;7;10;20;100;50;1;2;3;4;/tmp/b.jpg\n");
    }

    #[test]
    fn test_bare_framing() {
        assert_eq!(encode_bare(Opcode::Terminate), b"2;\n");
        assert_eq!(encode_bare(Opcode::SyncDrawing), b"3;\n");
        assert_eq!(encode_bare(Opcode::SyncCommunication), b"4;\n");
    }

    #[test]
    fn test_get_size_framing() {
        let line = encode_get_size(Path::new("/tmp/a.png"));
        assert_eq!(line, b"5;/tmp/a.png\n");
    }

    #[test]
    fn test_clear_framing() {
        assert_eq!(encode_clear(5, 10, 20, 30), b"6;5;10;20;30\n");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100 200").unwrap(), (100, 200));
    }

    #[test]
    fn test_parse_size_malformed() {
        assert!(matches!(
            parse_size("abc"),
            Err(DisplayError::Protocol { .. })
        ));
        assert!(matches!(parse_size(""), Err(DisplayError::Protocol { .. })));
        assert!(matches!(
            parse_size("100 xyz"),
            Err(DisplayError::Protocol { .. })
        ));
    }
}

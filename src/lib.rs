//! w3mimg - client binding for the w3mimgdisplay terminal image helper
//!
//! w3mimg spawns one long-lived `w3mimgdisplay` process and drives its
//! line-oriented command protocol over the process's standard input/output.
//! Each typed call serializes to one newline-terminated, semicolon-delimited
//! ASCII command; query commands block on one response line.
//!
//! # Features
//!
//! - **Typed commands**: draw, redraw, clear, size query, sync, terminate
//! - **Auto-sync**: optionally follow every draw with a drawing sync
//! - **Scoped teardown**: the terminate command is sent and the helper is
//!   reaped on [`ImageDisplay::close`] or on drop, exactly once
//! - **Injectable transport**: tests drive a session without a real process
//!
//! # Quick Start
//!
//! ```no_run
//! use w3mimg::{ImageDisplay, Placement};
//!
//! let mut display = ImageDisplay::spawn("/usr/lib/w3m/w3mimgdisplay", true)?;
//! let (w, h) = display.get_size("/tmp/a.png")?;
//! display.draw("/tmp/a.png", 1, Placement { w, h, ..Placement::at(0, 0) })?;
//! display.nop()?;
//! display.close()?;
//! # Ok::<(), w3mimg::DisplayError>(())
//! ```
//!
//! The helper's blocking reads carry no timeout: a helper that never answers
//! a size query or communication sync hangs the caller. That behavior is
//! inherent to the helper's protocol and is preserved here, not papered over.

pub mod config;
pub mod core;

pub use config::Config;
pub use core::process::{HelperProcess, Transport};
pub use core::protocol::{Opcode, Placement};
pub use core::session::{ImageDisplay, DEFAULT_HELPER};
pub use core::{DisplayError, Result};

//! # Text surface
//!
//! [`TextSurface`] renders the fault log as text on any [`io::Write`]: a
//! terminal, a log file, an in-memory buffer. Accents map to ANSI colors when
//! coloring is enabled.
//!
//! ## Example output
//! ```text
//! ==== fault detected ====
//! [14:05:07:45] Screen2 Errors=1
//! [14:05:13:02] Screen2 Errors=2
//! ==== acknowledged ====
//! ```

use std::io::{self, Write};

use tracing::warn;

use super::presenter::{Accent, Surface};

const RESET: &str = "\x1b[0m";

/// Line-oriented [`Surface`] over a writer.
#[derive(Debug)]
pub struct TextSurface<W> {
    out: W,
    visible: bool,
    colored: bool,
}

impl TextSurface<io::Stdout> {
    /// Colored surface on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write> TextSurface<W> {
    /// Creates a hidden surface over `out`.
    pub fn new(out: W, colored: bool) -> Self {
        Self {
            out,
            visible: false,
            colored,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str, accent: Option<Accent>) {
        let res = match (self.colored, accent) {
            (true, Some(accent)) => writeln!(self.out, "{}{line}{RESET}", color(accent)),
            _ => writeln!(self.out, "{line}"),
        };
        if let Err(e) = res.and_then(|()| self.out.flush()) {
            warn!(error = %e, "text surface write failed");
        }
    }
}

fn color(accent: Accent) -> &'static str {
    match accent {
        Accent::Light => "\x1b[38;5;216m",
        Accent::Medium => "\x1b[33m",
        Accent::Strong => "\x1b[31m",
    }
}

impl<W: Write> Surface for TextSurface<W> {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn show(&mut self) {
        self.visible = true;
        self.write_line("==== fault detected ====", None);
    }

    fn hide(&mut self) {
        self.visible = false;
        self.write_line("==== acknowledged ====", None);
    }

    fn append_line(&mut self, line: &str, accent: Accent) {
        self.write_line(line, Some(accent));
    }
}

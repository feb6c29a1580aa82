//! Output capability shared by the progress reporter, the result printer
//! and the orchestrator.

use std::io;

use console::Term;

/// Width used when the terminal size cannot be queried (pipes, CI logs).
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

pub trait Io {
    /// Print a full line.
    fn println(&mut self, line: &str) -> io::Result<()>;

    /// Replace whatever is on the current line with `line`.
    fn overwrite_line(&mut self, line: &str) -> io::Result<()>;

    /// Terminate a line previously drawn with [`Io::overwrite_line`].
    fn finish_line(&mut self) -> io::Result<()>;

    /// Current width of the output in columns, always greater than zero.
    fn width(&self) -> usize;
}

/// Stdout-backed [`Io`].
pub struct ConsoleIo {
    term: Term,
}

impl ConsoleIo {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Whether the attached terminal can render ANSI colors.
    pub fn colors_supported(&self) -> bool {
        self.term.is_term() && self.term.features().colors_supported()
    }
}

impl Io for ConsoleIo {
    fn println(&mut self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    fn overwrite_line(&mut self, line: &str) -> io::Result<()> {
        if self.term.is_term() {
            self.term.clear_line()?;
            self.term.write_str(line)
        } else {
            // Carriage returns only garble redirected output.
            self.term.write_line(line)
        }
    }

    fn finish_line(&mut self) -> io::Result<()> {
        if self.term.is_term() {
            self.term.write_line("")?;
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.term
            .size_checked()
            .map(|(_, cols)| cols as usize)
            .filter(|cols| *cols > 0)
            .unwrap_or(DEFAULT_TERMINAL_WIDTH)
    }
}

/// In-memory [`Io`] with a fixed width.
#[cfg(test)]
pub struct BufferIo {
    out: String,
    width: usize,
}

#[cfg(test)]
impl BufferIo {
    pub fn new(width: usize) -> Self {
        Self {
            out: String::new(),
            width,
        }
    }

    pub fn out(&self) -> &str {
        &self.out
    }
}

#[cfg(test)]
impl Io for BufferIo {
    fn println(&mut self, line: &str) -> io::Result<()> {
        self.out.push_str(line);
        self.out.push('\n');
        Ok(())
    }

    fn overwrite_line(&mut self, line: &str) -> io::Result<()> {
        self.out.push('\r');
        self.out.push_str(line);
        Ok(())
    }

    fn finish_line(&mut self) -> io::Result<()> {
        self.out.push('\n');
        Ok(())
    }

    fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_io_records_overwrites() {
        let mut io = BufferIo::new(50);
        io.overwrite_line("first").unwrap();
        io.overwrite_line("second").unwrap();
        io.finish_line().unwrap();
        io.println("done").unwrap();

        assert_eq!(io.out(), "\rfirst\rsecond\ndone\n");
        assert_eq!(io.width(), 50);
    }

    #[test]
    fn test_console_width_is_positive() {
        let io = ConsoleIo::stdout();
        assert!(io.width() > 0);
    }
}
